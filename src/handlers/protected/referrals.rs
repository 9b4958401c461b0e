// handlers/protected/referrals.rs - GET /api/referrals

use axum::Extension;

use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::referral::{self, ReferralStats};

pub async fn referrals_get(Extension(user): Extension<CurrentUser>) -> ApiResult<ReferralStats> {
    let pool = DatabaseManager::pool().await?;
    Ok(ApiResponse::success(referral::referral_stats(&pool, user.id).await?))
}
