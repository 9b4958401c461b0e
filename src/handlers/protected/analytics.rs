// handlers/protected/analytics.rs - Question analytics

use axum::{extract::Path, Extension};
use uuid::Uuid;

use crate::database::{questions, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::analytics::{self, QuestionAnalytics, UserAnalytics};
use crate::services::entitlement::{self, PremiumFeature};
use crate::services::qa;

/// GET /api/analytics - Views and answers across the user's questions
pub async fn analytics_get(Extension(user): Extension<CurrentUser>) -> ApiResult<UserAnalytics> {
    let pool = DatabaseManager::pool().await?;
    let questions = questions::list_for_user(&pool, user.id).await?;
    Ok(ApiResponse::success(analytics::user_analytics(questions)))
}

/// GET /api/analytics/questions/:id - Daily views over 30 days (premium, owner only)
pub async fn question_analytics_get(
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<QuestionAnalytics> {
    let pool = DatabaseManager::pool().await?;

    let is_premium = entitlement::is_premium(&pool, user.id).await?;
    if !entitlement::has_feature(is_premium, PremiumFeature::Analytics) {
        return Err(ApiError::forbidden("Detailed analytics require a premium plan"));
    }

    let question = qa::owned_question(&pool, id, user.id).await?;
    Ok(ApiResponse::success(analytics::question_analytics(&pool, question).await?))
}
