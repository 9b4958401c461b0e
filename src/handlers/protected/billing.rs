// handlers/protected/billing.rs - POST /api/stripe/create-checkout-session

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use crate::config;
use crate::database::{subscriptions, DatabaseManager};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::billing::{BillingCycle, BillingError, CheckoutRequest, CheckoutSession};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub plan_id: String,
    #[serde(default)]
    pub billing_cycle: String,
}

/**
 * Start a Stripe Checkout subscription for a plan
 *
 * Input: { "plan_id": "premium", "billing_cycle": "monthly" | "yearly" }
 * Output: { "session_id": "cs_...", "url": "https://checkout.stripe.com/..." }
 */
pub async fn checkout_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<CheckoutBody>,
) -> ApiResult<CheckoutSession> {
    let cfg = config::config();
    let pool = DatabaseManager::pool().await?;
    let plan = subscriptions::find_plan(&pool, &body.plan_id)
        .await?
        .ok_or_else(|| BillingError::PlanNotFound(body.plan_id.clone()))?;

    let request = CheckoutRequest {
        plan: &plan,
        cycle: BillingCycle::parse(&body.billing_cycle),
        currency: &cfg.stripe.currency,
        site_url: &cfg.site_url,
        user_id: user.id,
        customer_email: user.email.as_deref(),
    };

    let session = state.stripe.create_checkout_session(&request).await?;
    tracing::info!("Checkout session {} opened for {} ({})", session.id, user.id, plan.id);
    Ok(ApiResponse::success(session))
}
