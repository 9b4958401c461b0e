// handlers/public/billing.rs - Plans listing and the Stripe webhook

use axum::{body::Bytes, http::HeaderMap, Json};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::config;
use crate::database::models::PremiumPlan;
use crate::database::{subscriptions, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::billing::{self, StripeEvent};

/// GET /api/premium/plans - Plans, cheapest first
pub async fn plans_get() -> ApiResult<Vec<PremiumPlan>> {
    let pool = DatabaseManager::pool().await?;
    Ok(ApiResponse::success(subscriptions::list_plans(&pool).await?))
}

/**
 * POST /api/stripe/webhook - Stripe event receiver
 *
 * The raw body is checked against `Stripe-Signature` before parsing.
 * Bad signatures are 400; failures while applying the event are 500 so
 * Stripe retries. Responds `{ "received": true }` (not enveloped).
 */
pub async fn stripe_webhook_post(headers: HeaderMap, body: Bytes) -> Result<Json<Value>, ApiError> {
    let cfg = config::config();
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("Invalid signature"))?;

    billing::verify_signature(
        &body,
        signature,
        &cfg.stripe.webhook_secret,
        cfg.stripe.webhook_tolerance_secs,
        chrono::Utc::now().timestamp(),
    )?;

    let event: StripeEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid event payload: {}", e)))?;

    let pool = DatabaseManager::pool().await?;
    match billing::handle_event(&pool, &event).await {
        Ok(outcome) => {
            info!("Stripe event {} ({}) handled: {:?}", event.id, event.event_type, outcome);
            Ok(Json(json!({ "received": true })))
        }
        Err(e) => {
            error!("Stripe event {} ({}) failed: {}", event.id, event.event_type, e);
            Err(ApiError::internal_server_error("Webhook processing failed"))
        }
    }
}
