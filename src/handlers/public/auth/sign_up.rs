// handlers/public/auth/sign_up.rs - POST /auth/sign-up handler

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::required;
use crate::auth::session;
use crate::config;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::services::{profile, referral};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub referral_code: Option<String>,
}

/**
 * POST /auth/sign-up - Register with email and password
 *
 * Input: { "email": "...", "password": "...", "referral_code": "ABCD1234" (optional) }
 *
 * The platform sends a confirmation email whose link returns to the
 * callback with a PKCE code; the verifier is kept in a cookie until then.
 * When the platform also reveals the new
 * user's id and a referral code was supplied, the referral is recorded;
 * a failed referral is reported in the response but never fails sign-up.
 */
pub async fn sign_up_post(
    State(state): State<AppState>,
    Json(body): Json<SignUpRequest>,
) -> Result<Response, ApiError> {
    let email = required(body.email.as_deref(), "email")?;
    let password = required(body.password.as_deref(), "password")?;

    let cfg = config::config();
    let verifier = session::generate_code_verifier();
    let user_id = state
        .auth
        .sign_up(&email, &password, &cfg.callback_url(), &session::code_challenge(&verifier))
        .await?;
    info!("Sign-up requested for {}", email);

    let referral_code = body.referral_code.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let referral = match (referral_code, user_id) {
        (Some(code), Some(user_id)) => Some(apply_referral(code, user_id, &email).await),
        _ => None,
    };

    let mut response = ApiResponse::success(json!({
        "message": "Thanks for signing up! Please check your email for a verification link.",
        "referral": referral,
    }))
    .into_response();
    session::append_cookies(
        response.headers_mut(),
        [session::email_verifier_cookie(&verifier, cfg.security.require_https)],
    );
    Ok(response)
}

async fn apply_referral(code: &str, user_id: uuid::Uuid, email: &str) -> Value {
    let pool = match DatabaseManager::pool().await {
        Ok(pool) => pool,
        Err(e) => {
            warn!("Referral skipped, database unavailable: {}", e);
            return json!({ "success": false, "error": "Referral could not be processed" });
        }
    };

    let user = crate::auth::AuthUserInfo {
        id: user_id,
        email: Some(email.to_string()),
        ..Default::default()
    };
    if let Err(e) = profile::ensure_profile(&pool, &user).await {
        warn!("Referral skipped, profile for {} not created: {}", user_id, e);
        return json!({ "success": false, "error": "Referral could not be processed" });
    }

    match referral::handle_referral_signup(&pool, code, user_id).await {
        Ok(message) => json!({ "success": true, "message": message }),
        Err(e) => {
            warn!("Referral {} for {} rejected: {}", code, user_id, e);
            json!({ "success": false, "error": e.to_string() })
        }
    }
}
