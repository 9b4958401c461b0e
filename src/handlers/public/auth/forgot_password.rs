// handlers/public/auth/forgot_password.rs - POST /auth/forgot-password handler

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::required;
use crate::auth::session;
use crate::config;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

/// POST /auth/forgot-password - Email a reset link that signs the user in
/// through the callback and lands on the reset page
pub async fn forgot_password_post(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Response, ApiError> {
    let email = required(body.email.as_deref(), "email")?;
    let cfg = config::config();
    let redirect_to = format!("{}?redirect_to=/protected/reset-password", cfg.callback_url());

    let verifier = session::generate_code_verifier();
    state
        .auth
        .recover(&email, &redirect_to, &session::code_challenge(&verifier))
        .await?;

    let mut response = ApiResponse::success(json!({
        "message": "Check your email for a link to reset your password."
    }))
    .into_response();
    session::append_cookies(
        response.headers_mut(),
        [session::email_verifier_cookie(&verifier, cfg.security.require_https)],
    );
    Ok(response)
}
