// handlers/public/auth/sign_in.rs - POST /auth/sign-in handler

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::required;
use crate::auth::session;
use crate::config;
use crate::database::{profiles, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/sign-in - Password sign-in; sets the session cookies
pub async fn sign_in_post(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> Result<Response, ApiError> {
    let email = required(body.email.as_deref(), "email")?;
    let password = required(body.password.as_deref(), "password")?;

    let session_data = state.auth.sign_in_with_password(&email, &password).await?;
    info!("User {} signed in", session_data.user.id);

    match DatabaseManager::pool().await {
        Ok(pool) => {
            if let Err(e) = profiles::touch_last_login(&pool, session_data.user.id).await {
                warn!("Could not record last login for {}: {}", session_data.user.id, e);
            }
        }
        Err(e) => warn!("Could not record last login: {}", e),
    }

    let mut response = ApiResponse::success(json!({
        "user": session_data.user,
        "expires_in": session_data.expires_in,
    }))
    .into_response();
    session::append_cookies(
        response.headers_mut(),
        session::session_cookies(&session_data, config::config().security.require_https),
    );
    Ok(response)
}
