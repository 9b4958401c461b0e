// handlers/public/auth/sign_out.rs - POST /auth/sign-out handler

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;

use crate::auth::session;
use crate::config;
use crate::middleware::auth::extract_access_token;
use crate::middleware::ApiResponse;
use crate::state::AppState;

/// POST /auth/sign-out - Revoke the session (best effort) and clear cookies
pub async fn sign_out_post(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = extract_access_token(&headers) {
        if let Err(e) = state.auth.sign_out(&token).await {
            debug!("Remote sign-out failed: {}", e);
        }
    }

    let mut response = ApiResponse::success(json!({ "signed_out": true })).into_response();
    session::append_cookies(
        response.headers_mut(),
        session::clear_session_cookies(config::config().security.require_https),
    );
    response
}
