// handlers/public/auth/oauth.rs - GET /auth/oauth/:provider handler

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::{session, OAuthProvider};
use crate::config;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /auth/oauth/:provider - Start an OAuth sign-in (google, twitter) with PKCE
pub async fn oauth_get(State(state): State<AppState>, Path(provider): Path<String>) -> Result<Response, ApiError> {
    let provider = OAuthProvider::parse(&provider)?;
    let cfg = config::config();

    let verifier = session::generate_code_verifier();
    let url = state
        .auth
        .authorize_url(provider, &cfg.callback_url(), &session::code_challenge(&verifier))?;

    let mut response = Redirect::to(&url).into_response();
    session::append_cookies(
        response.headers_mut(),
        [session::verifier_cookie(&verifier, cfg.security.require_https)],
    );
    Ok(response)
}
