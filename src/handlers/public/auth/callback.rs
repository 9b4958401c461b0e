// handlers/public/auth/callback.rs - GET /auth/callback handler

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{error, info};
use url::form_urlencoded;

use crate::auth::session::{self, VERIFIER_COOKIE};
use crate::config;
use crate::database::{profiles, DatabaseManager};
use crate::handlers::safe_redirect_path;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub redirect_to: Option<String>,
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn auth_error_redirect(site_url: &str, message: &str) -> Response {
    Redirect::to(&format!("{}/sign-in?authError={}", site_url, encode(message))).into_response()
}

/**
 * GET /auth/callback - Land here after email confirmation, recovery or OAuth
 *
 * - `error` present: back to /sign-in with the description as `authError`
 * - `code` present: exchanged for a session with the PKCE verifier cookie
 * - users without a profile (or username) go to the profile setup page
 * - everyone else goes to `redirect_to` (same-site paths only) or /protected
 */
pub async fn callback_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let cfg = config::config();
    let site = cfg.site_url.as_str();
    let secure = cfg.security.require_https;

    if let Some(err) = &query.error {
        error!("Auth callback error: {} ({:?})", err, query.error_description);
        return auth_error_redirect(site, query.error_description.as_deref().unwrap_or(err));
    }

    let mut cookies = Vec::new();
    let mut is_new_user = false;

    if let Some(code) = &query.code {
        let Some(verifier) = session::get_cookie(&headers, VERIFIER_COOKIE) else {
            return auth_error_redirect(site, "Sign-in session expired, please try again");
        };

        let session_data = match state.auth.exchange_code_for_session(code, &verifier).await {
            Ok(session_data) => session_data,
            Err(e) => {
                error!("Code exchange failed: {}", e);
                return auth_error_redirect(site, &e.to_string());
            }
        };

        let profile = match DatabaseManager::pool().await {
            Ok(pool) => profiles::find_by_id(&pool, session_data.user.id).await,
            Err(e) => Err(e),
        };
        is_new_user = match profile {
            Ok(profile) => profile.map_or(true, |p| p.username.trim().is_empty()),
            Err(e) => {
                error!("Profile lookup after sign-in failed: {}", e);
                return auth_error_redirect(site, "Could not load your profile");
            }
        };

        info!("User {} signed in via callback (new: {})", session_data.user.id, is_new_user);
        cookies.extend(session::session_cookies(&session_data, secure));
        cookies.push(session::clear_cookie(VERIFIER_COOKIE, secure));
    }

    let target = if is_new_user {
        let message = r#"{"type":"info","message":"Please set up your profile"}"#;
        format!("{}/protected/profile?message={}", site, encode(message))
    } else {
        let path = safe_redirect_path(query.redirect_to.as_deref()).unwrap_or("/protected");
        format!("{}{}", site, path)
    };

    let mut response = Redirect::to(&target).into_response();
    session::append_cookies(response.headers_mut(), cookies);
    response
}
