use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::session::{self, ACCESS_COOKIE, REFRESH_COOKIE};
use crate::auth::{verify_access_token, AuthError, Claims};
use crate::config;
use crate::error::ApiError;
use crate::state::AppState;

/// Signed-in user, injected into request extensions by the session guard
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub provider: Option<String>,
    pub access_token: String,
}

impl CurrentUser {
    fn from_claims(claims: Claims, access_token: String) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            provider: claims.app_metadata.provider,
            access_token,
        }
    }
}

/// Access token from `Authorization: Bearer` or the session cookie
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    bearer.or_else(|| session::get_cookie(headers, ACCESS_COOKIE))
}

/// Session guard for protected routes. An expired access token is renewed
/// with the refresh cookie and the new cookies are set on the response.
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let cfg = config::config();
    let secret = &cfg.supabase.jwt_secret;
    let token = extract_access_token(request.headers());

    let verified = match &token {
        Some(token) => verify_access_token(token, secret).map(|claims| (claims, token.clone())),
        None => Err(AuthError::MissingToken),
    };

    match verified {
        Ok((claims, token)) => {
            request.extensions_mut().insert(CurrentUser::from_claims(claims, token));
            Ok(next.run(request).await)
        }
        Err(AuthError::ExpiredToken) | Err(AuthError::MissingToken) => {
            let refresh_token = session::get_cookie(request.headers(), REFRESH_COOKIE).ok_or_else(|| {
                if token.is_some() {
                    AuthError::ExpiredToken
                } else {
                    AuthError::MissingToken
                }
            })?;

            let renewed = state.auth.refresh_session(&refresh_token).await.map_err(|e| {
                tracing::debug!("Session refresh failed: {}", e);
                AuthError::ExpiredToken
            })?;
            let claims = verify_access_token(&renewed.access_token, secret)?;
            tracing::debug!("Refreshed session for {}", claims.sub);

            request
                .extensions_mut()
                .insert(CurrentUser::from_claims(claims, renewed.access_token.clone()));

            let mut response = next.run(request).await;
            session::append_cookies(
                response.headers_mut(),
                session::session_cookies(&renewed, cfg.security.require_https),
            );
            Ok(response)
        }
        Err(e) => Err(e.into()),
    }
}
