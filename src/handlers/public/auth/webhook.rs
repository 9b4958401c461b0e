// handlers/public/auth/webhook.rs - POST /api/auth/webhook handler

use axum::{http::HeaderMap, Json};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AuthUserInfo;
use crate::config;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::profile;

#[derive(Debug, Deserialize)]
pub struct AuthHookPayload {
    #[serde(rename = "type", default)]
    pub hook_type: Option<String>,
    pub event: String,
    pub user: AuthUserInfo,
}

type HmacSha256 = Hmac<Sha256>;

const SECRET_CHECK_CONTEXT: &[u8] = b"qlink-auth-hook";

/// Compare two secrets in constant time by verifying MACs keyed with each
fn secrets_match(presented: &str, expected: &str) -> bool {
    let (Ok(mut expected_mac), Ok(mut presented_mac)) = (
        HmacSha256::new_from_slice(expected.as_bytes()),
        HmacSha256::new_from_slice(presented.as_bytes()),
    ) else {
        return false;
    };
    expected_mac.update(SECRET_CHECK_CONTEXT);
    presented_mac.update(SECRET_CHECK_CONTEXT);
    presented_mac.verify_slice(&expected_mac.finalize().into_bytes()).is_ok()
}

fn authorize(headers: &HeaderMap, secret: Option<&str>) -> Result<(), ApiError> {
    let Some(secret) = secret else {
        return Ok(());
    };
    let presented = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented.is_some_and(|presented| secrets_match(presented, secret)) {
        Ok(())
    } else {
        Err(ApiError::unauthorized("Invalid webhook secret"))
    }
}

/**
 * POST /api/auth/webhook - Auth platform hook
 *
 * On SIGNED_UP / SIGNED_IN, creates the user's profile when missing.
 * Other events are acknowledged without changes.
 */
pub async fn auth_webhook_post(headers: HeaderMap, Json(payload): Json<AuthHookPayload>) -> ApiResult<Value> {
    authorize(&headers, config::config().security.auth_webhook_secret.as_deref())?;

    if !matches!(payload.event.as_str(), "SIGNED_UP" | "SIGNED_IN") {
        info!("Auth hook {} ({:?}) ignored", payload.event, payload.hook_type);
        return Ok(ApiResponse::success(json!({ "processed": false })));
    }

    let pool = DatabaseManager::pool().await?;
    let (profile, created) = profile::ensure_profile(&pool, &payload.user).await?;

    Ok(ApiResponse::success(json!({
        "processed": true,
        "profile_created": created,
        "username": profile.username,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn secret_is_optional() {
        assert!(authorize(&HeaderMap::new(), None).is_ok());
    }

    #[test]
    fn secret_must_match_bearer() {
        let mut headers = HeaderMap::new();
        assert!(authorize(&headers, Some("s3cret")).is_err());
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Bearer s3cret"));
        assert!(authorize(&headers, Some("s3cret")).is_ok());
        assert!(authorize(&headers, Some("other")).is_err());
    }

    #[test]
    fn secret_comparison() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3cre", "s3cret"));
        assert!(!secrets_match("s3cret ", "s3cret"));
        assert!(!secrets_match("", "s3cret"));
    }

    #[test]
    fn payload_parses() {
        let payload: AuthHookPayload = serde_json::from_value(json!({
            "type": "AUTH_SIGNUP",
            "event": "SIGNED_UP",
            "user": {
                "id": "6f1c4a4e-2b7f-4c1e-9d1a-2f7d8b3c9e10",
                "email": "taro@example.com",
                "app_metadata": { "provider": "google" },
                "user_metadata": { "full_name": "Taro" }
            }
        }))
        .unwrap();
        assert_eq!(payload.user.provider(), Some("google"));
        assert_eq!(payload.user.user_metadata["full_name"], "Taro");
    }
}
