// Session authentication backed by Supabase GoTrue
pub mod client;
pub mod session;

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use client::{AuthClient, AuthUserInfo, OAuthProvider, Session};

/// Audience GoTrue stamps on tokens for signed-in users
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppMetadata {
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: Option<String>,
    pub role: Option<String>,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default)]
    pub app_metadata: AppMetadata,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing access token")]
    MissingToken,

    #[error("Access token expired")]
    ExpiredToken,

    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Auth platform rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Auth not configured: {0} missing")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Verify a GoTrue access token locally with the project JWT secret
pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::NotConfigured("SUPABASE_JWT_SECRET"));
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[AUTHENTICATED_AUDIENCE]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken(e.to_string()),
        })
}
