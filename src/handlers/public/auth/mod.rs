// handlers/public/auth/mod.rs - Sign-up, sign-in and OAuth flows
//
// Credentials go to the auth platform; successful sign-ins come back as
// `qlink-access-token` / `qlink-refresh-token` cookies.
pub mod callback;
pub mod forgot_password;
pub mod oauth;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod webhook;

pub use callback::callback_get;
pub use forgot_password::forgot_password_post;
pub use oauth::oauth_get;
pub use sign_in::sign_in_post;
pub use sign_out::sign_out_post;
pub use sign_up::sign_up_post;
pub use webhook::auth_webhook_post;

use crate::error::ApiError;

/// Required, trimmed form field
pub(crate) fn required(value: Option<&str>, field: &str) -> Result<String, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::field_error(field, format!("{} is required", field)))
}
