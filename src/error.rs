// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::AuthError;
use crate::database::DatabaseError;
use crate::services::billing::BillingError;
use crate::services::qa::QaError;
use crate::services::referral::ReferralError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (external service issues)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::BadGateway(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code()
        });

        if let ApiError::ValidationError {
            field_errors: Some(field_errors),
            ..
        } = self
        {
            response["field_errors"] = json!(field_errors);
        }

        response
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    /// Validation error naming a single offending field
    pub fn field_error(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.clone());
        ApiError::validation_error(message, Some(field_errors))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::UniqueViolation(constraint) => {
                tracing::warn!("Unique constraint violated: {}", constraint);
                ApiError::conflict("Resource already exists")
            }
            DatabaseError::ConfigMissing(name) => {
                tracing::error!("Database not configured: {} missing", name);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ApiError::unauthorized("Authentication required"),
            AuthError::ExpiredToken => ApiError::unauthorized("Session expired"),
            AuthError::InvalidToken(msg) => {
                tracing::debug!("Rejected access token: {}", msg);
                ApiError::unauthorized("Invalid session")
            }
            AuthError::UnsupportedProvider(provider) => {
                ApiError::bad_request(format!("Unsupported sign-in provider '{}'", provider))
            }
            AuthError::Rejected { status, message } if status < 500 => ApiError::bad_request(message),
            AuthError::Rejected { status, message } => {
                tracing::error!("Auth platform error {}: {}", status, message);
                ApiError::bad_gateway("Authentication service error")
            }
            AuthError::NotConfigured(name) => {
                tracing::error!("Auth not configured: {} missing", name);
                ApiError::service_unavailable("Authentication is not configured")
            }
            AuthError::Http(e) => {
                tracing::error!("Auth platform unreachable: {}", e);
                ApiError::bad_gateway("Authentication service unavailable")
            }
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::PlanNotFound(id) => ApiError::not_found(format!("Plan '{}' not found", id)),
            BillingError::InvalidSignature(reason) => {
                tracing::warn!("Webhook signature verification failed: {}", reason);
                ApiError::bad_request("Invalid signature")
            }
            BillingError::InvalidPayload(msg) => ApiError::bad_request(msg),
            BillingError::NotConfigured(name) => {
                tracing::error!("Billing not configured: {} missing", name);
                ApiError::service_unavailable("Billing is not configured")
            }
            BillingError::Stripe { status, message } => {
                tracing::error!("Stripe error {}: {}", status, message);
                ApiError::bad_gateway("Payment provider error")
            }
            BillingError::Http(e) => {
                tracing::error!("Stripe unreachable: {}", e);
                ApiError::bad_gateway("Payment provider unavailable")
            }
            BillingError::Database(e) => e.into(),
        }
    }
}

impl From<ReferralError> for ApiError {
    fn from(err: ReferralError) -> Self {
        match err {
            ReferralError::InvalidCode(_) => ApiError::bad_request("Invalid referral code"),
            ReferralError::SelfReferral => ApiError::bad_request("You cannot refer yourself"),
            ReferralError::AlreadyReferred => ApiError::conflict("User has already been referred"),
            ReferralError::Database(e) => e.into(),
        }
    }
}

impl From<QaError> for ApiError {
    fn from(err: QaError) -> Self {
        match err {
            QaError::Invalid { field, message } => ApiError::field_error(field, message),
            QaError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            QaError::Closed => ApiError::not_found("This question is closed"),
            QaError::Forbidden(msg) => ApiError::forbidden(msg),
            QaError::Image(e) => ApiError::field_error("image_urls", e.to_string()),
            QaError::Database(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_carries_field_map() {
        let err = ApiError::field_error("username", "Username must be at least 3 characters");
        let body = err.to_json();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["username"], "Username must be at least 3 characters");
    }

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err: ApiError = DatabaseError::UniqueViolation("profiles_username_key".into()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn auth_rejection_status_decides_client_or_gateway() {
        let client: ApiError = AuthError::Rejected {
            status: 400,
            message: "Invalid login credentials".into(),
        }
        .into();
        assert_eq!(client.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(client.message(), "Invalid login credentials");

        let upstream: ApiError = AuthError::Rejected {
            status: 503,
            message: "down".into(),
        }
        .into();
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn closed_question_reads_as_not_found() {
        let err: ApiError = QaError::Closed.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: ApiError = QaError::Forbidden("Only the question owner can do this").into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn bad_signature_is_a_client_error() {
        let err: ApiError = BillingError::InvalidSignature("no v1 entry".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Invalid signature");
    }
}
