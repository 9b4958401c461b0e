// handlers/protected/moderation.rs - POST /api/moderation/check (development only)

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::moderation::{ModerationResult, ReviewOutcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub content: String,
    pub scorer: &'static str,
    pub result: ModerationResult,
    pub review: ReviewOutcome,
}

/// Run the moderation pipeline on arbitrary text
pub async fn check_post(State(state): State<AppState>, Json(body): Json<CheckRequest>) -> ApiResult<CheckResponse> {
    if !config::config().is_development() {
        return Err(ApiError::not_found("Not found"));
    }
    if body.content.trim().is_empty() {
        return Err(ApiError::field_error("content", "content is required"));
    }

    let (result, review) = state.moderation.moderate_and_review(&body.content).await;
    Ok(ApiResponse::success(CheckResponse {
        scorer: state.moderation.scorer_name(),
        content: body.content,
        result,
        review,
    }))
}
