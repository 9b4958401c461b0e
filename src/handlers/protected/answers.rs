// handlers/protected/answers.rs - PUT /api/answers/:id/visibility

use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::Answer;
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::qa;

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub is_hidden: bool,
}

/// Hide or show an answer; only the owner of the answer's question may
pub async fn visibility_put(
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<VisibilityRequest>,
) -> ApiResult<Answer> {
    let pool = DatabaseManager::pool().await?;
    Ok(ApiResponse::success(
        qa::set_answer_visibility(&pool, id, user.id, body.is_hidden).await?,
    ))
}
