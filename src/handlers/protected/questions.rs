// handlers/protected/questions.rs - The signed-in user's questions

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::config;
use crate::database::models::{Question, QuestionSummary};
use crate::database::{questions, DatabaseManager};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::services::qa;
use crate::state::AppState;

/// GET /api/questions - Own questions, newest first, with answer counts
pub async fn questions_get(Extension(user): Extension<CurrentUser>) -> ApiResult<Vec<QuestionSummary>> {
    let pool = DatabaseManager::pool().await?;
    Ok(ApiResponse::success(questions::list_for_user(&pool, user.id).await?))
}

#[derive(Debug, Deserialize)]
pub struct NewQuestionRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/**
 * POST /api/questions - Ask a question
 *
 * Input: { "content": "...", "image_urls": ["https://..."] (premium only, max 4) }
 *
 * Content is limited by the author's plan. Flagged content is stored with
 * `is_sensitive` so share cards mask it.
 */
pub async fn questions_post(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<NewQuestionRequest>,
) -> ApiResult<qa::CreatedQuestion> {
    let pool = DatabaseManager::pool().await?;
    let created = qa::create_question(
        &pool,
        &state.moderation,
        config::config(),
        user.id,
        &body.content,
        body.image_urls,
    )
    .await?;
    Ok(ApiResponse::created(created))
}

/// GET /api/questions/:id - Question with its answers
pub async fn question_get(
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<qa::QuestionDetail> {
    let pool = DatabaseManager::pool().await?;
    Ok(ApiResponse::success(qa::question_detail(&pool, id, user.id).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub is_open: bool,
}

/// PUT /api/questions/:id/status - Open or close (owner only)
pub async fn status_put(
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusRequest>,
) -> ApiResult<Question> {
    let pool = DatabaseManager::pool().await?;
    Ok(ApiResponse::success(qa::set_status(&pool, id, user.id, body.is_open).await?))
}

#[derive(Debug, Deserialize)]
pub struct BestAnswerRequest {
    pub answer_id: Uuid,
}

/// PUT /api/questions/:id/best-answer - Pick a visible answer (owner only)
pub async fn best_answer_put(
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<BestAnswerRequest>,
) -> ApiResult<Question> {
    let pool = DatabaseManager::pool().await?;
    Ok(ApiResponse::success(
        qa::choose_best_answer(&pool, id, user.id, body.answer_id).await?,
    ))
}
