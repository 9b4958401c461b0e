// handlers/public/questions.rs - Share-link pages for anonymous visitors

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::config;
use crate::database::DatabaseManager;
use crate::handlers::client_ip;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{analytics, qa};
use crate::state::AppState;

/// GET /q/:short_id - Open question behind a share link; records a view
pub async fn question_get(Path(short_id): Path<String>, headers: HeaderMap) -> ApiResult<qa::PublicQuestion> {
    let pool = DatabaseManager::pool().await?;
    let question = qa::public_question(&pool, &short_id, config::config()).await?;

    let ip = client_ip(&headers);
    analytics::track_question_view(&pool, question.id, Some(&ip), None).await;

    Ok(ApiResponse::success(question))
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub content: String,
}

/**
 * POST /q/:short_id/answers - Submit an anonymous answer
 *
 * Input: { "content": "..." }
 *
 * The length limit follows the question owner's plan. Moderation decides
 * whether the answer is stored hidden; the response says which.
 */
pub async fn answer_post(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<AnswerRequest>,
) -> ApiResult<qa::SubmittedAnswer> {
    let pool = DatabaseManager::pool().await?;
    let submitted = qa::submit_answer(&pool, &state.moderation, &short_id, &body.content, client_ip(&headers)).await?;
    Ok(ApiResponse::created(submitted))
}
