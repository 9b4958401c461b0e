use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Question, QuestionSummary};

const QUESTION_COLUMNS: &str = "id, short_id, content, user_id, created_at, is_open, best_answer_id, \
     is_sensitive, image_urls, view_count";

/// Constraint hit when a generated short id is already taken
pub const SHORT_ID_CONSTRAINT: &str = "questions_short_id_key";

#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub short_id: String,
    pub content: String,
    pub user_id: Uuid,
    pub is_sensitive: bool,
    pub image_urls: Vec<String>,
}

pub async fn insert(pool: &PgPool, new: &NewQuestion) -> Result<Question, DatabaseError> {
    let sql = format!(
        "INSERT INTO questions (short_id, content, user_id, is_sensitive, image_urls)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {}",
        QUESTION_COLUMNS
    );
    let question = sqlx::query_as::<_, Question>(&sql)
        .bind(&new.short_id)
        .bind(&new.content)
        .bind(new.user_id)
        .bind(new.is_sensitive)
        .bind(&new.image_urls)
        .fetch_one(pool)
        .await?;
    Ok(question)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Question>, DatabaseError> {
    let sql = format!("SELECT {} FROM questions WHERE id = $1", QUESTION_COLUMNS);
    let question = sqlx::query_as::<_, Question>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(question)
}

pub async fn find_by_short_id(pool: &PgPool, short_id: &str) -> Result<Option<Question>, DatabaseError> {
    let sql = format!("SELECT {} FROM questions WHERE short_id = $1", QUESTION_COLUMNS);
    let question = sqlx::query_as::<_, Question>(&sql)
        .bind(short_id)
        .fetch_optional(pool)
        .await?;
    Ok(question)
}

/// Questions owned by a user, newest first, with their answer counts
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<QuestionSummary>, DatabaseError> {
    let questions = sqlx::query_as::<_, QuestionSummary>(
        r#"
        SELECT q.id, q.short_id, q.content, q.created_at, q.is_open, q.best_answer_id, q.view_count,
               COUNT(a.id) AS answer_count
        FROM questions q
        LEFT JOIN answers a ON a.question_id = q.id
        WHERE q.user_id = $1
        GROUP BY q.id
        ORDER BY q.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(questions)
}

/// Open or close a question; only matches when `owner_id` owns it
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    owner_id: Uuid,
    is_open: bool,
) -> Result<Option<Question>, DatabaseError> {
    let sql = format!(
        "UPDATE questions SET is_open = $3 WHERE id = $1 AND user_id = $2 RETURNING {}",
        QUESTION_COLUMNS
    );
    let question = sqlx::query_as::<_, Question>(&sql)
        .bind(id)
        .bind(owner_id)
        .bind(is_open)
        .fetch_optional(pool)
        .await?;
    Ok(question)
}

pub async fn set_best_answer(
    pool: &PgPool,
    id: Uuid,
    owner_id: Uuid,
    answer_id: Uuid,
) -> Result<Option<Question>, DatabaseError> {
    let sql = format!(
        "UPDATE questions SET best_answer_id = $3 WHERE id = $1 AND user_id = $2 RETURNING {}",
        QUESTION_COLUMNS
    );
    let question = sqlx::query_as::<_, Question>(&sql)
        .bind(id)
        .bind(owner_id)
        .bind(answer_id)
        .fetch_optional(pool)
        .await?;
    Ok(question)
}
