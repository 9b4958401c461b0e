use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Answer;

const ANSWER_COLUMNS: &str = "id, short_id, content, question_id, created_at, is_hidden, ip_address";

pub const SHORT_ID_CONSTRAINT: &str = "answers_short_id_key";

#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub short_id: String,
    pub content: String,
    pub question_id: Uuid,
    pub is_hidden: bool,
    pub ip_address: Option<String>,
}

pub async fn insert(pool: &PgPool, new: &NewAnswer) -> Result<Answer, DatabaseError> {
    let sql = format!(
        "INSERT INTO answers (short_id, content, question_id, is_hidden, ip_address)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {}",
        ANSWER_COLUMNS
    );
    let answer = sqlx::query_as::<_, Answer>(&sql)
        .bind(&new.short_id)
        .bind(&new.content)
        .bind(new.question_id)
        .bind(new.is_hidden)
        .bind(&new.ip_address)
        .fetch_one(pool)
        .await?;
    Ok(answer)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Answer>, DatabaseError> {
    let sql = format!("SELECT {} FROM answers WHERE id = $1", ANSWER_COLUMNS);
    let answer = sqlx::query_as::<_, Answer>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(answer)
}

/// Answers to a question, oldest first
pub async fn list_for_question(pool: &PgPool, question_id: Uuid) -> Result<Vec<Answer>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM answers WHERE question_id = $1 ORDER BY created_at ASC",
        ANSWER_COLUMNS
    );
    let answers = sqlx::query_as::<_, Answer>(&sql)
        .bind(question_id)
        .fetch_all(pool)
        .await?;
    Ok(answers)
}

pub async fn set_hidden(pool: &PgPool, id: Uuid, is_hidden: bool) -> Result<Answer, DatabaseError> {
    let sql = format!(
        "UPDATE answers SET is_hidden = $2 WHERE id = $1 RETURNING {}",
        ANSWER_COLUMNS
    );
    sqlx::query_as::<_, Answer>(&sql)
        .bind(id)
        .bind(is_hidden)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Answer not found".to_string()))
}
