// Question and answer flows shared by the public and signed-in routes
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::answers::{self, NewAnswer};
use crate::database::models::{Answer, Question};
use crate::database::questions::{self, NewQuestion};
use crate::database::{profiles, DatabaseError};
use crate::services::entitlement::{self, character_limit, ContentKind, ImageError};
use crate::services::moderation::{ModerationResult, ModerationService, ReviewOutcome};
use crate::services::short_id;

#[derive(Debug, Error)]
pub enum QaError {
    #[error("{message}")]
    Invalid { field: &'static str, message: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("This question is closed")]
    Closed,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Trim content and enforce non-empty and the character limit
pub fn validate_content(content: &str, limit: usize, field: &'static str) -> Result<String, QaError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(QaError::Invalid {
            field,
            message: format!("{} is required", field),
        });
    }
    let length = trimmed.chars().count();
    if length > limit {
        return Err(QaError::Invalid {
            field,
            message: format!("{} must be at most {} characters ({} given)", field, limit, length),
        });
    }
    Ok(trimmed.to_string())
}

/// First `X-Forwarded-For` entry, else `unknown`
pub fn client_ip(forwarded_for: Option<&str>) -> String {
    forwarded_for
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedQuestion {
    pub question: Question,
    pub moderation: ModerationResult,
    pub share_url: String,
}

pub async fn create_question(
    pool: &PgPool,
    moderation: &ModerationService,
    config: &AppConfig,
    user_id: Uuid,
    content: &str,
    image_urls: Vec<String>,
) -> Result<CreatedQuestion, QaError> {
    let is_premium = entitlement::is_premium(pool, user_id).await?;
    let content = validate_content(content, character_limit(is_premium, ContentKind::Question), "content")?;
    entitlement::validate_image_urls(is_premium, &image_urls)?;

    let (result, outcome) = moderation.moderate_and_review(&content).await;

    let question = short_id::with_unique_short_id(questions::SHORT_ID_CONSTRAINT, |short_id| {
        let new = NewQuestion {
            short_id,
            content: content.clone(),
            user_id,
            is_sensitive: outcome.flagged,
            image_urls: image_urls.clone(),
        };
        async move { questions::insert(pool, &new).await }
    })
    .await?;

    info!("Question {} created by {} (sensitive: {})", question.short_id, user_id, question.is_sensitive);
    Ok(CreatedQuestion {
        share_url: config.share_url(&question.short_id),
        question,
        moderation: result,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmittedAnswer {
    pub answer: Answer,
    pub review: ReviewOutcome,
}

pub async fn submit_answer(
    pool: &PgPool,
    moderation: &ModerationService,
    question_short_id: &str,
    content: &str,
    ip_address: String,
) -> Result<SubmittedAnswer, QaError> {
    if content.trim().is_empty() {
        return Err(QaError::Invalid {
            field: "content",
            message: "content is required".to_string(),
        });
    }

    let question = questions::find_by_short_id(pool, question_short_id)
        .await?
        .ok_or(QaError::NotFound("Question"))?;
    if !question.is_open {
        return Err(QaError::Closed);
    }

    // answer length follows the question owner's plan
    let owner_premium = entitlement::is_premium(pool, question.user_id).await?;
    let content = validate_content(content, character_limit(owner_premium, ContentKind::Answer), "content")?;

    let (_, review) = moderation.moderate_and_review(&content).await;

    let answer = short_id::with_unique_short_id(answers::SHORT_ID_CONSTRAINT, |short_id| {
        let new = NewAnswer {
            short_id,
            content: content.clone(),
            question_id: question.id,
            is_hidden: review.is_hidden(),
            ip_address: Some(ip_address.clone()),
        };
        async move { answers::insert(pool, &new).await }
    })
    .await?;

    info!("Answer {} submitted to {} (hidden: {})", answer.short_id, question.short_id, answer.is_hidden);
    Ok(SubmittedAnswer { answer, review })
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionDetail {
    pub question: Question,
    pub answers: Vec<Answer>,
    pub is_owner: bool,
}

pub fn visible_answers(answers: Vec<Answer>, is_owner: bool) -> Vec<Answer> {
    if is_owner {
        answers
    } else {
        answers.into_iter().filter(|a| !a.is_hidden).collect()
    }
}

pub async fn question_detail(pool: &PgPool, question_id: Uuid, viewer_id: Uuid) -> Result<QuestionDetail, QaError> {
    let question = questions::find_by_id(pool, question_id)
        .await?
        .ok_or(QaError::NotFound("Question"))?;
    let is_owner = question.is_owned_by(viewer_id);
    let answers = visible_answers(answers::list_for_question(pool, question.id).await?, is_owner);
    Ok(QuestionDetail {
        question,
        answers,
        is_owner,
    })
}

/// Load a question and require `user_id` to own it
pub async fn owned_question(pool: &PgPool, question_id: Uuid, user_id: Uuid) -> Result<Question, QaError> {
    let question = questions::find_by_id(pool, question_id)
        .await?
        .ok_or(QaError::NotFound("Question"))?;
    if !question.is_owned_by(user_id) {
        return Err(QaError::Forbidden("Only the question owner can do this"));
    }
    Ok(question)
}

pub async fn set_status(pool: &PgPool, question_id: Uuid, user_id: Uuid, is_open: bool) -> Result<Question, QaError> {
    owned_question(pool, question_id, user_id).await?;
    questions::update_status(pool, question_id, user_id, is_open)
        .await?
        .ok_or(QaError::NotFound("Question"))
}

pub async fn choose_best_answer(
    pool: &PgPool,
    question_id: Uuid,
    user_id: Uuid,
    answer_id: Uuid,
) -> Result<Question, QaError> {
    owned_question(pool, question_id, user_id).await?;

    let answer = answers::find_by_id(pool, answer_id)
        .await?
        .filter(|a| a.question_id == question_id)
        .ok_or(QaError::NotFound("Answer"))?;
    if answer.is_hidden {
        return Err(QaError::Invalid {
            field: "answer_id",
            message: "A hidden answer cannot be chosen as best answer".to_string(),
        });
    }

    questions::set_best_answer(pool, question_id, user_id, answer.id)
        .await?
        .ok_or(QaError::NotFound("Question"))
}

pub async fn set_answer_visibility(pool: &PgPool, answer_id: Uuid, user_id: Uuid, is_hidden: bool) -> Result<Answer, QaError> {
    let answer = answers::find_by_id(pool, answer_id)
        .await?
        .ok_or(QaError::NotFound("Answer"))?;
    owned_question(pool, answer.question_id, user_id).await?;
    Ok(answers::set_hidden(pool, answer.id, is_hidden).await?)
}

/// What anonymous visitors see on a share link
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub short_id: String,
    pub content: String,
    pub author_name: String,
    pub image_urls: Vec<String>,
    pub is_sensitive: bool,
    pub created_at: DateTime<Utc>,
    pub answer_limit: usize,
    pub og_image_url: String,
}

pub async fn public_question(pool: &PgPool, short_id: &str, config: &AppConfig) -> Result<PublicQuestion, QaError> {
    let question = questions::find_by_short_id(pool, short_id)
        .await?
        .filter(|q| q.is_open)
        .ok_or(QaError::NotFound("Question"))?;

    let author_name = profiles::find_by_id(pool, question.user_id)
        .await?
        .map(|p| p.public_name().to_string())
        .unwrap_or_else(|| "Anonymous".to_string());
    let owner_premium = entitlement::is_premium(pool, question.user_id).await?;

    Ok(PublicQuestion {
        og_image_url: config.og_image_url(&question.short_id),
        answer_limit: character_limit(owner_premium, ContentKind::Answer),
        id: question.id,
        short_id: question.short_id,
        content: question.content,
        author_name,
        image_urls: question.image_urls,
        is_sensitive: question.is_sensitive,
        created_at: question.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(hidden: bool) -> Answer {
        Answer {
            id: Uuid::new_v4(),
            short_id: "a".into(),
            content: "c".into(),
            question_id: Uuid::new_v4(),
            created_at: Utc::now(),
            is_hidden: hidden,
            ip_address: None,
        }
    }

    #[test]
    fn content_is_trimmed_and_limited_by_characters() {
        assert_eq!(validate_content("  hello  ", 5, "content").unwrap(), "hello");
        assert!(validate_content("   ", 5, "content").is_err());
        // 5 multibyte characters fit a 5 character limit
        assert!(validate_content("あいうえお", 5, "content").is_ok());
        let err = validate_content("あいうえおか", 5, "content").unwrap_err();
        assert!(matches!(err, QaError::Invalid { field: "content", .. }));
    }

    #[test]
    fn client_ip_takes_first_forwarded_entry() {
        assert_eq!(client_ip(Some("203.0.113.7, 10.0.0.1")), "203.0.113.7");
        assert_eq!(client_ip(Some("  ")), "unknown");
        assert_eq!(client_ip(None), "unknown");
    }

    #[test]
    fn hidden_answers_only_for_owner() {
        let answers = vec![answer(false), answer(true)];
        assert_eq!(visible_answers(answers.clone(), true).len(), 2);
        let public = visible_answers(answers, false);
        assert_eq!(public.len(), 1);
        assert!(!public[0].is_hidden);
    }
}
