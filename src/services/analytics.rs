use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tracing::error;
use uuid::Uuid;

use crate::database::models::{Question, QuestionSummary};
use crate::database::{analytics, DatabaseError};

pub const RECENT_VIEW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionStats {
    pub total_questions: usize,
    pub total_views: i64,
    pub total_answers: i64,
    pub average_views_per_question: i64,
    pub average_answers_per_question: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserAnalytics {
    pub questions: Vec<QuestionSummary>,
    pub stats: QuestionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionAnalytics {
    pub question: Question,
    pub daily_views: BTreeMap<String, i64>,
    pub total_recent_views: usize,
}

pub fn summarize(questions: &[QuestionSummary]) -> QuestionStats {
    let total_questions = questions.len();
    let total_views: i64 = questions.iter().map(|q| q.view_count).sum();
    let total_answers: i64 = questions.iter().map(|q| q.answer_count).sum();

    let (average_views_per_question, average_answers_per_question) = if total_questions > 0 {
        let n = total_questions as f64;
        (
            (total_views as f64 / n).round() as i64,
            (total_answers as f64 / n * 10.0).round() / 10.0,
        )
    } else {
        (0, 0.0)
    };

    QuestionStats {
        total_questions,
        total_views,
        total_answers,
        average_views_per_question,
        average_answers_per_question,
    }
}

/// Count views per UTC calendar day (`YYYY-MM-DD`)
pub fn daily_view_counts(views: &[DateTime<Utc>]) -> BTreeMap<String, i64> {
    let mut counts = BTreeMap::new();
    for viewed_at in views {
        *counts.entry(viewed_at.format("%Y-%m-%d").to_string()).or_insert(0) += 1;
    }
    counts
}

pub fn user_analytics(questions: Vec<QuestionSummary>) -> UserAnalytics {
    let stats = summarize(&questions);
    UserAnalytics { questions, stats }
}

pub async fn question_analytics(pool: &PgPool, question: Question) -> Result<QuestionAnalytics, DatabaseError> {
    let since = Utc::now() - Duration::days(RECENT_VIEW_DAYS);
    let views = analytics::view_times_since(pool, question.id, since).await?;
    Ok(QuestionAnalytics {
        daily_views: daily_view_counts(&views),
        total_recent_views: views.len(),
        question,
    })
}

/// Record a question view. Failures are logged and swallowed.
pub async fn track_question_view(pool: &PgPool, question_id: Uuid, viewer_ip: Option<&str>, viewer_user_id: Option<Uuid>) {
    if let Err(e) = analytics::record_view(pool, question_id, viewer_ip, viewer_user_id).await {
        error!("Failed to record view for question {}: {}", question_id, e);
    }
}
