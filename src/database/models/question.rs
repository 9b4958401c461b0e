use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub short_id: String,
    pub content: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub is_open: bool,
    pub best_answer_id: Option<Uuid>,
    pub is_sensitive: bool,
    pub image_urls: Vec<String>,
    pub view_count: i64,
}

impl Question {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Question row joined with its answer count, used by listings and analytics
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionSummary {
    pub id: Uuid,
    pub short_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_open: bool,
    pub best_answer_id: Option<Uuid>,
    pub view_count: i64,
    pub answer_count: i64,
}
