use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Answer {
    pub id: Uuid,
    pub short_id: String,
    pub content: String,
    pub question_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub is_hidden: bool,
    #[serde(skip_serializing)]
    pub ip_address: Option<String>,
}
