use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Referral {
    pub id: Uuid,
    pub referrer_user_id: Uuid,
    pub referred_user_id: Uuid,
    pub referral_code: String,
    pub referred_at: DateTime<Utc>,
    pub is_premium_signup: bool,
    pub reward_granted: bool,
}

/// Referral joined with the other party's public names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReferralEntry {
    pub id: Uuid,
    pub referred_at: DateTime<Utc>,
    pub is_premium_signup: bool,
    pub reward_granted: bool,
    pub username: String,
    pub display_name: Option<String>,
}
