use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::models::ReferralEntry;
use crate::database::{profiles, referrals, DatabaseError};

const REFERRED_USER_CONSTRAINT: &str = "referrals_referred_user_key";

#[derive(Debug, Error)]
pub enum ReferralError {
    #[error("Invalid referral code: {0}")]
    InvalidCode(String),

    #[error("Users cannot refer themselves")]
    SelfReferral,

    #[error("User has already been referred")]
    AlreadyReferred,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferralStats {
    pub total_referrals: usize,
    pub premium_referrals: usize,
    pub rewards_earned: usize,
    pub referrals: Vec<ReferralEntry>,
    pub referred_by: Option<ReferralEntry>,
}

impl ReferralStats {
    pub fn from_entries(referrals: Vec<ReferralEntry>, referred_by: Option<ReferralEntry>) -> Self {
        Self {
            total_referrals: referrals.len(),
            premium_referrals: referrals.iter().filter(|r| r.is_premium_signup).count(),
            rewards_earned: referrals.iter().filter(|r| r.reward_granted).count(),
            referrals,
            referred_by,
        }
    }
}

/// Record that `new_user_id` signed up with `code`. Returns a message naming the referrer.
pub async fn handle_referral_signup(pool: &PgPool, code: &str, new_user_id: Uuid) -> Result<String, ReferralError> {
    let code = code.trim();
    let referrer = profiles::find_by_referral_code(pool, code)
        .await?
        .ok_or_else(|| ReferralError::InvalidCode(code.to_string()))?;

    if referrer.id == new_user_id {
        return Err(ReferralError::SelfReferral);
    }

    if referrals::find_by_referred(pool, new_user_id).await?.is_some() {
        return Err(ReferralError::AlreadyReferred);
    }

    match referrals::insert(pool, referrer.id, new_user_id, code).await {
        Ok(_) => {}
        Err(e) if e.is_unique_violation_on(REFERRED_USER_CONSTRAINT) => return Err(ReferralError::AlreadyReferred),
        Err(e) => return Err(e.into()),
    }

    info!("Recorded referral of {} by {}", new_user_id, referrer.id);
    Ok(format!("Signed up via {}'s referral", referrer.username))
}

pub async fn referral_stats(pool: &PgPool, user_id: Uuid) -> Result<ReferralStats, ReferralError> {
    let entries = referrals::list_for_referrer(pool, user_id).await?;
    let referred_by = referrals::find_referrer_entry(pool, user_id).await?;
    Ok(ReferralStats::from_entries(entries, referred_by))
}

/// Mark the referral that brought `user_id` in as a premium sign-up.
/// Returns the referrer when a reward was granted.
pub async fn grant_premium_reward(pool: &PgPool, user_id: Uuid) -> Result<Option<Uuid>, ReferralError> {
    let Some(referral) = referrals::find_by_referred(pool, user_id).await? else {
        return Ok(None);
    };

    if referral.reward_granted {
        warn!("Referral reward for {} was already granted", user_id);
        return Ok(Some(referral.referrer_user_id));
    }

    referrals::mark_premium_reward(pool, referral.id).await?;
    info!("Granted referral reward to {} for {}", referral.referrer_user_id, user_id);
    Ok(Some(referral.referrer_user_id))
}
