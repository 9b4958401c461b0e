use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Referral, ReferralEntry};

const REFERRAL_COLUMNS: &str = "id, referrer_user_id, referred_user_id, referral_code, referred_at, \
     is_premium_signup, reward_granted";

pub async fn find_by_referred(pool: &PgPool, referred_user_id: Uuid) -> Result<Option<Referral>, DatabaseError> {
    let sql = format!("SELECT {} FROM referrals WHERE referred_user_id = $1", REFERRAL_COLUMNS);
    let referral = sqlx::query_as::<_, Referral>(&sql)
        .bind(referred_user_id)
        .fetch_optional(pool)
        .await?;
    Ok(referral)
}

pub async fn insert(
    pool: &PgPool,
    referrer_user_id: Uuid,
    referred_user_id: Uuid,
    referral_code: &str,
) -> Result<Referral, DatabaseError> {
    let sql = format!(
        "INSERT INTO referrals (referrer_user_id, referred_user_id, referral_code, referred_at)
         VALUES ($1, $2, $3, now())
         RETURNING {}",
        REFERRAL_COLUMNS
    );
    let referral = sqlx::query_as::<_, Referral>(&sql)
        .bind(referrer_user_id)
        .bind(referred_user_id)
        .bind(referral_code)
        .fetch_one(pool)
        .await?;
    Ok(referral)
}

/// Users referred by `referrer_user_id`, newest first
pub async fn list_for_referrer(pool: &PgPool, referrer_user_id: Uuid) -> Result<Vec<ReferralEntry>, DatabaseError> {
    let entries = sqlx::query_as::<_, ReferralEntry>(
        r#"
        SELECT r.id, r.referred_at, r.is_premium_signup, r.reward_granted, p.username, p.display_name
        FROM referrals r
        JOIN profiles p ON p.id = r.referred_user_id
        WHERE r.referrer_user_id = $1
        ORDER BY r.referred_at DESC
        "#,
    )
    .bind(referrer_user_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

/// The referral that brought `referred_user_id` in, with the referrer's names
pub async fn find_referrer_entry(
    pool: &PgPool,
    referred_user_id: Uuid,
) -> Result<Option<ReferralEntry>, DatabaseError> {
    let entry = sqlx::query_as::<_, ReferralEntry>(
        r#"
        SELECT r.id, r.referred_at, r.is_premium_signup, r.reward_granted, p.username, p.display_name
        FROM referrals r
        JOIN profiles p ON p.id = r.referrer_user_id
        WHERE r.referred_user_id = $1
        "#,
    )
    .bind(referred_user_id)
    .fetch_optional(pool)
    .await?;
    Ok(entry)
}

pub async fn mark_premium_reward(pool: &PgPool, referral_id: Uuid) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE referrals SET is_premium_signup = true, reward_granted = true WHERE id = $1")
        .bind(referral_id)
        .execute(pool)
        .await?;
    Ok(())
}
