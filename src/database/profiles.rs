use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{AuthSource, Profile};

const PROFILE_COLUMNS: &str = "id, username, display_name, profile_pic_url, created_at, updated_at, \
     auth_source, is_premium, last_login, referral_code";

/// Values needed to create a profile for a freshly signed-up user
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub auth_source: AuthSource,
    pub referral_code: String,
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Profile>, DatabaseError> {
    let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
    let profile = sqlx::query_as::<_, Profile>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<Profile>, DatabaseError> {
    let sql = format!("SELECT {} FROM profiles WHERE username = $1", PROFILE_COLUMNS);
    let profile = sqlx::query_as::<_, Profile>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

pub async fn find_by_referral_code(pool: &PgPool, code: &str) -> Result<Option<Profile>, DatabaseError> {
    let sql = format!("SELECT {} FROM profiles WHERE referral_code = $1", PROFILE_COLUMNS);
    let profile = sqlx::query_as::<_, Profile>(&sql)
        .bind(code)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

pub async fn insert(pool: &PgPool, new: &NewProfile) -> Result<Profile, DatabaseError> {
    let sql = format!(
        "INSERT INTO profiles (id, username, display_name, auth_source, is_premium, referral_code, created_at)
         VALUES ($1, $2, $3, $4, false, $5, now())
         RETURNING {}",
        PROFILE_COLUMNS
    );
    let profile = sqlx::query_as::<_, Profile>(&sql)
        .bind(new.id)
        .bind(&new.username)
        .bind(&new.display_name)
        .bind(new.auth_source.as_str())
        .bind(&new.referral_code)
        .fetch_one(pool)
        .await?;
    Ok(profile)
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    username: &str,
    display_name: Option<&str>,
) -> Result<Profile, DatabaseError> {
    let sql = format!(
        "UPDATE profiles SET username = $2, display_name = $3, updated_at = now()
         WHERE id = $1
         RETURNING {}",
        PROFILE_COLUMNS
    );
    sqlx::query_as::<_, Profile>(&sql)
        .bind(id)
        .bind(username)
        .bind(display_name)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Profile not found".to_string()))
}

pub async fn touch_last_login(pool: &PgPool, id: Uuid) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE profiles SET last_login = now() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
