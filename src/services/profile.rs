use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUserInfo;
use crate::database::models::{AuthSource, Profile};
use crate::database::profiles::{self, NewProfile};
use crate::database::DatabaseError;
use crate::services::short_id;

pub const MIN_USERNAME_CHARS: usize = 3;
const MAX_CREATE_ATTEMPTS: usize = 3;

/// Placeholder username for a new account: the email prefix (or `user_` plus
/// six digits of the clock) followed by the last four digits of the clock.
pub fn initial_username(email: Option<&str>, now_ms: i64) -> String {
    let digits = now_ms.to_string();
    let tail = |n: usize| digits[digits.len().saturating_sub(n)..].to_string();

    let prefix = email
        .and_then(|e| e.split('@').next())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("user_{}", tail(6)));

    format!("{}_{}", prefix, tail(4))
}

pub fn validate_username(username: &str) -> Result<String, String> {
    let trimmed = username.trim();
    if trimmed.chars().count() < MIN_USERNAME_CHARS {
        return Err(format!("Username must be at least {} characters", MIN_USERNAME_CHARS));
    }
    Ok(trimmed.to_string())
}

/// Whether `user_id` may take a username currently held by `holder`
pub fn username_available(holder: Option<Uuid>, user_id: Uuid) -> bool {
    holder.map_or(true, |id| id == user_id)
}

/// Create the profile for an auth user unless one exists.
/// Returns the profile and whether it was created.
pub async fn ensure_profile(pool: &PgPool, user: &AuthUserInfo) -> Result<(Profile, bool), DatabaseError> {
    if let Some(existing) = profiles::find_by_id(pool, user.id).await? {
        return Ok((existing, false));
    }

    let display_name = user.user_metadata["full_name"].as_str().map(str::to_string);
    let auth_source = AuthSource::from_provider(user.provider());

    let mut attempt = 0;
    loop {
        attempt += 1;
        let now_ms = chrono::Utc::now().timestamp_millis();
        let new = NewProfile {
            id: user.id,
            username: initial_username(user.email.as_deref(), now_ms),
            display_name: display_name.clone(),
            auth_source,
            referral_code: short_id::referral_code(),
        };

        match profiles::insert(pool, &new).await {
            Ok(profile) => {
                info!("Created profile {} for {}", profile.username, user.id);
                return Ok((profile, true));
            }
            Err(DatabaseError::UniqueViolation(constraint)) if constraint == "profiles_pkey" => {
                // created concurrently by another request
                let profile = profiles::find_by_id(pool, user.id)
                    .await?
                    .ok_or_else(|| DatabaseError::NotFound("Profile not found".to_string()))?;
                return Ok((profile, false));
            }
            Err(DatabaseError::UniqueViolation(constraint)) if attempt < MAX_CREATE_ATTEMPTS => {
                warn!("Profile insert hit {}, retrying", constraint);
            }
            Err(e) => return Err(e),
        }
    }
}
