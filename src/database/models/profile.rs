use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub profile_pic_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub auth_source: String,
    pub is_premium: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub referral_code: Option<String>,
}

impl Profile {
    /// Name shown next to a question: display name when set, else username
    pub fn public_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// Sign-in method recorded on the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthSource {
    Email,
    Google,
    Twitter,
}

impl AuthSource {
    pub fn from_provider(provider: Option<&str>) -> Self {
        match provider {
            Some("google") => AuthSource::Google,
            Some("twitter") => AuthSource::Twitter,
            _ => AuthSource::Email,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthSource::Email => "email",
            AuthSource::Google => "google",
            AuthSource::Twitter => "twitter",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(display_name: Option<&str>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            username: "taro_1234".to_string(),
            display_name: display_name.map(str::to_string),
            profile_pic_url: None,
            created_at: Utc::now(),
            updated_at: None,
            auth_source: "email".to_string(),
            is_premium: false,
            last_login: None,
            referral_code: None,
        }
    }

    #[test]
    fn public_name_prefers_display_name() {
        assert_eq!(profile(Some("Taro")).public_name(), "Taro");
        assert_eq!(profile(None).public_name(), "taro_1234");
        assert_eq!(profile(Some("  ")).public_name(), "taro_1234");
    }

    #[test]
    fn unknown_providers_count_as_email() {
        assert_eq!(AuthSource::from_provider(Some("google")), AuthSource::Google);
        assert_eq!(AuthSource::from_provider(Some("github")), AuthSource::Email);
        assert_eq!(AuthSource::from_provider(None).as_str(), "email");
    }
}
