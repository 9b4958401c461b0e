use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::services::moderation::{ModerationSettings, Severity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub supabase: SupabaseConfig,
    pub stripe: StripeConfig,
    pub moderation: ModerationConfig,
    pub site_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub require_https: bool,
    #[serde(skip_serializing)]
    pub auth_webhook_secret: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    #[serde(skip_serializing)]
    pub anon_key: String,
    #[serde(skip_serializing)]
    pub service_role_key: String,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    pub api_base: String,
    #[serde(skip_serializing)]
    pub secret_key: String,
    pub publishable_key: String,
    #[serde(skip_serializing)]
    pub webhook_secret: String,
    pub currency: String,
    pub webhook_tolerance_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    #[serde(skip_serializing)]
    pub perspective_api_key: Option<String>,
    pub perspective_api_base: String,
    pub languages: Vec<String>,
    pub settings: ModerationSettings,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_REQUIRE_HTTPS") {
            self.security.require_https = v.parse().unwrap_or(self.security.require_https);
        }
        self.security.auth_webhook_secret = non_empty_var("AUTH_WEBHOOK_SECRET");

        // Supabase
        if let Some(v) = non_empty_var("SUPABASE_URL").or_else(|| non_empty_var("NEXT_PUBLIC_SUPABASE_URL")) {
            self.supabase.url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = non_empty_var("SUPABASE_ANON_KEY").or_else(|| non_empty_var("NEXT_PUBLIC_SUPABASE_ANON_KEY")) {
            self.supabase.anon_key = v;
        }
        if let Some(v) = non_empty_var("SUPABASE_SERVICE_ROLE_KEY") {
            self.supabase.service_role_key = v;
        }
        if let Some(v) = non_empty_var("SUPABASE_JWT_SECRET") {
            self.supabase.jwt_secret = v;
        }

        // Stripe
        if let Some(v) = non_empty_var("STRIPE_API_BASE") {
            self.stripe.api_base = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = non_empty_var("STRIPE_SECRET_KEY") {
            self.stripe.secret_key = v;
        }
        if let Some(v) = non_empty_var("STRIPE_PUBLISHABLE_KEY").or_else(|| non_empty_var("NEXT_PUBLIC_STRIPE_PUBLISHABLE_KEY")) {
            self.stripe.publishable_key = v;
        }
        if let Some(v) = non_empty_var("STRIPE_WEBHOOK_SECRET") {
            self.stripe.webhook_secret = v;
        }
        if let Some(v) = non_empty_var("STRIPE_CURRENCY") {
            self.stripe.currency = v.to_lowercase();
        }
        if let Ok(v) = env::var("STRIPE_WEBHOOK_TOLERANCE_SECS") {
            self.stripe.webhook_tolerance_secs = v.parse().unwrap_or(self.stripe.webhook_tolerance_secs);
        }

        // Moderation
        self.moderation.perspective_api_key = non_empty_var("PERSPECTIVE_API_KEY");
        if let Some(v) = non_empty_var("PERSPECTIVE_API_BASE") {
            self.moderation.perspective_api_base = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("MODERATION_LANGUAGES") {
            self.moderation.languages = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("MODERATION_ENABLED") {
            self.moderation.settings.enabled = v.parse().unwrap_or(self.moderation.settings.enabled);
        }
        if let Ok(v) = env::var("MODERATION_AUTO_HIDE") {
            self.moderation.settings.auto_hide = v.parse().unwrap_or(self.moderation.settings.auto_hide);
        }
        if let Ok(v) = env::var("MODERATION_REQUIRE_APPROVAL") {
            self.moderation.settings.require_approval =
                v.parse().unwrap_or(self.moderation.settings.require_approval);
        }
        if let Ok(v) = env::var("MODERATION_SEVERITY_THRESHOLD") {
            if let Some(severity) = Severity::parse(&v) {
                self.moderation.settings.severity_threshold = severity;
            }
        }

        self.site_url = resolve_site_url(|key| non_empty_var(key));

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                require_https: false,
                auth_webhook_secret: None,
            },
            supabase: SupabaseConfig::default(),
            stripe: StripeConfig::default(),
            moderation: ModerationConfig::default(),
            site_url: DEFAULT_SITE_URL.to_string(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://staging.qlink.example.com".to_string()],
                require_https: true,
                auth_webhook_secret: None,
            },
            supabase: SupabaseConfig::default(),
            stripe: StripeConfig::default(),
            moderation: ModerationConfig::default(),
            site_url: DEFAULT_SITE_URL.to_string(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 1024 * 1024,
            },
            security: SecurityConfig {
                cors_origins: vec!["https://qlink.example.com".to_string()],
                require_https: true,
                auth_webhook_secret: None,
            },
            supabase: SupabaseConfig::default(),
            stripe: StripeConfig::default(),
            moderation: ModerationConfig::default(),
            site_url: DEFAULT_SITE_URL.to_string(),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn callback_url(&self) -> String {
        format!("{}/auth/callback", self.site_url)
    }

    pub fn share_url(&self, short_id: &str) -> String {
        format!("{}/q/{}", self.site_url, short_id)
    }

    pub fn og_image_url(&self, short_id: &str) -> String {
        format!("{}/api/og/{}", self.site_url, short_id)
    }
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.stripe.com".to_string(),
            secret_key: String::new(),
            publishable_key: String::new(),
            webhook_secret: String::new(),
            currency: "jpy".to_string(),
            webhook_tolerance_secs: 300,
        }
    }
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            perspective_api_key: None,
            perspective_api_base: "https://commentanalyzer.googleapis.com".to_string(),
            languages: vec!["ja".to_string()],
            settings: ModerationSettings::default(),
        }
    }
}

const DEFAULT_SITE_URL: &str = "http://localhost:3000";

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Public base URL of the site: SITE_URL, then the Vercel deployment host,
/// then NEXTAUTH_URL, then localhost.
pub fn resolve_site_url<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let url = lookup("SITE_URL")
        .or_else(|| lookup("NEXT_PUBLIC_SITE_URL"))
        .or_else(|| lookup("VERCEL_URL").map(|host| format!("https://{}", host)))
        .or_else(|| lookup("NEXTAUTH_URL"))
        .unwrap_or_else(|| DEFAULT_SITE_URL.to_string());

    url.trim_end_matches('/').to_string()
}

/// Result of checking the variables the service cannot run without.
#[derive(Debug, Clone, Serialize)]
pub struct EnvValidation {
    pub is_valid: bool,
    pub missing_vars: Vec<&'static str>,
}

pub fn validate_env(config: &AppConfig) -> EnvValidation {
    let mut missing_vars = Vec::new();

    if config.supabase.url.is_empty() {
        missing_vars.push("SUPABASE_URL");
    }
    if config.supabase.anon_key.is_empty() {
        missing_vars.push("SUPABASE_ANON_KEY");
    }
    if config.stripe.publishable_key.is_empty() {
        missing_vars.push("STRIPE_PUBLISHABLE_KEY");
    }
    if config.stripe.secret_key.is_empty() {
        missing_vars.push("STRIPE_SECRET_KEY");
    }

    EnvValidation {
        is_valid: missing_vars.is_empty(),
        missing_vars,
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}
