use std::sync::Arc;

use crate::auth::AuthClient;
use crate::config::AppConfig;
use crate::services::billing::StripeClient;
use crate::services::moderation::ModerationService;

/// Shared clients handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthClient,
    pub stripe: Arc<StripeClient>,
    pub moderation: Arc<ModerationService>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            auth: AuthClient::from_config(&config.supabase),
            stripe: Arc::new(StripeClient::from_config(&config.stripe)),
            moderation: Arc::new(ModerationService::from_config(config)),
        }
    }
}
