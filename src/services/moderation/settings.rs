use serde::{Deserialize, Serialize};

use super::{ModerationResult, Severity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationSettings {
    pub enabled: bool,
    /// Hide flagged content instead of publishing it
    pub auto_hide: bool,
    /// Hold everything for manual approval
    pub require_approval: bool,
    /// Lowest severity that counts as flagged
    pub severity_threshold: Severity,
}

impl Default for ModerationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_hide: true,
            require_approval: false,
            severity_threshold: Severity::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Publish,
    Hide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub action: ReviewAction,
    pub flagged: bool,
}

impl ReviewOutcome {
    pub fn is_hidden(&self) -> bool {
        self.action == ReviewAction::Hide
    }
}

/// Decide what to do with content given a moderation result
pub fn review(result: &ModerationResult, settings: &ModerationSettings) -> ReviewOutcome {
    if !settings.enabled {
        return ReviewOutcome {
            action: ReviewAction::Publish,
            flagged: false,
        };
    }

    let flagged = !result.is_appropriate && result.severity >= settings.severity_threshold;

    let action = if settings.require_approval || (flagged && settings.auto_hide) {
        ReviewAction::Hide
    } else {
        ReviewAction::Publish
    };

    ReviewOutcome { action, flagged }
}
