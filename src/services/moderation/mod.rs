// Content moderation: keyword heuristics plus an optional toxicity model
pub mod keywords;
pub mod mask;
pub mod perspective;
pub mod settings;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::config::AppConfig;

pub use keywords::check_with_keywords;
pub use mask::mask_sensitive;
pub use perspective::PerspectiveClient;
pub use settings::{review, ModerationSettings, ReviewAction, ReviewOutcome};

/// Severity of a moderation finding, ordered low < medium < high
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Severity> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    pub is_appropriate: bool,
    pub reason: String,
    pub severity: Severity,
    pub confidence: f64,
}

impl ModerationResult {
    pub fn appropriate(confidence: f64) -> Self {
        Self {
            is_appropriate: true,
            reason: String::new(),
            severity: Severity::Low,
            confidence,
        }
    }

    pub fn flagged(reason: impl Into<String>, severity: Severity, confidence: f64) -> Self {
        Self {
            is_appropriate: false,
            reason: reason.into(),
            severity,
            confidence,
        }
    }
}

#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Toxicity API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Unexpected toxicity API response: {0}")]
    Malformed(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// External model that scores text for toxicity
#[async_trait]
pub trait ToxicityScorer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn score(&self, content: &str) -> Result<ModerationResult, ModerationError>;
}

#[async_trait]
impl ToxicityScorer for Box<dyn ToxicityScorer> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn score(&self, content: &str) -> Result<ModerationResult, ModerationError> {
        (**self).score(content).await
    }
}

/// Runs content through the configured scorer, falling back to keywords
pub struct ModerationService {
    scorer: Option<Box<dyn ToxicityScorer>>,
    settings: ModerationSettings,
}

impl ModerationService {
    pub fn new(scorer: Option<Box<dyn ToxicityScorer>>, settings: ModerationSettings) -> Self {
        Self { scorer, settings }
    }

    /// Keyword checks only, no network calls
    pub fn keywords_only(settings: ModerationSettings) -> Self {
        Self::new(None, settings)
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let scorer = config.moderation.perspective_api_key.as_ref().map(|key| {
            Box::new(PerspectiveClient::new(
                key.clone(),
                config.moderation.perspective_api_base.clone(),
                config.moderation.languages.clone(),
            )) as Box<dyn ToxicityScorer>
        });

        if scorer.is_none() {
            warn!("PERSPECTIVE_API_KEY not set, using keyword-based moderation");
        }

        Self::new(scorer, config.moderation.settings.clone())
    }

    pub fn settings(&self) -> &ModerationSettings {
        &self.settings
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.as_ref().map(|s| s.name()).unwrap_or("keywords")
    }

    pub async fn moderate(&self, content: &str) -> ModerationResult {
        match &self.scorer {
            Some(scorer) => match scorer.score(content).await {
                Ok(result) => result,
                Err(e) => {
                    warn!("{} moderation failed, falling back to keywords: {}", scorer.name(), e);
                    check_with_keywords(content)
                }
            },
            None => check_with_keywords(content),
        }
    }

    /// Moderate and apply the configured settings in one step
    pub async fn moderate_and_review(&self, content: &str) -> (ModerationResult, ReviewOutcome) {
        let result = self.moderate(content).await;
        let outcome = review(&result, &self.settings);
        (result, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedScorer(f64);

    #[async_trait]
    impl ToxicityScorer for FixedScorer {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn score(&self, _content: &str) -> Result<ModerationResult, ModerationError> {
            Ok(perspective::result_from_score(self.0))
        }
    }

    struct FailingScorer;

    #[async_trait]
    impl ToxicityScorer for FailingScorer {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn score(&self, _content: &str) -> Result<ModerationResult, ModerationError> {
            Err(ModerationError::Upstream {
                status: 429,
                body: "quota".into(),
            })
        }
    }

    #[test]
    fn severity_parses_and_orders() {
        assert_eq!(Severity::parse(" High "), Some(Severity::High));
        assert_eq!(Severity::parse("extreme"), None);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[tokio::test]
    async fn scorer_result_is_used_when_available() {
        let service = ModerationService::new(Some(Box::new(FixedScorer(0.95))), ModerationSettings::default());
        let result = service.moderate("hello there friend").await;
        assert!(!result.is_appropriate);
        assert_eq!(result.severity, Severity::High);
        assert_eq!(service.scorer_name(), "fixed");
    }

    #[tokio::test]
    async fn scorer_failure_falls_back_to_keywords() {
        let service = ModerationService::new(Some(Box::new(FailingScorer)), ModerationSettings::default());
        let result = service.moderate("お前はバカだ").await;
        assert!(!result.is_appropriate);
        assert_eq!(result.severity, Severity::High);
        assert_eq!(result.confidence, 0.8);
    }

    #[tokio::test]
    async fn keywords_only_service_reviews_clean_text() {
        let service = ModerationService::keywords_only(ModerationSettings::default());
        let (result, outcome) = service.moderate_and_review("今日はいい天気ですね").await;
        assert!(result.is_appropriate);
        assert_eq!(outcome.action, ReviewAction::Publish);
        assert!(!outcome.flagged);
        assert_eq!(service.scorer_name(), "keywords");
    }
}
