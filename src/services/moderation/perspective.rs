use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::{ModerationError, ModerationResult, Severity, ToxicityScorer};

pub const ATTRIBUTES: &[&str] = &[
    "TOXICITY",
    "SEVERE_TOXICITY",
    "IDENTITY_ATTACK",
    "INSULT",
    "PROFANITY",
    "THREAT",
];

/// Google Perspective comment analyzer
pub struct PerspectiveClient {
    client: Client,
    api_key: String,
    api_base: String,
    languages: Vec<String>,
}

impl PerspectiveClient {
    pub fn new(api_key: String, api_base: String, languages: Vec<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key,
            api_base,
            languages,
        }
    }

    fn request_body(&self, content: &str) -> Value {
        let requested: serde_json::Map<String, Value> = ATTRIBUTES
            .iter()
            .map(|attr| (attr.to_string(), json!({})))
            .collect();

        json!({
            "languages": self.languages,
            "requestedAttributes": requested,
            "comment": { "text": content },
        })
    }
}

/// Highest summary score across the requested attributes; missing scores count as 0
pub fn max_attribute_score(response: &Value) -> f64 {
    let scores = &response["attributeScores"];
    ATTRIBUTES
        .iter()
        .map(|attr| scores[*attr]["summaryScore"]["value"].as_f64().unwrap_or(0.0))
        .fold(0.0, f64::max)
}

pub fn result_from_score(score: f64) -> ModerationResult {
    let severity = if score > 0.9 {
        Severity::High
    } else if score > 0.7 {
        Severity::Medium
    } else {
        Severity::Low
    };

    if score < 0.7 {
        ModerationResult {
            is_appropriate: true,
            reason: String::new(),
            severity,
            confidence: score,
        }
    } else {
        ModerationResult::flagged("flagged by the toxicity model", severity, score)
    }
}

#[async_trait]
impl ToxicityScorer for PerspectiveClient {
    fn name(&self) -> &'static str {
        "perspective"
    }

    async fn score(&self, content: &str) -> Result<ModerationResult, ModerationError> {
        let url = format!("{}/v1alpha1/comments:analyze", self.api_base);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.request_body(content))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ModerationError::Upstream { status, body });
        }

        let body: Value = response.json().await?;
        if !body["attributeScores"].is_object() {
            return Err(ModerationError::Malformed("missing attributeScores".to_string()));
        }

        Ok(result_from_score(max_attribute_score(&body)))
    }
}
