use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::database::models::{PremiumPlan, Subscription};
use crate::database::{subscriptions, DatabaseError};

pub const MAX_IMAGES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Question,
    Answer,
}

/// Maximum content length in characters
pub fn character_limit(is_premium: bool, kind: ContentKind) -> usize {
    match (kind, is_premium) {
        (ContentKind::Question, false) => 100,
        (ContentKind::Question, true) => 1000,
        (ContentKind::Answer, false) => 500,
        (ContentKind::Answer, true) => 2000,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumFeature {
    AdFree,
    ExtendedQuestionLength,
    ExtendedAnswerLength,
    HideAnswers,
    Analytics,
}

impl PremiumFeature {
    pub const ALL: [PremiumFeature; 5] = [
        PremiumFeature::AdFree,
        PremiumFeature::ExtendedQuestionLength,
        PremiumFeature::ExtendedAnswerLength,
        PremiumFeature::HideAnswers,
        PremiumFeature::Analytics,
    ];
}

/// Every premium feature is unlocked by any active plan
pub fn has_feature(is_premium: bool, _feature: PremiumFeature) -> bool {
    is_premium
}

pub fn show_ads(is_premium: bool) -> bool {
    !has_feature(is_premium, PremiumFeature::AdFree)
}

#[derive(Debug, Error, PartialEq)]
pub enum ImageError {
    #[error("Image attachments require a premium plan")]
    PremiumRequired,

    #[error("At most {MAX_IMAGES} images can be attached ({0} given)")]
    TooMany(usize),

    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),
}

/// Image URLs must be absolute http(s) and attached by premium users only
pub fn validate_image_urls(is_premium: bool, urls: &[String]) -> Result<(), ImageError> {
    if urls.is_empty() {
        return Ok(());
    }
    if !is_premium {
        return Err(ImageError::PremiumRequired);
    }
    if urls.len() > MAX_IMAGES {
        return Err(ImageError::TooMany(urls.len()));
    }
    for raw in urls {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {}
            _ => return Err(ImageError::InvalidUrl(raw.clone())),
        }
    }
    Ok(())
}

/// What a user is currently entitled to
#[derive(Debug, Clone, Serialize)]
pub struct Entitlement {
    pub is_premium: bool,
    pub plan: Option<PremiumPlan>,
    pub subscription: Option<Subscription>,
    pub question_limit: usize,
    pub answer_limit: usize,
    pub features: Vec<PremiumFeature>,
    pub show_ads: bool,
    pub max_images: usize,
}

impl Entitlement {
    pub fn new(subscription: Option<Subscription>, plan: Option<PremiumPlan>) -> Self {
        let is_premium = subscription.is_some();
        let features = PremiumFeature::ALL
            .into_iter()
            .filter(|f| has_feature(is_premium, *f))
            .collect();

        Self {
            is_premium,
            plan,
            subscription,
            question_limit: character_limit(is_premium, ContentKind::Question),
            answer_limit: character_limit(is_premium, ContentKind::Answer),
            features,
            show_ads: show_ads(is_premium),
            max_images: if is_premium { MAX_IMAGES } else { 0 },
        }
    }

}

pub async fn is_premium(pool: &PgPool, user_id: Uuid) -> Result<bool, DatabaseError> {
    Ok(subscriptions::find_active(pool, user_id, Utc::now()).await?.is_some())
}

/// Load the active subscription and its plan
pub async fn load(pool: &PgPool, user_id: Uuid) -> Result<Entitlement, DatabaseError> {
    let subscription = subscriptions::find_active(pool, user_id, Utc::now()).await?;
    let plan = match &subscription {
        Some(sub) => subscriptions::find_plan(pool, &sub.plan_id).await?,
        None => None,
    };
    Ok(Entitlement::new(subscription, plan))
}
