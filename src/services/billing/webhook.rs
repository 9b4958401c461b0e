use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{BillingCycle, BillingError};
use crate::database::models::{PaymentRecord, SubscriptionStatus};
use crate::database::subscriptions::{self, NewSubscription};
use crate::services::referral;

type HmacSha256 = Hmac<Sha256>;

/// Check a `Stripe-Signature` header (`t=...,v1=...`) against the raw body
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> Result<(), BillingError> {
    if secret.is_empty() {
        return Err(BillingError::NotConfigured("STRIPE_WEBHOOK_SECRET"));
    }

    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", v)) => timestamp = v.parse::<i64>().ok(),
            Some(("v1", v)) => signatures.push(v),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| BillingError::InvalidSignature("missing timestamp".into()))?;
    if signatures.is_empty() {
        return Err(BillingError::InvalidSignature("no v1 signature".into()));
    }
    if (now - timestamp).abs() > tolerance_secs {
        return Err(BillingError::InvalidSignature("timestamp outside tolerance".into()));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BillingError::InvalidSignature(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|sig| match hex::decode(sig) {
        Ok(bytes) => mac.clone().verify_slice(&bytes).is_ok(),
        Err(_) => false,
    });

    if matched {
        Ok(())
    } else {
        Err(BillingError::InvalidSignature("no matching signature".into()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WebhookOutcome {
    SubscriptionCreated { user_id: Uuid, plan_id: String },
    SubscriptionUpdated { status: SubscriptionStatus, rows: u64 },
    AlreadyProcessed { user_id: Uuid },
    Ignored { event_type: String },
}

/// A completed subscription checkout, pulled from the session object
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedCheckout {
    pub user_id: Uuid,
    pub plan_id: String,
    pub cycle: BillingCycle,
    pub stripe_subscription_id: Option<String>,
    pub amount_total: i64,
    pub currency: String,
    pub payment_intent: Option<String>,
}

impl CompletedCheckout {
    /// `Ok(None)` for sessions that are not subscriptions
    pub fn from_session(session: &Value) -> Result<Option<Self>, BillingError> {
        if session["mode"].as_str() != Some("subscription") {
            return Ok(None);
        }

        let metadata = &session["metadata"];
        let user_id = metadata["userId"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| BillingError::InvalidPayload("metadata.userId missing or invalid".into()))?;
        let plan_id = metadata["planId"]
            .as_str()
            .ok_or_else(|| BillingError::InvalidPayload("metadata.planId missing".into()))?
            .to_string();
        let cycle = BillingCycle::parse(metadata["billingCycle"].as_str().unwrap_or_default());

        Ok(Some(Self {
            user_id,
            plan_id,
            cycle,
            stripe_subscription_id: session["subscription"].as_str().map(str::to_string),
            amount_total: session["amount_total"].as_i64().unwrap_or(0),
            currency: session["currency"]
                .as_str()
                .map(str::to_uppercase)
                .unwrap_or_else(|| "JPY".to_string()),
            payment_intent: session["payment_intent"].as_str().map(str::to_string),
        }))
    }

    pub fn subscription(&self, now: DateTime<Utc>) -> NewSubscription {
        NewSubscription {
            user_id: self.user_id,
            plan_id: self.plan_id.clone(),
            current_period_start: now,
            current_period_end: now + Duration::days(self.cycle.period_days()),
            stripe_subscription_id: self.stripe_subscription_id.clone(),
        }
    }

    pub fn payment(&self) -> PaymentRecord {
        PaymentRecord {
            user_id: self.user_id,
            amount: self.amount_total,
            currency: self.currency.clone(),
            payment_method: "stripe".to_string(),
            status: "completed".to_string(),
            stripe_payment_intent_id: self.payment_intent.clone(),
        }
    }
}

fn subscription_id(object: &Value) -> Result<&str, BillingError> {
    object["id"]
        .as_str()
        .ok_or_else(|| BillingError::InvalidPayload("subscription id missing".into()))
}

/// Apply a verified Stripe event to the subscription tables
pub async fn handle_event(pool: &PgPool, event: &StripeEvent) -> Result<WebhookOutcome, BillingError> {
    let object = &event.data.object;

    match event.event_type.as_str() {
        "checkout.session.completed" => {
            let Some(checkout) = CompletedCheckout::from_session(object)? else {
                return Ok(WebhookOutcome::Ignored {
                    event_type: event.event_type.clone(),
                });
            };

            let activated =
                subscriptions::activate(pool, &checkout.subscription(Utc::now()), &checkout.payment()).await?;
            if activated.is_none() {
                info!(
                    "Subscription {:?} for {} already recorded, skipping event {}",
                    checkout.stripe_subscription_id, checkout.user_id, event.id
                );
                return Ok(WebhookOutcome::AlreadyProcessed {
                    user_id: checkout.user_id,
                });
            }
            info!(
                "Activated {} subscription ({}) for {}",
                checkout.plan_id,
                checkout.cycle.as_str(),
                checkout.user_id
            );

            if let Err(e) = referral::grant_premium_reward(pool, checkout.user_id).await {
                error!("Failed to grant referral reward for {}: {}", checkout.user_id, e);
            }

            Ok(WebhookOutcome::SubscriptionCreated {
                user_id: checkout.user_id,
                plan_id: checkout.plan_id,
            })
        }
        "customer.subscription.updated" => {
            let status = SubscriptionStatus::from_stripe(object["status"].as_str().unwrap_or_default());
            let rows = subscriptions::update_status_by_stripe_id(pool, subscription_id(object)?, status).await?;
            Ok(WebhookOutcome::SubscriptionUpdated { status, rows })
        }
        "customer.subscription.deleted" => {
            let status = SubscriptionStatus::Canceled;
            let rows = subscriptions::update_status_by_stripe_id(pool, subscription_id(object)?, status).await?;
            Ok(WebhookOutcome::SubscriptionUpdated { status, rows })
        }
        other => {
            warn!("Unhandled Stripe event type: {} ({})", other, event.id);
            Ok(WebhookOutcome::Ignored {
                event_type: other.to_string(),
            })
        }
    }
}
