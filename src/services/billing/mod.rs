// Premium subscriptions through Stripe Checkout and webhooks
pub mod checkout;
pub mod webhook;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::DatabaseError;

pub use checkout::{CheckoutRequest, CheckoutSession, StripeClient};
pub use webhook::{handle_event, verify_signature, StripeEvent, WebhookOutcome};

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Plan not found: {0}")]
    PlanNotFound(String),

    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Billing not configured: {0} missing")]
    NotConfigured(&'static str),

    #[error("Stripe returned {status}: {message}")]
    Stripe { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

impl BillingCycle {
    /// Anything other than `yearly` bills monthly
    pub fn parse(value: &str) -> Self {
        if value == "yearly" {
            BillingCycle::Yearly
        } else {
            BillingCycle::Monthly
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        }
    }

    /// Stripe recurring interval
    pub fn interval(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "month",
            BillingCycle::Yearly => "year",
        }
    }

    pub fn period_days(&self) -> i64 {
        match self {
            BillingCycle::Monthly => 30,
            BillingCycle::Yearly => 365,
        }
    }
}
