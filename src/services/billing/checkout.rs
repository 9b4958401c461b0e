use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

use super::{BillingCycle, BillingError};
use crate::config::StripeConfig;
use crate::database::models::PremiumPlan;

/// Everything needed to open a subscription checkout for one plan
#[derive(Debug, Clone)]
pub struct CheckoutRequest<'a> {
    pub plan: &'a PremiumPlan,
    pub cycle: BillingCycle,
    pub currency: &'a str,
    pub site_url: &'a str,
    pub user_id: Uuid,
    pub customer_email: Option<&'a str>,
}

impl CheckoutRequest<'_> {
    pub fn amount(&self) -> i64 {
        match self.cycle {
            BillingCycle::Yearly => self.plan.price_yearly,
            BillingCycle::Monthly => self.plan.price_monthly,
        }
    }

    /// Form fields for `POST /v1/checkout/sessions`
    pub fn form_params(&self) -> Vec<(String, String)> {
        let item = "line_items[0]";
        let mut params = vec![
            ("mode".to_string(), "subscription".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            (format!("{item}[quantity]"), "1".to_string()),
            (format!("{item}[price_data][currency]"), self.currency.to_string()),
            (format!("{item}[price_data][unit_amount]"), self.amount().to_string()),
            (
                format!("{item}[price_data][recurring][interval]"),
                self.cycle.interval().to_string(),
            ),
            (
                format!("{item}[price_data][product_data][name]"),
                format!("Qlink {} plan", self.plan.name),
            ),
            (
                "success_url".to_string(),
                format!("{}/premium/success?session_id={{CHECKOUT_SESSION_ID}}", self.site_url),
            ),
            ("cancel_url".to_string(), format!("{}/premium", self.site_url)),
            ("metadata[userId]".to_string(), self.user_id.to_string()),
            ("metadata[planId]".to_string(), self.plan.id.clone()),
            ("metadata[billingCycle]".to_string(), self.cycle.as_str().to_string()),
        ];

        // Stripe rejects empty descriptions
        if !self.plan.features.is_empty() {
            params.push((
                format!("{item}[price_data][product_data][description]"),
                self.plan.features.join(", "),
            ));
        }
        if let Some(email) = self.customer_email {
            params.push(("customer_email".to_string(), email.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    #[serde(rename(serialize = "session_id", deserialize = "id"))]
    pub id: String,
    pub url: Option<String>,
}

pub struct StripeClient {
    client: Client,
    api_base: String,
    secret_key: String,
}

impl StripeClient {
    pub fn new(api_base: impl Into<String>, secret_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_base: api_base.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn from_config(config: &StripeConfig) -> Self {
        Self::new(config.api_base.clone(), config.secret_key.clone())
    }

    pub fn is_configured(&self) -> bool {
        !self.secret_key.is_empty()
    }

    pub async fn create_checkout_session(&self, request: &CheckoutRequest<'_>) -> Result<CheckoutSession, BillingError> {
        if !self.is_configured() {
            return Err(BillingError::NotConfigured("STRIPE_SECRET_KEY"));
        }

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&request.form_params())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(BillingError::Stripe {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<CheckoutSession>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> PremiumPlan {
        PremiumPlan {
            id: "premium".into(),
            name: "Premium".into(),
            price_monthly: 480,
            price_yearly: 4800,
            features: vec!["No ads".into(), "Longer questions".into()],
        }
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn yearly_checkout_uses_yearly_price_and_interval() {
        let plan = plan();
        let user_id = Uuid::new_v4();
        let request = CheckoutRequest {
            plan: &plan,
            cycle: BillingCycle::Yearly,
            currency: "jpy",
            site_url: "https://qlink.example",
            user_id,
            customer_email: Some("a@example.com"),
        };
        let params = request.form_params();

        assert_eq!(param(&params, "mode"), Some("subscription"));
        assert_eq!(param(&params, "line_items[0][price_data][unit_amount]"), Some("4800"));
        assert_eq!(param(&params, "line_items[0][price_data][recurring][interval]"), Some("year"));
        assert_eq!(
            param(&params, "line_items[0][price_data][product_data][name]"),
            Some("Qlink Premium plan")
        );
        assert_eq!(
            param(&params, "line_items[0][price_data][product_data][description]"),
            Some("No ads, Longer questions")
        );
        assert_eq!(
            param(&params, "success_url"),
            Some("https://qlink.example/premium/success?session_id={CHECKOUT_SESSION_ID}")
        );
        assert_eq!(param(&params, "cancel_url"), Some("https://qlink.example/premium"));
        assert_eq!(param(&params, "metadata[userId]"), Some(user_id.to_string().as_str()));
        assert_eq!(param(&params, "metadata[billingCycle]"), Some("yearly"));
        assert_eq!(param(&params, "customer_email"), Some("a@example.com"));
    }

    #[test]
    fn monthly_checkout_without_email() {
        let plan = plan();
        let request = CheckoutRequest {
            plan: &plan,
            cycle: BillingCycle::Monthly,
            currency: "jpy",
            site_url: "http://localhost:3000",
            user_id: Uuid::new_v4(),
            customer_email: None,
        };
        let params = request.form_params();
        assert_eq!(request.amount(), 480);
        assert_eq!(param(&params, "line_items[0][price_data][recurring][interval]"), Some("month"));
        assert_eq!(param(&params, "customer_email"), None);
    }

    #[tokio::test]
    async fn unconfigured_client_refuses() {
        let plan = plan();
        let client = StripeClient::new("http://127.0.0.1:9", "");
        let request = CheckoutRequest {
            plan: &plan,
            cycle: BillingCycle::Monthly,
            currency: "jpy",
            site_url: "http://localhost:3000",
            user_id: Uuid::new_v4(),
            customer_email: None,
        };
        let err = client.create_checkout_session(&request).await.unwrap_err();
        assert!(matches!(err, BillingError::NotConfigured("STRIPE_SECRET_KEY")));
    }
}
