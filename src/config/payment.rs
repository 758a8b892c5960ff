//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (gateway credentials, membership fee)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Signing secret for inbound gateway webhooks
    pub webhook_secret: SecretString,

    /// Gateway REST API base URL; the mock gateway when absent
    #[serde(default)]
    pub gateway_base_url: Option<String>,

    /// Gateway API key, required when a base URL is configured
    #[serde(default)]
    pub gateway_api_key: Option<SecretString>,

    /// Membership fee in minor currency units
    #[serde(default = "default_membership_fee_minor")]
    pub membership_fee_minor: i64,

    /// Membership fee currency
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_membership_fee_minor() -> i64 {
    49900
}

fn default_currency() -> String {
    "INR".to_string()
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            webhook_secret: SecretString::new(String::new()),
            gateway_base_url: None,
            gateway_api_key: None,
            membership_fee_minor: default_membership_fee_minor(),
            currency: default_currency(),
        }
    }
}

impl PaymentConfig {
    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let secret = self.webhook_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT_WEBHOOK_SECRET"));
        }
        if !secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidWebhookSecret);
        }
        if self.gateway_base_url.is_some() && self.gateway_api_key.is_none() {
            return Err(ValidationError::MissingGatewayApiKey);
        }
        if self.membership_fee_minor <= 0 {
            return Err(ValidationError::ZeroThreshold("membership fee"));
        }
        Ok(())
    }
}
