//! HTTP client adapter for the external payment gateway.
//!
//! Talks to the gateway's REST API for checkout-session creation and the
//! synchronous status query. Inbound webhooks do not pass through here;
//! they are verified by the webhook verifier at the HTTP boundary.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::AccountId;
use crate::ports::{GatewayCheckout, GatewayError, GatewaySessionStatus, PaymentGateway};

/// Request timeout for gateway calls.
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP implementation of the PaymentGateway port.
pub struct HttpPaymentGateway {
    base_url: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl HttpPaymentGateway {
    /// Creates a gateway client against the given base URL.
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    client_reference_id: String,
    amount: i64,
    currency: &'a str,
    success_url: String,
    cancel_url: String,
}

#[derive(Debug, Deserialize)]
struct CreateSessionResponse {
    session_id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct SessionStatusResponse {
    status: String,
    #[serde(default)]
    payment_status: Option<String>,
}

fn map_request_error(e: reqwest::Error) -> GatewayError {
    GatewayError::Unavailable(e.to_string())
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_checkout(
        &self,
        account_id: &AccountId,
        amount_minor: i64,
        currency: &str,
        origin_url: &str,
    ) -> Result<GatewayCheckout, GatewayError> {
        let origin = origin_url.trim_end_matches('/');
        let request = CreateSessionRequest {
            client_reference_id: account_id.to_string(),
            amount: amount_minor,
            currency,
            success_url: format!("{}/payment/success?session_id={{CHECKOUT_SESSION_ID}}", origin),
            cancel_url: format!("{}/payment/cancel", origin),
        };

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(map_request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status.is_client_error() {
                return Err(GatewayError::Rejected(format!("{}: {}", status, body)));
            }
            return Err(GatewayError::Unavailable(format!("{}: {}", status, body)));
        }

        let created: CreateSessionResponse =
            response.json().await.map_err(map_request_error)?;

        Ok(GatewayCheckout {
            session_id: created.session_id,
            url: created.url,
            amount_minor,
            currency: currency.to_string(),
        })
    }

    async fn query_status(&self, session_id: &str) -> Result<GatewaySessionStatus, GatewayError> {
        let response = self
            .client
            .get(format!(
                "{}/v1/checkout/sessions/{}",
                self.base_url, session_id
            ))
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
            .map_err(map_request_error)?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(GatewayError::UnknownSession(session_id.to_string()))
            }
            status if status.is_client_error() => {
                let body = response.text().await.unwrap_or_default();
                return Err(GatewayError::Rejected(format!("{}: {}", status, body)));
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(GatewayError::Unavailable(format!("{}: {}", status, body)));
            }
            _ => {}
        }

        let status: SessionStatusResponse = response.json().await.map_err(map_request_error)?;

        // A completed session still reports its own payment state; only a
        // gateway-confirmed payment counts as paid.
        let effective = status
            .payment_status
            .as_deref()
            .unwrap_or(status.status.as_str());

        match effective {
            "paid" | "complete" | "completed" => Ok(GatewaySessionStatus::Paid),
            "expired" => Ok(GatewaySessionStatus::Expired),
            "pending" | "open" | "unpaid" => Ok(GatewaySessionStatus::Pending),
            other => Err(GatewayError::Rejected(format!(
                "unrecognized session status: {}",
                other
            ))),
        }
    }
}
