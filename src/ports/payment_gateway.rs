//! External payment gateway port.
//!
//! Covers the two synchronous calls this core makes outward: checkout
//! session creation and a direct status query. Inbound webhook delivery is
//! verified separately by the webhook verifier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::AccountId;

/// A checkout session created at the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCheckout {
    /// Gateway-assigned session identifier.
    pub session_id: String,
    /// Hosted checkout URL the client is redirected to.
    pub url: String,
    /// Amount in minor currency units.
    pub amount_minor: i64,
    pub currency: String,
}

/// The gateway's own view of a checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewaySessionStatus {
    /// Payment not yet completed.
    Pending,
    /// Payment cleared.
    Paid,
    /// Session expired unpaid.
    Expired,
}

/// Errors from gateway interactions.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway could not be reached or answered with a server error.
    #[error("gateway unavailable: {0}")]
    Unavailable(String),

    /// The gateway rejected the request.
    #[error("gateway rejected request: {0}")]
    Rejected(String),

    /// The session id is unknown to the gateway.
    #[error("unknown gateway session: {0}")]
    UnknownSession(String),
}

/// Port for the external payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a checkout session for the account's membership fee.
    async fn create_checkout(
        &self,
        account_id: &AccountId,
        amount_minor: i64,
        currency: &str,
        origin_url: &str,
    ) -> Result<GatewayCheckout, GatewayError>;

    /// Queries the gateway directly for a session's payment status.
    async fn query_status(&self, session_id: &str) -> Result<GatewaySessionStatus, GatewayError>;
}
