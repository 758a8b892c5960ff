//! Mock payment gateway for testing and development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::AccountId;
use crate::ports::{GatewayCheckout, GatewayError, GatewaySessionStatus, PaymentGateway};

/// In-memory gateway double.
///
/// Sessions start `Pending`; tests drive them to `Paid` or `Expired` with
/// the helper methods, standing in for the real gateway's checkout page.
#[derive(Default)]
pub struct MockPaymentGateway {
    sessions: RwLock<HashMap<String, GatewaySessionStatus>>,
}

impl MockPaymentGateway {
    /// Creates a gateway with no sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the customer completing payment for a session.
    pub async fn complete_session(&self, session_id: &str) {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), GatewaySessionStatus::Paid);
    }

    /// Simulates a session expiring unpaid.
    pub async fn expire_session(&self, session_id: &str) {
        self.sessions
            .write()
            .await
            .insert(session_id.to_string(), GatewaySessionStatus::Expired);
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout(
        &self,
        _account_id: &AccountId,
        amount_minor: i64,
        currency: &str,
        origin_url: &str,
    ) -> Result<GatewayCheckout, GatewayError> {
        let session_id = format!("gw_sess_{}", Uuid::new_v4().simple());
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), GatewaySessionStatus::Pending);

        Ok(GatewayCheckout {
            url: format!("{}/checkout/{}", origin_url.trim_end_matches('/'), session_id),
            session_id,
            amount_minor,
            currency: currency.to_string(),
        })
    }

    async fn query_status(&self, session_id: &str) -> Result<GatewaySessionStatus, GatewayError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .copied()
            .ok_or_else(|| GatewayError::UnknownSession(session_id.to_string()))
    }
}
