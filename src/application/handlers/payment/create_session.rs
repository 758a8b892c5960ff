//! CreateGatewaySessionHandler - Starts a gateway checkout for the
//! membership fee.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, Timestamp};
use crate::domain::payment::{PaymentReconciler, PaymentTransaction};
use crate::ports::{GatewayCheckout, PaymentGateway};

use super::error::PaymentFlowError;

/// Command to start a gateway checkout.
#[derive(Debug, Clone)]
pub struct CreateGatewaySessionCommand {
    pub account_id: AccountId,
    /// Origin the gateway redirects back to after checkout.
    pub origin_url: String,
}

/// Result of starting a checkout.
#[derive(Debug, Clone)]
pub struct CreateGatewaySessionOutcome {
    pub checkout: GatewayCheckout,
    pub transaction: PaymentTransaction,
}

/// Handler for gateway checkout creation.
///
/// The reconciler remains the authority on entry rules: if it rejects the
/// attempt after the gateway session was created, the orphaned session
/// simply expires unpaid at the gateway.
pub struct CreateGatewaySessionHandler {
    gateway: Arc<dyn PaymentGateway>,
    reconciler: Arc<PaymentReconciler>,
    fee_minor: i64,
    currency: String,
}

impl CreateGatewaySessionHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        reconciler: Arc<PaymentReconciler>,
        fee_minor: i64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            reconciler,
            fee_minor,
            currency: currency.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateGatewaySessionCommand,
    ) -> Result<CreateGatewaySessionOutcome, PaymentFlowError> {
        let now = Timestamp::now();

        let checkout = self
            .gateway
            .create_checkout(&cmd.account_id, self.fee_minor, &self.currency, &cmd.origin_url)
            .await?;

        let transaction = self
            .reconciler
            .begin_gateway(
                &cmd.account_id,
                &checkout.session_id,
                self.fee_minor,
                &self.currency,
                now,
            )
            .await?;

        Ok(CreateGatewaySessionOutcome {
            checkout,
            transaction,
        })
    }
}
