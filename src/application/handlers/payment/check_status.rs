//! CheckGatewayStatusHandler - Status poll that queries the gateway
//! directly.
//!
//! The poll applies the same idempotent paid transition as the webhook
//! callback; whichever arrives second is a silent no-op.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::payment::{PaymentReconciler, ReconcileOutcome};
use crate::ports::{GatewaySessionStatus, PaymentGateway};

use super::error::PaymentFlowError;

/// Command to poll a checkout session's status.
#[derive(Debug, Clone)]
pub struct CheckGatewayStatusCommand {
    pub gateway_session_id: String,
}

/// Result of a status poll.
#[derive(Debug, Clone)]
pub struct CheckGatewayStatusOutcome {
    /// The gateway's own view of the session.
    pub gateway_status: GatewaySessionStatus,
    /// Set when the poll observed a paid session and ran reconciliation.
    pub reconciled: Option<ReconcileOutcome>,
}

/// Handler for the synchronous status poll.
pub struct CheckGatewayStatusHandler {
    gateway: Arc<dyn PaymentGateway>,
    reconciler: Arc<PaymentReconciler>,
}

impl CheckGatewayStatusHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>, reconciler: Arc<PaymentReconciler>) -> Self {
        Self {
            gateway,
            reconciler,
        }
    }

    pub async fn handle(
        &self,
        cmd: CheckGatewayStatusCommand,
    ) -> Result<CheckGatewayStatusOutcome, PaymentFlowError> {
        let gateway_status = self.gateway.query_status(&cmd.gateway_session_id).await?;

        let reconciled = match gateway_status {
            GatewaySessionStatus::Paid => Some(
                self.reconciler
                    .confirm_gateway(&cmd.gateway_session_id, Timestamp::now())
                    .await?,
            ),
            GatewaySessionStatus::Pending | GatewaySessionStatus::Expired => None,
        };

        Ok(CheckGatewayStatusOutcome {
            gateway_status,
            reconciled,
        })
    }
}
