//! HandleGatewayWebhookHandler - Verified, idempotent webhook processing.
//!
//! The signature is verified before the payload is trusted; a rejected
//! webhook is audited with its reason. Completed-session events run the
//! same idempotent paid transition as the status poll, so the two can race
//! freely.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::payment::{
    GatewayEventKind, GatewayWebhookVerifier, PaymentReconciler, ReconcileOutcome, WebhookError,
};
use crate::ports::{AuditSink, SecurityEvent};

/// Result of processing a webhook delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A paid event was applied; `credited` is false on duplicate delivery.
    Processed { credited: bool },
    /// The event kind carries no action for this core.
    Ignored,
}

/// Handler for inbound gateway webhooks.
pub struct HandleGatewayWebhookHandler {
    verifier: GatewayWebhookVerifier,
    reconciler: Arc<PaymentReconciler>,
    audit: Arc<dyn AuditSink>,
}

impl HandleGatewayWebhookHandler {
    pub fn new(
        verifier: GatewayWebhookVerifier,
        reconciler: Arc<PaymentReconciler>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            verifier,
            reconciler,
            audit,
        }
    }

    pub async fn handle(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookOutcome, WebhookError> {
        let now = Timestamp::now();

        let event = match self.verifier.verify_and_parse(payload, signature_header) {
            Ok(event) => event,
            Err(e) => {
                self.audit
                    .record(
                        SecurityEvent::WebhookRejected {
                            reason: e.to_string(),
                        },
                        now,
                    )
                    .await;
                return Err(e);
            }
        };

        match event.kind() {
            GatewayEventKind::SessionCompleted => {
                let outcome = self
                    .reconciler
                    .confirm_gateway(event.session_id(), now)
                    .await?;
                Ok(WebhookOutcome::Processed {
                    credited: matches!(outcome, ReconcileOutcome::Applied { .. }),
                })
            }
            GatewayEventKind::SessionExpired | GatewayEventKind::Other => {
                Ok(WebhookOutcome::Ignored)
            }
        }
    }
}
