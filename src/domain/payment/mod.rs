//! Payment domain - membership fee reconciliation across three channels.
//!
//! The gateway callback, the manual evidence form, and the administrative
//! override all feed one state machine (`PaymentReconciler`), the single
//! writer of per-account payment state.

mod errors;
mod gateway_event;
mod reconciler;
mod status;
mod transaction;
mod webhook_errors;
mod webhook_verifier;

pub use errors::PaymentError;
pub use gateway_event::{GatewayEvent, GatewayEventData, GatewayEventKind};
pub use reconciler::{PaymentReconciler, ReconcileOutcome};
pub use status::{PaymentChannel, PaymentStatus, TransactionStatus};
pub use transaction::{
    EvidencePolicy, EvidenceRef, PaymentTransaction, DEFAULT_ALLOWED_EVIDENCE_TYPES,
    DEFAULT_MAX_EVIDENCE_BYTES,
};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{GatewayWebhookVerifier, SignatureHeader};

#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
