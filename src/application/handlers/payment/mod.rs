//! Payment flow handlers.
//!
//! Every payment-affecting event (gateway checkout, status poll, webhook,
//! manual evidence, administrative override) routes through the
//! reconciler; no handler writes payment state on its own.

mod admin_override;
mod check_status;
mod create_session;
mod error;
mod handle_webhook;
mod reject_evidence;
mod submit_evidence;

pub use admin_override::{AdminOverrideCommand, AdminOverrideHandler, AdminOverrideOutcome};
pub use check_status::{
    CheckGatewayStatusCommand, CheckGatewayStatusHandler, CheckGatewayStatusOutcome,
};
pub use create_session::{
    CreateGatewaySessionCommand, CreateGatewaySessionHandler, CreateGatewaySessionOutcome,
};
pub use error::PaymentFlowError;
pub use handle_webhook::{HandleGatewayWebhookHandler, WebhookOutcome};
pub use reject_evidence::{RejectEvidenceCommand, RejectEvidenceHandler};
pub use submit_evidence::{SubmitEvidenceCommand, SubmitEvidenceHandler};
