//! Error type shared by the payment flow handlers.

use thiserror::Error;

use crate::domain::payment::PaymentError;
use crate::ports::GatewayError;

/// Failures surfaced by the payment flow handlers.
#[derive(Debug, Error)]
pub enum PaymentFlowError {
    /// Reconciliation rejected or failed the operation.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// The external gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The acting account lacks the admin role.
    #[error("forbidden")]
    Forbidden,
}
