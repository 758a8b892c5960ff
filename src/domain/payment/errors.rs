//! Payment reconciliation error types.

use thiserror::Error;

use crate::domain::foundation::StoreError;

/// Failures surfaced by the payment reconciliation state machine.
///
/// All variants except `Store` are expected, recoverable-by-caller
/// conditions; the store variant is infrastructure and passes through
/// unmodified.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The account's membership is already paid.
    #[error("membership already paid")]
    AlreadyPaid,

    /// Another transaction for the account is already pending.
    #[error("a payment for this account is already pending")]
    DuplicatePending,

    /// The referenced account does not exist.
    #[error("account not found")]
    AccountNotFound,

    /// The referenced transaction does not exist.
    #[error("transaction not found")]
    TransactionNotFound,

    /// No transaction matches the gateway session id.
    #[error("unknown gateway session: {0}")]
    UnknownGatewaySession(String),

    /// The evidence artifact's content type is not an accepted image type.
    #[error("unsupported evidence type: {0}")]
    UnsupportedEvidenceType(String),

    /// The evidence artifact exceeds the configured size ceiling.
    #[error("evidence too large: {size_bytes} bytes exceeds limit of {max_bytes}")]
    EvidenceTooLarge { size_bytes: u64, max_bytes: u64 },

    /// The transaction already settled in a conflicting terminal state.
    #[error("transaction already settled as {0}")]
    AlreadySettled(&'static str),

    /// Durable store failure, propagated unmodified.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PaymentError {
    /// Returns true for conditions the caller can recover from.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PaymentError::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_paid_displays_correctly() {
        assert_eq!(
            format!("{}", PaymentError::AlreadyPaid),
            "membership already paid"
        );
    }

    #[test]
    fn duplicate_pending_displays_correctly() {
        assert_eq!(
            format!("{}", PaymentError::DuplicatePending),
            "a payment for this account is already pending"
        );
    }

    #[test]
    fn evidence_too_large_includes_sizes() {
        let err = PaymentError::EvidenceTooLarge {
            size_bytes: 6_000_000,
            max_bytes: 5_242_880,
        };
        let message = format!("{}", err);
        assert!(message.contains("6000000"));
        assert!(message.contains("5242880"));
    }

    #[test]
    fn store_errors_are_not_recoverable() {
        let err = PaymentError::Store(StoreError::unavailable("down"));
        assert!(!err.is_recoverable());
        assert!(PaymentError::AlreadyPaid.is_recoverable());
        assert!(PaymentError::DuplicatePending.is_recoverable());
    }
}
