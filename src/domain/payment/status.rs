//! Payment status state machines.
//!
//! Defines the authoritative account-level payment state and the
//! per-transaction state, with valid transitions for each.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Authoritative membership payment state of an account.
///
/// Administrative rejection of a manual submission clears `Pending` back to
/// `Unpaid` rather than introducing a fourth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No payment attempt has succeeded or is in flight.
    Unpaid,

    /// A payment attempt is awaiting confirmation or review.
    Pending,

    /// The membership fee has been credited. Terminal.
    Paid,
}

impl PaymentStatus {
    /// Returns true once the fee has been credited.
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }

    /// Returns the string representation stored in the durable store.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, target),
            // A channel reports an attempt
            (Unpaid, Pending)
            // Admin override credits directly
                | (Unpaid, Paid)
            // Gateway confirmation or admin approval
                | (Pending, Paid)
            // Manual submission rejected
                | (Pending, Unpaid)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Unpaid => vec![Pending, Paid],
            Pending => vec![Paid, Unpaid],
            Paid => vec![],
        }
    }
}

/// Lifecycle state of one payment transaction.
///
/// Transitions are monotonic: a transaction settles exactly once, as either
/// `Paid` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Created by a channel, awaiting settlement.
    Pending,

    /// Credited. Terminal.
    Paid,

    /// Rejected by an operator. Terminal.
    Rejected,
}

impl TransactionStatus {
    /// Returns the string representation stored in the durable store.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Paid => "paid",
            TransactionStatus::Rejected => "rejected",
        }
    }
}

impl StateMachine for TransactionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TransactionStatus::*;
        matches!((self, target), (Pending, Paid) | (Pending, Rejected))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TransactionStatus::*;
        match self {
            Pending => vec![Paid, Rejected],
            Paid | Rejected => vec![],
        }
    }
}

/// The input channel a payment event arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentChannel {
    /// External payment gateway checkout.
    Gateway,

    /// Manually submitted evidence artifact awaiting review.
    ManualEvidence,

    /// Administrative override by an operator.
    AdminOverride,
}

impl PaymentChannel {
    /// Returns the string representation stored in the durable store.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentChannel::Gateway => "gateway",
            PaymentChannel::ManualEvidence => "manual_evidence",
            PaymentChannel::AdminOverride => "admin_override",
        }
    }
}

impl std::fmt::Display for PaymentChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Account-level transitions

    #[test]
    fn unpaid_can_move_to_pending() {
        assert_eq!(
            PaymentStatus::Unpaid.transition_to(PaymentStatus::Pending),
            Ok(PaymentStatus::Pending)
        );
    }

    #[test]
    fn unpaid_can_move_directly_to_paid() {
        assert_eq!(
            PaymentStatus::Unpaid.transition_to(PaymentStatus::Paid),
            Ok(PaymentStatus::Paid)
        );
    }

    #[test]
    fn pending_can_settle_paid() {
        assert_eq!(
            PaymentStatus::Pending.transition_to(PaymentStatus::Paid),
            Ok(PaymentStatus::Paid)
        );
    }

    #[test]
    fn pending_can_clear_back_to_unpaid() {
        assert_eq!(
            PaymentStatus::Pending.transition_to(PaymentStatus::Unpaid),
            Ok(PaymentStatus::Unpaid)
        );
    }

    #[test]
    fn paid_is_terminal() {
        assert!(PaymentStatus::Paid.is_terminal());
        assert!(PaymentStatus::Paid
            .transition_to(PaymentStatus::Pending)
            .is_err());
        assert!(PaymentStatus::Paid
            .transition_to(PaymentStatus::Unpaid)
            .is_err());
    }

    #[test]
    fn is_paid_only_for_paid() {
        assert!(PaymentStatus::Paid.is_paid());
        assert!(!PaymentStatus::Pending.is_paid());
        assert!(!PaymentStatus::Unpaid.is_paid());
    }

    // Transaction-level transitions

    #[test]
    fn pending_transaction_can_settle_either_way() {
        assert!(TransactionStatus::Pending.can_transition_to(&TransactionStatus::Paid));
        assert!(TransactionStatus::Pending.can_transition_to(&TransactionStatus::Rejected));
    }

    #[test]
    fn settled_transactions_are_terminal() {
        assert!(TransactionStatus::Paid.is_terminal());
        assert!(TransactionStatus::Rejected.is_terminal());
    }

    #[test]
    fn paid_transaction_cannot_be_rejected() {
        assert!(TransactionStatus::Paid
            .transition_to(TransactionStatus::Rejected)
            .is_err());
    }

    #[test]
    fn valid_transitions_are_consistent_with_can_transition_to() {
        for status in [
            PaymentStatus::Unpaid,
            PaymentStatus::Pending,
            PaymentStatus::Paid,
        ] {
            for target in status.valid_transitions() {
                assert!(status.can_transition_to(&target));
            }
        }
    }

    // Serialization

    #[test]
    fn statuses_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Unpaid).unwrap(),
            "\"unpaid\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Rejected).unwrap(),
            "\"rejected\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentChannel::ManualEvidence).unwrap(),
            "\"manual_evidence\""
        );
    }

    #[test]
    fn channel_as_str_matches_display() {
        for channel in [
            PaymentChannel::Gateway,
            PaymentChannel::ManualEvidence,
            PaymentChannel::AdminOverride,
        ] {
            assert_eq!(channel.as_str(), channel.to_string());
        }
    }
}
