//! Durable payment transaction store port.
//!
//! Settlement goes through compare-and-set operations so that concurrent
//! webhook and poll deliveries for the same transaction apply at most once.

use async_trait::async_trait;

use crate::domain::foundation::{AccountId, StoreError, Timestamp, TransactionId};
use crate::domain::payment::PaymentTransaction;

/// Outcome of a compare-and-set settlement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// The transition applied; this caller won the race.
    Applied,
    /// The transaction was not in the expected state; nothing changed.
    Unchanged,
}

impl CasOutcome {
    /// Returns true when this caller performed the transition.
    pub fn applied(&self) -> bool {
        matches!(self, CasOutcome::Applied)
    }
}

/// Port for durable transaction persistence.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Inserts a new transaction.
    async fn insert(&self, transaction: &PaymentTransaction) -> Result<(), StoreError>;

    /// Point lookup by transaction id.
    async fn find_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<Option<PaymentTransaction>, StoreError>;

    /// Lookup by the gateway-assigned checkout session id.
    async fn find_by_gateway_session(
        &self,
        session_id: &str,
    ) -> Result<Option<PaymentTransaction>, StoreError>;

    /// The account's pending transaction, if one exists.
    async fn find_pending_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<PaymentTransaction>, StoreError>;

    /// All transactions recorded for the account, oldest first.
    async fn list_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<PaymentTransaction>, StoreError>;

    /// Atomically transitions `Pending -> Paid`.
    ///
    /// Equivalent to a compare-and-set on the status column: exactly one of
    /// any number of concurrent callers observes `Applied`.
    async fn mark_paid_if_pending(
        &self,
        id: &TransactionId,
        at: Timestamp,
    ) -> Result<CasOutcome, StoreError>;

    /// Atomically transitions `Pending -> Rejected`.
    async fn mark_rejected_if_pending(
        &self,
        id: &TransactionId,
        at: Timestamp,
    ) -> Result<CasOutcome, StoreError>;

    /// Transitions every pending transaction of the account to `Paid`.
    ///
    /// Returns the number of transactions transitioned.
    async fn mark_all_pending_paid(
        &self,
        account_id: &AccountId,
        at: Timestamp,
    ) -> Result<u64, StoreError>;
}
