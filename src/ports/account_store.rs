//! Durable account store port.
//!
//! The store is the source of truth for account fields. It must provide
//! at least read-your-writes consistency for a single account's fields.

use async_trait::async_trait;

use crate::domain::account::Account;
use crate::domain::foundation::{AccountId, StoreError, Timestamp};
use crate::domain::payment::PaymentStatus;

/// Port for durable account persistence.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts a freshly registered account.
    ///
    /// Fails with `StoreError::Constraint` when the contact is taken.
    async fn insert(&self, account: &Account) -> Result<(), StoreError>;

    /// Point lookup by account id.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, StoreError>;

    /// Lookup by the unique contact identifier.
    async fn find_by_contact(&self, contact: &str) -> Result<Option<Account>, StoreError>;

    /// Field-level update of the payment state.
    ///
    /// Only the payment reconciler calls this.
    async fn update_payment_state(
        &self,
        id: &AccountId,
        paid: bool,
        status: PaymentStatus,
        at: Timestamp,
    ) -> Result<(), StoreError>;

    /// Field-level update of the login-tracking mirror.
    async fn update_login_tracking(
        &self,
        id: &AccountId,
        failed_count: u32,
        locked_until: Option<Timestamp>,
        last_login: Option<Timestamp>,
    ) -> Result<(), StoreError>;

    /// Removes the account unconditionally.
    ///
    /// Returns true when an account was deleted. Transactions are left in
    /// place as immutable history.
    async fn delete(&self, id: &AccountId) -> Result<bool, StoreError>;

    /// Total number of accounts.
    async fn count(&self) -> Result<u64, StoreError>;
}
