//! In-memory account store for testing and single-server development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::account::Account;
use crate::domain::foundation::{AccountId, StoreError, Timestamp};
use crate::domain::payment::PaymentStatus;
use crate::ports::AccountStore;

/// HashMap-backed account store.
///
/// Enforces contact uniqueness the way the production store's unique index
/// does, so handler behavior matches across adapters.
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn insert(&self, account: &Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.contact == account.contact) {
            return Err(StoreError::constraint("accounts_contact_key"));
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn find_by_contact(&self, contact: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.contact == contact)
            .cloned())
    }

    async fn update_payment_state(
        &self,
        id: &AccountId,
        paid: bool,
        status: PaymentStatus,
        _at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(id)
            .ok_or_else(|| StoreError::constraint("account missing"))?;
        account.payment_paid = paid;
        account.payment_status = status;
        Ok(())
    }

    async fn update_login_tracking(
        &self,
        id: &AccountId,
        failed_count: u32,
        locked_until: Option<Timestamp>,
        last_login: Option<Timestamp>,
    ) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(id)
            .ok_or_else(|| StoreError::constraint("account missing"))?;
        account.failed_login_count = failed_count;
        account.locked_until = locked_until;
        account.last_login = last_login;
        Ok(())
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, StoreError> {
        Ok(self.accounts.write().await.remove(id).is_some())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.accounts.read().await.len() as u64)
    }
}
