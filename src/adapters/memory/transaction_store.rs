//! In-memory transaction store for testing and single-server development.
//!
//! Settlement operations hold the write lock for the whole check-and-set,
//! giving the same at-most-once guarantee the production store gets from a
//! conditional UPDATE.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{AccountId, StoreError, Timestamp, TransactionId};
use crate::domain::payment::{PaymentTransaction, TransactionStatus};
use crate::ports::{CasOutcome, TransactionStore};

/// HashMap-backed transaction store.
#[derive(Default)]
pub struct InMemoryTransactionStore {
    transactions: RwLock<HashMap<TransactionId, PaymentTransaction>>,
}

impl InMemoryTransactionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn settle(
        &self,
        id: &TransactionId,
        target: TransactionStatus,
        at: Timestamp,
    ) -> Result<CasOutcome, StoreError> {
        let mut transactions = self.transactions.write().await;
        match transactions.get_mut(id) {
            Some(txn) if txn.status == TransactionStatus::Pending => {
                txn.status = target;
                txn.updated_at = at;
                Ok(CasOutcome::Applied)
            }
            Some(_) => Ok(CasOutcome::Unchanged),
            None => Ok(CasOutcome::Unchanged),
        }
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn insert(&self, transaction: &PaymentTransaction) -> Result<(), StoreError> {
        let mut transactions = self.transactions.write().await;
        if transactions.contains_key(&transaction.id) {
            return Err(StoreError::constraint("transactions_pkey"));
        }
        transactions.insert(transaction.id, transaction.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<Option<PaymentTransaction>, StoreError> {
        Ok(self.transactions.read().await.get(id).cloned())
    }

    async fn find_by_gateway_session(
        &self,
        session_id: &str,
    ) -> Result<Option<PaymentTransaction>, StoreError> {
        Ok(self
            .transactions
            .read()
            .await
            .values()
            .find(|t| t.gateway_session_id.as_deref() == Some(session_id))
            .cloned())
    }

    async fn find_pending_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<PaymentTransaction>, StoreError> {
        Ok(self
            .transactions
            .read()
            .await
            .values()
            .find(|t| t.account_id == *account_id && t.status == TransactionStatus::Pending)
            .cloned())
    }

    async fn list_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<PaymentTransaction>, StoreError> {
        let mut list: Vec<_> = self
            .transactions
            .read()
            .await
            .values()
            .filter(|t| t.account_id == *account_id)
            .cloned()
            .collect();
        list.sort_by_key(|t| t.created_at);
        Ok(list)
    }

    async fn mark_paid_if_pending(
        &self,
        id: &TransactionId,
        at: Timestamp,
    ) -> Result<CasOutcome, StoreError> {
        self.settle(id, TransactionStatus::Paid, at).await
    }

    async fn mark_rejected_if_pending(
        &self,
        id: &TransactionId,
        at: Timestamp,
    ) -> Result<CasOutcome, StoreError> {
        self.settle(id, TransactionStatus::Rejected, at).await
    }

    async fn mark_all_pending_paid(
        &self,
        account_id: &AccountId,
        at: Timestamp,
    ) -> Result<u64, StoreError> {
        let mut transactions = self.transactions.write().await;
        let mut transitioned = 0;
        for txn in transactions.values_mut() {
            if txn.account_id == *account_id && txn.status == TransactionStatus::Pending {
                txn.status = TransactionStatus::Paid;
                txn.updated_at = at;
                transitioned += 1;
            }
        }
        Ok(transitioned)
    }
}
