//! Payment reconciliation state machine.
//!
//! The single entry point every payment-affecting event goes through. The
//! gateway callback, the manual evidence form, and the administrative
//! override all converge here instead of mutating the account document
//! directly, so the account's payment fields have exactly one writer.
//!
//! ## Race Condition Handling
//!
//! The gateway confirmation can arrive twice (asynchronous callback racing
//! a status poll). Settlement therefore goes through a compare-and-set on
//! the transaction status: exactly one caller observes `Applied` and flips
//! the account fields; the loser sees an idempotent no-op, not an error.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::foundation::{AccountId, Timestamp, TransactionId};
use crate::ports::{AccountStore, CasOutcome, TransactionStore};

use super::errors::PaymentError;
use super::status::PaymentStatus;
use super::transaction::{EvidencePolicy, EvidenceRef, PaymentTransaction};

/// Outcome of a gateway confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// This call performed the transition and credited the account.
    Applied { transaction_id: TransactionId },
    /// The transaction had already settled paid; nothing changed.
    AlreadyApplied,
}

impl ReconcileOutcome {
    /// Returns true when this call performed the transition.
    pub fn applied(&self) -> bool {
        matches!(self, ReconcileOutcome::Applied { .. })
    }
}

/// Single writer of per-account payment state.
pub struct PaymentReconciler {
    accounts: Arc<dyn AccountStore>,
    transactions: Arc<dyn TransactionStore>,
    evidence_policy: EvidencePolicy,
    account_locks: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

impl PaymentReconciler {
    /// Creates a reconciler over the given stores.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        transactions: Arc<dyn TransactionStore>,
        evidence_policy: EvidencePolicy,
    ) -> Self {
        Self {
            accounts,
            transactions,
            evidence_policy,
            account_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Opens a pending gateway transaction at checkout-session creation.
    ///
    /// Fails `AlreadyPaid` for a paid account and `DuplicatePending` while
    /// any other transaction for the account is pending.
    pub async fn begin_gateway(
        &self,
        account_id: &AccountId,
        gateway_session_id: &str,
        amount_minor: i64,
        currency: &str,
        now: Timestamp,
    ) -> Result<PaymentTransaction, PaymentError> {
        let lock = self.lock_for(account_id).await;
        let _guard = lock.lock().await;

        self.ensure_can_enter(account_id).await?;

        let transaction = PaymentTransaction::pending_gateway(
            *account_id,
            gateway_session_id,
            amount_minor,
            currency,
            now,
        );
        self.transactions.insert(&transaction).await?;
        self.accounts
            .update_payment_state(account_id, false, PaymentStatus::Pending, now)
            .await?;

        Ok(transaction)
    }

    /// Opens a pending manual-evidence transaction.
    ///
    /// The artifact's type and size are validated before anything is
    /// written.
    pub async fn submit_evidence(
        &self,
        account_id: &AccountId,
        evidence: EvidenceRef,
        amount_minor: i64,
        currency: &str,
        now: Timestamp,
    ) -> Result<PaymentTransaction, PaymentError> {
        self.evidence_policy.validate(&evidence)?;

        let lock = self.lock_for(account_id).await;
        let _guard = lock.lock().await;

        self.ensure_can_enter(account_id).await?;

        let transaction =
            PaymentTransaction::pending_manual(*account_id, evidence, amount_minor, currency, now);
        self.transactions.insert(&transaction).await?;
        self.accounts
            .update_payment_state(account_id, false, PaymentStatus::Pending, now)
            .await?;

        Ok(transaction)
    }

    /// Marks a gateway transaction paid, idempotently.
    ///
    /// Both the webhook callback and the status poll land here; double
    /// delivery settles once and the account flips once.
    pub async fn confirm_gateway(
        &self,
        gateway_session_id: &str,
        now: Timestamp,
    ) -> Result<ReconcileOutcome, PaymentError> {
        let transaction = self
            .transactions
            .find_by_gateway_session(gateway_session_id)
            .await?
            .ok_or_else(|| {
                PaymentError::UnknownGatewaySession(gateway_session_id.to_string())
            })?;

        let lock = self.lock_for(&transaction.account_id).await;
        let _guard = lock.lock().await;

        match self
            .transactions
            .mark_paid_if_pending(&transaction.id, now)
            .await?
        {
            CasOutcome::Applied => {
                self.accounts
                    .update_payment_state(&transaction.account_id, true, PaymentStatus::Paid, now)
                    .await?;
                Ok(ReconcileOutcome::Applied {
                    transaction_id: transaction.id,
                })
            }
            CasOutcome::Unchanged => {
                let current = self
                    .transactions
                    .find_by_id(&transaction.id)
                    .await?
                    .ok_or(PaymentError::TransactionNotFound)?;
                if current.is_paid() {
                    Ok(ReconcileOutcome::AlreadyApplied)
                } else {
                    Err(PaymentError::AlreadySettled("rejected"))
                }
            }
        }
    }

    /// Administratively rejects a pending manual submission.
    ///
    /// The account's `pending` clears back to `unpaid`; no fourth state.
    pub async fn reject_manual(
        &self,
        transaction_id: &TransactionId,
        now: Timestamp,
    ) -> Result<(), PaymentError> {
        let transaction = self
            .transactions
            .find_by_id(transaction_id)
            .await?
            .ok_or(PaymentError::TransactionNotFound)?;

        let lock = self.lock_for(&transaction.account_id).await;
        let _guard = lock.lock().await;

        match self
            .transactions
            .mark_rejected_if_pending(transaction_id, now)
            .await?
        {
            CasOutcome::Applied => {
                self.accounts
                    .update_payment_state(
                        &transaction.account_id,
                        false,
                        PaymentStatus::Unpaid,
                        now,
                    )
                    .await?;
                Ok(())
            }
            CasOutcome::Unchanged => {
                let current = self
                    .transactions
                    .find_by_id(transaction_id)
                    .await?
                    .ok_or(PaymentError::TransactionNotFound)?;
                let settled = if current.is_paid() { "paid" } else { "rejected" };
                Err(PaymentError::AlreadySettled(settled))
            }
        }
    }

    /// Administrative override of the account's payment state.
    ///
    /// Always wins and is exempt from the single-pending rule. Setting
    /// `paid` transitions all of the account's pending transactions to
    /// paid in bulk; returns how many were transitioned. Crediting an
    /// account with nothing pending records a settled override
    /// transaction instead, so a paid account always traces back to a
    /// paid transaction.
    pub async fn admin_override(
        &self,
        account_id: &AccountId,
        paid: bool,
        amount_minor: i64,
        currency: &str,
        now: Timestamp,
    ) -> Result<u64, PaymentError> {
        let lock = self.lock_for(account_id).await;
        let _guard = lock.lock().await;

        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(PaymentError::AccountNotFound)?;

        if paid {
            let transitioned = self
                .transactions
                .mark_all_pending_paid(account_id, now)
                .await?;
            if transitioned == 0 && !account.payment_paid {
                let transaction =
                    PaymentTransaction::settled_override(*account_id, amount_minor, currency, now);
                self.transactions.insert(&transaction).await?;
            }
            self.accounts
                .update_payment_state(account_id, true, PaymentStatus::Paid, now)
                .await?;
            Ok(transitioned)
        } else {
            self.accounts
                .update_payment_state(account_id, false, PaymentStatus::Unpaid, now)
                .await?;
            Ok(0)
        }
    }

    /// Entry rule shared by the gateway and manual channels.
    async fn ensure_can_enter(&self, account_id: &AccountId) -> Result<(), PaymentError> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(PaymentError::AccountNotFound)?;

        if account.payment_paid || account.payment_status.is_paid() {
            return Err(PaymentError::AlreadyPaid);
        }
        if self
            .transactions
            .find_pending_by_account(account_id)
            .await?
            .is_some()
        {
            return Err(PaymentError::DuplicatePending);
        }
        Ok(())
    }

    async fn lock_for(&self, account_id: &AccountId) -> Arc<Mutex<()>> {
        let mut locks = self.account_locks.lock().await;
        Arc::clone(locks.entry(*account_id).or_default())
    }
}
