//! AdminOverrideHandler - Operator override of an account's payment state.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, Timestamp};
use crate::domain::payment::PaymentReconciler;
use crate::ports::{AccountStore, AuditSink, SecurityEvent};

use super::error::PaymentFlowError;

/// Command to override an account's payment state.
#[derive(Debug, Clone)]
pub struct AdminOverrideCommand {
    /// The operator; must hold the admin role.
    pub acting_account_id: AccountId,
    pub target_account_id: AccountId,
    pub paid: bool,
}

/// Result of an override.
#[derive(Debug, Clone, Copy)]
pub struct AdminOverrideOutcome {
    /// Pending transactions transitioned to paid by this override.
    pub transactions_settled: u64,
}

/// Handler for the administrative payment channel.
///
/// The override always wins: it is exempt from the single-pending rule and
/// settles every pending transaction when crediting.
pub struct AdminOverrideHandler {
    accounts: Arc<dyn AccountStore>,
    reconciler: Arc<PaymentReconciler>,
    audit: Arc<dyn AuditSink>,
    fee_minor: i64,
    currency: String,
}

impl AdminOverrideHandler {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        reconciler: Arc<PaymentReconciler>,
        audit: Arc<dyn AuditSink>,
        fee_minor: i64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            accounts,
            reconciler,
            audit,
            fee_minor,
            currency: currency.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: AdminOverrideCommand,
    ) -> Result<AdminOverrideOutcome, PaymentFlowError> {
        let actor = self
            .accounts
            .find_by_id(&cmd.acting_account_id)
            .await
            .map_err(crate::domain::payment::PaymentError::from)?
            .ok_or(PaymentFlowError::Forbidden)?;
        if !actor.is_admin() {
            return Err(PaymentFlowError::Forbidden);
        }

        let now = Timestamp::now();
        let transactions_settled = self
            .reconciler
            .admin_override(
                &cmd.target_account_id,
                cmd.paid,
                self.fee_minor,
                &self.currency,
                now,
            )
            .await?;

        self.audit
            .record(
                SecurityEvent::AdminPaymentOverride {
                    account_id: cmd.target_account_id,
                    paid: cmd.paid,
                },
                now,
            )
            .await;

        Ok(AdminOverrideOutcome {
            transactions_settled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::audit::TracingAuditSink;
    use crate::adapters::memory::{InMemoryAccountStore, InMemoryTransactionStore};
    use crate::domain::account::{Account, AccountRole};
    use crate::domain::payment::{EvidencePolicy, EvidenceRef, PaymentStatus};

    struct Fixture {
        accounts: Arc<InMemoryAccountStore>,
        reconciler: Arc<PaymentReconciler>,
        handler: AdminOverrideHandler,
        admin_id: AccountId,
        student_id: AccountId,
    }

    async fn fixture() -> Fixture {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let transactions = Arc::new(InMemoryTransactionStore::new());

        let mut admin = Account::register(
            AccountId::new(),
            "Ops",
            "City College",
            "Staff",
            "Admin",
            "9876500000",
            "$argon2id$placeholder",
            Timestamp::now(),
        );
        admin.role = AccountRole::Admin;
        let student = Account::register(
            AccountId::new(),
            "Asha Rao",
            "City College",
            "2nd Year",
            "Science",
            "9876543210",
            "$argon2id$placeholder",
            Timestamp::now(),
        );
        let admin_id = admin.id;
        let student_id = student.id;
        accounts.insert(&admin).await.unwrap();
        accounts.insert(&student).await.unwrap();

        let reconciler = Arc::new(PaymentReconciler::new(
            accounts.clone(),
            transactions,
            EvidencePolicy::default(),
        ));
        let handler = AdminOverrideHandler::new(
            accounts.clone(),
            reconciler.clone(),
            Arc::new(TracingAuditSink::new()),
            49900,
            "INR",
        );

        Fixture {
            accounts,
            reconciler,
            handler,
            admin_id,
            student_id,
        }
    }

    fn evidence() -> EvidenceRef {
        EvidenceRef {
            reference: "UPI-2025-000123".to_string(),
            content_type: "image/png".to_string(),
            size_bytes: 2048,
            object_key: "uploads/receipt-001".to_string(),
        }
    }

    #[tokio::test]
    async fn admin_override_settles_pending_transactions() {
        let f = fixture().await;
        f.reconciler
            .submit_evidence(&f.student_id, evidence(), 49900, "INR", Timestamp::now())
            .await
            .unwrap();

        let outcome = f
            .handler
            .handle(AdminOverrideCommand {
                acting_account_id: f.admin_id,
                target_account_id: f.student_id,
                paid: true,
            })
            .await
            .unwrap();

        assert_eq!(outcome.transactions_settled, 1);
        let account = f.accounts.find_by_id(&f.student_id).await.unwrap().unwrap();
        assert_eq!(account.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn non_admin_actor_is_forbidden() {
        let f = fixture().await;
        let result = f
            .handler
            .handle(AdminOverrideCommand {
                acting_account_id: f.student_id,
                target_account_id: f.student_id,
                paid: true,
            })
            .await;

        assert!(matches!(result, Err(PaymentFlowError::Forbidden)));
    }

    #[tokio::test]
    async fn unknown_actor_is_forbidden() {
        let f = fixture().await;
        let result = f
            .handler
            .handle(AdminOverrideCommand {
                acting_account_id: AccountId::new(),
                target_account_id: f.student_id,
                paid: true,
            })
            .await;

        assert!(matches!(result, Err(PaymentFlowError::Forbidden)));
    }
}
