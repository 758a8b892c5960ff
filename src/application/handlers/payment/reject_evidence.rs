//! RejectEvidenceHandler - Operator rejection of a manual submission.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, Timestamp, TransactionId};
use crate::domain::payment::{PaymentError, PaymentReconciler};
use crate::ports::AccountStore;

use super::error::PaymentFlowError;

/// Command to reject a pending manual-evidence transaction.
#[derive(Debug, Clone)]
pub struct RejectEvidenceCommand {
    /// The operator; must hold the admin role.
    pub acting_account_id: AccountId,
    pub transaction_id: TransactionId,
}

/// Handler for evidence rejection.
///
/// Rejection settles the transaction and clears the account's `pending`
/// back to `unpaid`, freeing the account to submit again.
pub struct RejectEvidenceHandler {
    accounts: Arc<dyn AccountStore>,
    reconciler: Arc<PaymentReconciler>,
}

impl RejectEvidenceHandler {
    pub fn new(accounts: Arc<dyn AccountStore>, reconciler: Arc<PaymentReconciler>) -> Self {
        Self {
            accounts,
            reconciler,
        }
    }

    pub async fn handle(&self, cmd: RejectEvidenceCommand) -> Result<(), PaymentFlowError> {
        let actor = self
            .accounts
            .find_by_id(&cmd.acting_account_id)
            .await
            .map_err(PaymentError::from)?
            .ok_or(PaymentFlowError::Forbidden)?;
        if !actor.is_admin() {
            return Err(PaymentFlowError::Forbidden);
        }

        self.reconciler
            .reject_manual(&cmd.transaction_id, Timestamp::now())
            .await?;
        Ok(())
    }
}
