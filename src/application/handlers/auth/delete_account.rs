//! DeleteAccountHandler - Administrative account removal.

use std::sync::Arc;

use crate::domain::foundation::AccountId;
use crate::ports::AccountStore;

use super::error::AuthError;

/// Command to delete an account.
#[derive(Debug, Clone)]
pub struct DeleteAccountCommand {
    /// The operator performing the deletion; must hold the admin role.
    pub acting_account_id: AccountId,
    pub target_account_id: AccountId,
}

/// Handler for account deletion.
///
/// Deletion is unconditional: no cascading transaction cleanup happens,
/// transactions stay behind as immutable history, and lookups by the
/// deleted account id simply return nothing thereafter.
pub struct DeleteAccountHandler {
    accounts: Arc<dyn AccountStore>,
}

impl DeleteAccountHandler {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    /// Returns true when an account was deleted.
    pub async fn handle(&self, cmd: DeleteAccountCommand) -> Result<bool, AuthError> {
        let actor = self
            .accounts
            .find_by_id(&cmd.acting_account_id)
            .await?
            .ok_or(AuthError::Forbidden)?;
        if !actor.is_admin() {
            return Err(AuthError::Forbidden);
        }

        Ok(self.accounts.delete(&cmd.target_account_id).await?)
    }
}
