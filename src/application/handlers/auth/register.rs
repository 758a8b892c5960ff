//! RegisterHandler - Command handler for account registration.

use std::sync::Arc;

use crate::domain::account::{validate_contact, Account};
use crate::domain::foundation::{AccountId, RequestContext, SessionId, StoreError, Timestamp};
use crate::domain::security::{
    hash_password, validate_password_policy, IssuedToken, SessionGuard, TokenAuthority, TokenTtls,
};
use crate::ports::AccountStore;

use super::error::AuthError;

/// Command to register a new account.
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub name: String,
    pub college: String,
    pub class_name: String,
    pub stream: String,
    pub contact: String,
    pub password: String,
    pub context: RequestContext,
}

/// Result of successful registration: the caller is logged in immediately.
#[derive(Debug, Clone)]
pub struct RegisterOutcome {
    pub account: Account,
    pub token: IssuedToken,
    pub session_id: SessionId,
}

/// Handler for account registration.
pub struct RegisterHandler {
    accounts: Arc<dyn AccountStore>,
    tokens: Arc<TokenAuthority>,
    sessions: Arc<SessionGuard>,
    ttls: TokenTtls,
}

impl RegisterHandler {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        tokens: Arc<TokenAuthority>,
        sessions: Arc<SessionGuard>,
        ttls: TokenTtls,
    ) -> Self {
        Self {
            accounts,
            tokens,
            sessions,
            ttls,
        }
    }

    pub async fn handle(&self, cmd: RegisterCommand) -> Result<RegisterOutcome, AuthError> {
        // 1. Validate the security-relevant fields
        validate_contact(&cmd.contact)?;
        validate_password_policy(&cmd.password)?;

        // 2. Hash the credential
        let password_hash = hash_password(&cmd.password)?;

        // 3. Persist; the unique contact index backs the duplicate check
        let now = Timestamp::now();
        let account = Account::register(
            AccountId::new(),
            cmd.name,
            cmd.college,
            cmd.class_name,
            cmd.stream,
            cmd.contact,
            password_hash,
            now,
        );
        self.accounts.insert(&account).await.map_err(|e| match e {
            StoreError::Constraint(_) => AuthError::ContactTaken,
            other => AuthError::Store(other),
        })?;

        // 4. Log the fresh account in
        let token = self.tokens.issue(&account.id, self.ttls.standard)?;
        let session_id = self
            .sessions
            .create(account.id, &cmd.context, token.token_id.clone(), now)
            .await;

        Ok(RegisterOutcome {
            account,
            token,
            session_id,
        })
    }
}
