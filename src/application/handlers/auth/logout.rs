//! LogoutHandler - Command handler for token revocation.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::security::{SessionGuard, TokenAuthority};
use crate::ports::{AuditSink, SecurityEvent};

use super::error::AuthError;

/// Command to revoke a bearer token.
#[derive(Debug, Clone)]
pub struct LogoutCommand {
    pub token: String,
}

/// Result of a logout.
#[derive(Debug, Clone)]
pub struct LogoutOutcome {
    /// The token id that entered the revocation set.
    pub token_id: String,
    /// Sessions dropped because they rode on the revoked token.
    pub sessions_dropped: usize,
}

/// Handler for logout.
///
/// Revoking the token also drops every session bound to it, keeping the
/// invariant that a session always references a live, non-revoked token.
pub struct LogoutHandler {
    tokens: Arc<TokenAuthority>,
    sessions: Arc<SessionGuard>,
    audit: Arc<dyn AuditSink>,
}

impl LogoutHandler {
    pub fn new(
        tokens: Arc<TokenAuthority>,
        sessions: Arc<SessionGuard>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            tokens,
            sessions,
            audit,
        }
    }

    pub async fn handle(&self, cmd: LogoutCommand) -> Result<LogoutOutcome, AuthError> {
        let revoked = self.tokens.revoke(&cmd.token).await?;
        let sessions_dropped = self.sessions.invalidate_token(&revoked.token_id).await;

        self.audit
            .record(
                SecurityEvent::TokenRevoked {
                    token_id: revoked.token_id.clone(),
                },
                Timestamp::now(),
            )
            .await;

        Ok(LogoutOutcome {
            token_id: revoked.token_id,
            sessions_dropped,
        })
    }
}
