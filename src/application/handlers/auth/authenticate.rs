//! AuthenticateHandler - Token and session validation for inbound requests.
//!
//! Every authenticated request passes through here: bearer token first,
//! then the session consistency check when a session id accompanies the
//! request. Consistency failures block the request but leave the session
//! intact; revocation on mismatch is a policy the caller could add, not
//! one this handler imposes.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, RequestContext, SessionId, Timestamp};
use crate::domain::security::{SessionError, SessionGuard, TokenAuthority};
use crate::ports::{AuditSink, SecurityEvent};

use super::error::AuthError;

/// Command to authenticate one inbound request.
#[derive(Debug, Clone)]
pub struct AuthenticateCommand {
    pub token: String,
    /// Session to check for origin/signature consistency, when bound.
    pub session_id: Option<SessionId>,
    pub context: RequestContext,
}

/// The authenticated identity of a request.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedRequest {
    pub account_id: AccountId,
}

/// Handler for request authentication.
pub struct AuthenticateHandler {
    tokens: Arc<TokenAuthority>,
    sessions: Arc<SessionGuard>,
    audit: Arc<dyn AuditSink>,
}

impl AuthenticateHandler {
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

    pub async fn handle(&self, cmd: AuthenticateCommand) -> Result<AuthenticatedRequest, AuthError> {
        let now = Timestamp::now();

        // 1. Token authority gate
        let account_id = self.tokens.validate(&cmd.token).await?;

        // 2. Session consistency gate, when the request names a session
        if let Some(session_id) = cmd.session_id {
            match self.sessions.validate(&session_id, &cmd.context, now).await {
                Ok(bound_account) if bound_account == account_id => {}
                Ok(_) => {
                    // Session exists but belongs to another account.
                    return Err(AuthError::Session(SessionError::InvalidSession));
                }
                Err(e) => {
                    if !matches!(e, SessionError::InvalidSession) {
                        self.audit
                            .record(
                                SecurityEvent::SessionMismatch {
                                    session_id,
                                    source_addr: cmd.context.source_addr.clone(),
                                    reason: e.to_string(),
                                },
                                now,
                            )
                            .await;
                    }
                    return Err(AuthError::Session(e));
                }
            }
        }

        Ok(AuthenticatedRequest { account_id })
    }
}
