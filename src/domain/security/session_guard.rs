//! Session consistency checker.
//!
//! Binds a session to its origin address and client signature and rejects
//! replay from a different origin. The checker reports mismatches; it never
//! destroys the session itself, leaving revocation policy to the caller.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::foundation::{AccountId, RequestContext, SessionId, Timestamp};

/// Which consistency checks are enforced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConsistencyPolicy {
    /// Reject requests whose source address differs from the bound origin.
    pub enforce_origin: bool,
    /// Reject requests whose client signature differs from the bound one.
    pub enforce_signature: bool,
}

impl Default for ConsistencyPolicy {
    fn default() -> Self {
        Self {
            enforce_origin: true,
            enforce_signature: true,
        }
    }
}

/// Session validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The session id is unknown.
    #[error("invalid session")]
    InvalidSession,

    /// The request's source address differs from the bound origin.
    #[error("session origin mismatch")]
    OriginMismatch,

    /// The request's client signature differs from the bound one.
    #[error("session client signature mismatch")]
    SignatureMismatch,
}

/// A bound authentication context.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: SessionId,
    pub account_id: AccountId,
    pub origin: String,
    pub client_signature: String,
    /// Identifier (jti) of the bearer token this session rides on.
    pub token_id: String,
    pub created_at: Timestamp,
    pub last_activity: Timestamp,
}

/// In-process session registry with consistency enforcement.
///
/// A session is only as live as its token: `invalidate_token` drops every
/// session bound to a revoked token so a session never outlives it.
pub struct SessionGuard {
    policy: ConsistencyPolicy,
    sessions: RwLock<HashMap<SessionId, SessionRecord>>,
}

impl SessionGuard {
    /// Creates a guard with the given enforcement policy.
    pub fn new(policy: ConsistencyPolicy) -> Self {
        Self {
            policy,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a guard enforcing both consistency checks.
    pub fn with_defaults() -> Self {
        Self::new(ConsistencyPolicy::default())
    }

    /// Creates a session bound to the request's origin and signature.
    pub async fn create(
        &self,
        account_id: AccountId,
        ctx: &RequestContext,
        token_id: impl Into<String>,
        now: Timestamp,
    ) -> SessionId {
        let id = SessionId::new();
        let record = SessionRecord {
            id,
            account_id,
            origin: ctx.source_addr.clone(),
            client_signature: ctx.client_signature.clone(),
            token_id: token_id.into(),
            created_at: now,
            last_activity: now,
        };
        self.sessions.write().await.insert(id, record);
        id
    }

    /// Validates the session against the request context.
    ///
    /// On success the session's last-activity is stamped and the bound
    /// account id returned. Mismatch failures leave the session intact.
    pub async fn validate(
        &self,
        id: &SessionId,
        ctx: &RequestContext,
        now: Timestamp,
    ) -> Result<AccountId, SessionError> {
        let mut sessions = self.sessions.write().await;
        let record = sessions.get_mut(id).ok_or(SessionError::InvalidSession)?;

        if self.policy.enforce_origin && record.origin != ctx.source_addr {
            return Err(SessionError::OriginMismatch);
        }
        if self.policy.enforce_signature && record.client_signature != ctx.client_signature {
            return Err(SessionError::SignatureMismatch);
        }

        record.last_activity = now;
        Ok(record.account_id)
    }

    /// Removes one session.
    pub async fn invalidate(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Removes every session bound to the given token id.
    ///
    /// Returns the number of sessions dropped.
    pub async fn invalidate_token(&self, token_id: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| record.token_id != token_id);
        before - sessions.len()
    }

    /// Looks up a session record.
    pub async fn get(&self, id: &SessionId) -> Option<SessionRecord> {
        self.sessions.read().await.get(id).cloned()
    }
}
