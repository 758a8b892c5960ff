//! Audit sink port for security-relevant events.
//!
//! Every lockout, blacklist hit, session mismatch, and rejected webhook is
//! recorded with account/address/time. The sink itself is an external
//! collaborator; the default adapter emits structured tracing events.

use async_trait::async_trait;

use crate::domain::foundation::{AccountId, SessionId, Timestamp};

/// Severity attached to an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditSeverity {
    Info,
    Warning,
    Critical,
}

/// Security-relevant events recorded to the audit sink.
#[derive(Debug, Clone)]
pub enum SecurityEvent {
    /// A login completed successfully.
    LoginSucceeded {
        account_id: AccountId,
        source_addr: String,
    },

    /// A login attempt failed the credential check.
    LoginFailed {
        contact: String,
        source_addr: String,
        failed_count: u32,
    },

    /// Repeated failures engaged an account lock.
    AccountLocked {
        account_id: AccountId,
        source_addr: String,
        retry_after_secs: i64,
    },

    /// An attempt was rejected because the account is locked.
    LockedAttemptRejected {
        account_id: AccountId,
        source_addr: String,
    },

    /// Repeated failures blacklisted a source address.
    AddressBlacklisted { source_addr: String },

    /// A request from a blacklisted address was rejected.
    BlacklistedRequestRejected { source_addr: String },

    /// The automation heuristic flagged an address (advisory).
    SuspiciousTraffic { source_addr: String },

    /// A session failed a consistency check.
    SessionMismatch {
        session_id: SessionId,
        source_addr: String,
        reason: String,
    },

    /// A bearer token was revoked.
    TokenRevoked { token_id: String },

    /// An inbound webhook failed verification.
    WebhookRejected { reason: String },

    /// An operator overrode an account's payment state.
    AdminPaymentOverride {
        account_id: AccountId,
        paid: bool,
    },
}

impl SecurityEvent {
    /// Short machine-readable event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SecurityEvent::LoginSucceeded { .. } => "login_succeeded",
            SecurityEvent::LoginFailed { .. } => "login_failed",
            SecurityEvent::AccountLocked { .. } => "account_locked",
            SecurityEvent::LockedAttemptRejected { .. } => "locked_attempt_rejected",
            SecurityEvent::AddressBlacklisted { .. } => "address_blacklisted",
            SecurityEvent::BlacklistedRequestRejected { .. } => "blacklisted_request_rejected",
            SecurityEvent::SuspiciousTraffic { .. } => "suspicious_traffic",
            SecurityEvent::SessionMismatch { .. } => "session_mismatch",
            SecurityEvent::TokenRevoked { .. } => "token_revoked",
            SecurityEvent::WebhookRejected { .. } => "webhook_rejected",
            SecurityEvent::AdminPaymentOverride { .. } => "admin_payment_override",
        }
    }

    /// Severity used when routing the record.
    pub fn severity(&self) -> AuditSeverity {
        match self {
            SecurityEvent::LoginSucceeded { .. } | SecurityEvent::TokenRevoked { .. } => {
                AuditSeverity::Info
            }
            SecurityEvent::LoginFailed { .. }
            | SecurityEvent::LockedAttemptRejected { .. }
            | SecurityEvent::BlacklistedRequestRejected { .. }
            | SecurityEvent::SuspiciousTraffic { .. }
            | SecurityEvent::AdminPaymentOverride { .. } => AuditSeverity::Warning,
            SecurityEvent::AccountLocked { .. }
            | SecurityEvent::AddressBlacklisted { .. }
            | SecurityEvent::SessionMismatch { .. }
            | SecurityEvent::WebhookRejected { .. } => AuditSeverity::Critical,
        }
    }
}

/// Port for the external audit sink.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Records one security event. Must not fail the calling operation.
    async fn record(&self, event: SecurityEvent, at: Timestamp);
}
