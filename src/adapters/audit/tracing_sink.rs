//! Tracing-backed audit sink.
//!
//! Emits each security event as a structured tracing event with
//! account/address/time fields. A deployment with a dedicated security
//! monitoring system would replace this adapter; the core only ever sees
//! the port.

use async_trait::async_trait;

use crate::domain::foundation::Timestamp;
use crate::ports::{AuditSeverity, AuditSink, SecurityEvent};

/// Audit sink that routes records to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Creates the sink.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: SecurityEvent, at: Timestamp) {
        let kind = event.kind();
        let detail = detail_of(&event);
        let at = at.as_datetime().to_rfc3339();

        match event.severity() {
            AuditSeverity::Info => {
                tracing::info!(target: "audit", kind, at = %at, %detail, "security event");
            }
            AuditSeverity::Warning => {
                tracing::warn!(target: "audit", kind, at = %at, %detail, "security event");
            }
            AuditSeverity::Critical => {
                tracing::error!(target: "audit", kind, at = %at, %detail, "security event");
            }
        }
    }
}

fn detail_of(event: &SecurityEvent) -> String {
    match event {
        SecurityEvent::LoginSucceeded {
            account_id,
            source_addr,
        } => format!("account={} addr={}", account_id, source_addr),
        SecurityEvent::LoginFailed {
            contact,
            source_addr,
            failed_count,
        } => format!(
            "contact={} addr={} failed_count={}",
            contact, source_addr, failed_count
        ),
        SecurityEvent::AccountLocked {
            account_id,
            source_addr,
            retry_after_secs,
        } => format!(
            "account={} addr={} retry_after_secs={}",
            account_id, source_addr, retry_after_secs
        ),
        SecurityEvent::LockedAttemptRejected {
            account_id,
            source_addr,
        } => format!("account={} addr={}", account_id, source_addr),
        SecurityEvent::AddressBlacklisted { source_addr } => {
            format!("addr={}", source_addr)
        }
        SecurityEvent::BlacklistedRequestRejected { source_addr } => {
            format!("addr={}", source_addr)
        }
        SecurityEvent::SuspiciousTraffic { source_addr } => {
            format!("addr={}", source_addr)
        }
        SecurityEvent::SessionMismatch {
            session_id,
            source_addr,
            reason,
        } => format!(
            "session={} addr={} reason={}",
            session_id, source_addr, reason
        ),
        SecurityEvent::TokenRevoked { token_id } => format!("token={}", token_id),
        SecurityEvent::WebhookRejected { reason } => format!("reason={}", reason),
        SecurityEvent::AdminPaymentOverride { account_id, paid } => {
            format!("account={} paid={}", account_id, paid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::AccountId;

    #[tokio::test]
    async fn record_does_not_panic_for_every_variant() {
        let sink = TracingAuditSink::new();
        let now = Timestamp::now();
        let account_id = AccountId::new();

        let events = vec![
            SecurityEvent::LoginSucceeded {
                account_id,
                source_addr: "203.0.113.7".to_string(),
            },
            SecurityEvent::LoginFailed {
                contact: "9876543210".to_string(),
                source_addr: "203.0.113.7".to_string(),
                failed_count: 3,
            },
            SecurityEvent::AccountLocked {
                account_id,
                source_addr: "203.0.113.7".to_string(),
                retry_after_secs: 1800,
            },
            SecurityEvent::AddressBlacklisted {
                source_addr: "203.0.113.7".to_string(),
            },
            SecurityEvent::WebhookRejected {
                reason: "invalid signature".to_string(),
            },
        ];

        for event in events {
            sink.record(event, now).await;
        }
    }

    #[test]
    fn detail_includes_address_and_account() {
        let account_id = AccountId::new();
        let detail = detail_of(&SecurityEvent::AccountLocked {
            account_id,
            source_addr: "203.0.113.7".to_string(),
            retry_after_secs: 1800,
        });

        assert!(detail.contains("203.0.113.7"));
        assert!(detail.contains(&account_id.to_string()));
    }
}
