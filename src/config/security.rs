//! Security configuration
//!
//! Thresholds for the credential guard, the IP reputation monitor, the
//! session consistency checker, and evidence uploads, with bridges into
//! the domain-level config structs.

use chrono::Duration;
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::payment::{EvidencePolicy, DEFAULT_ALLOWED_EVIDENCE_TYPES};
use crate::domain::security::{ConsistencyPolicy, CredentialGuardConfig, IpReputationConfig};

/// Security configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Failed logins before an account locks
    #[serde(default = "default_max_login_attempts")]
    pub max_login_attempts: u32,

    /// Account lockout duration in minutes
    #[serde(default = "default_lockout_minutes")]
    pub lockout_minutes: i64,

    /// Address failures per hour beyond which the address blacklists
    #[serde(default = "default_ip_failure_threshold")]
    pub ip_failure_threshold: usize,

    /// Address blacklist duration in hours
    #[serde(default = "default_ip_blacklist_hours")]
    pub ip_blacklist_hours: i64,

    /// Requests per hour above which traffic is inspected for automation
    #[serde(default = "default_request_flood_threshold")]
    pub request_flood_threshold: usize,

    /// Cap on tracked source addresses
    #[serde(default = "default_max_tracked_addresses")]
    pub max_tracked_addresses: usize,

    /// Reject requests whose source address differs from the session origin
    #[serde(default = "default_true")]
    pub enforce_origin_consistency: bool,

    /// Reject requests whose client signature differs from the session's
    #[serde(default = "default_true")]
    pub enforce_signature_consistency: bool,

    /// Ceiling for uploaded evidence artifacts in bytes
    #[serde(default = "default_max_evidence_bytes")]
    pub max_evidence_bytes: u64,
}

fn default_max_login_attempts() -> u32 {
    5
}

fn default_lockout_minutes() -> i64 {
    30
}

fn default_ip_failure_threshold() -> usize {
    50
}

fn default_ip_blacklist_hours() -> i64 {
    24
}

fn default_request_flood_threshold() -> usize {
    100
}

fn default_max_tracked_addresses() -> usize {
    100_000
}

fn default_true() -> bool {
    true
}

fn default_max_evidence_bytes() -> u64 {
    5 * 1024 * 1024
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_login_attempts: default_max_login_attempts(),
            lockout_minutes: default_lockout_minutes(),
            ip_failure_threshold: default_ip_failure_threshold(),
            ip_blacklist_hours: default_ip_blacklist_hours(),
            request_flood_threshold: default_request_flood_threshold(),
            max_tracked_addresses: default_max_tracked_addresses(),
            enforce_origin_consistency: default_true(),
            enforce_signature_consistency: default_true(),
            max_evidence_bytes: default_max_evidence_bytes(),
        }
    }
}

impl SecurityConfig {
    /// Credential guard thresholds
    pub fn credential_guard_config(&self) -> CredentialGuardConfig {
        CredentialGuardConfig {
            max_failed_attempts: self.max_login_attempts,
            lockout_duration: Duration::minutes(self.lockout_minutes),
            reporting_window: Duration::hours(1),
        }
    }

    /// IP reputation thresholds
    pub fn ip_reputation_config(&self) -> IpReputationConfig {
        IpReputationConfig {
            failure_threshold: self.ip_failure_threshold,
            blacklist_duration: Duration::hours(self.ip_blacklist_hours),
            window: Duration::hours(1),
            request_flood_threshold: self.request_flood_threshold,
            burst_sample: 10,
            burst_max_mean_gap_secs: 1.0,
            max_tracked_addresses: self.max_tracked_addresses,
        }
    }

    /// Session consistency enforcement flags
    pub fn consistency_policy(&self) -> ConsistencyPolicy {
        ConsistencyPolicy {
            enforce_origin: self.enforce_origin_consistency,
            enforce_signature: self.enforce_signature_consistency,
        }
    }

    /// Evidence upload constraints
    pub fn evidence_policy(&self) -> EvidencePolicy {
        EvidencePolicy {
            allowed_types: DEFAULT_ALLOWED_EVIDENCE_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_size_bytes: self.max_evidence_bytes,
        }
    }

    /// Validate security configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_login_attempts == 0 {
            return Err(ValidationError::ZeroThreshold("max_login_attempts"));
        }
        if self.lockout_minutes <= 0 {
            return Err(ValidationError::ZeroThreshold("lockout_minutes"));
        }
        if self.ip_failure_threshold == 0 {
            return Err(ValidationError::ZeroThreshold("ip_failure_threshold"));
        }
        if self.ip_blacklist_hours <= 0 {
            return Err(ValidationError::ZeroThreshold("ip_blacklist_hours"));
        }
        if self.max_tracked_addresses == 0 {
            return Err(ValidationError::ZeroThreshold("max_tracked_addresses"));
        }
        if self.max_evidence_bytes == 0 {
            return Err(ValidationError::ZeroThreshold("max_evidence_bytes"));
        }
        Ok(())
    }
}
