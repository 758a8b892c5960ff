//! Payment transaction entity and evidence validation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, Timestamp, TransactionId};

use super::errors::PaymentError;
use super::status::{PaymentChannel, TransactionStatus};

/// Default ceiling for uploaded evidence artifacts (5 MiB).
pub const DEFAULT_MAX_EVIDENCE_BYTES: u64 = 5 * 1024 * 1024;

/// Image content types accepted as payment evidence.
pub const DEFAULT_ALLOWED_EVIDENCE_TYPES: [&str; 4] =
    ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Reference to an uploaded evidence artifact.
///
/// Storage mechanics live outside this core; the object key is opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceRef {
    /// Payment reference claimed by the submitter (bank/UPI transaction id).
    pub reference: String,
    /// Declared content type of the upload.
    pub content_type: String,
    /// Size of the upload in bytes.
    pub size_bytes: u64,
    /// Opaque key into the external object store.
    pub object_key: String,
}

/// Constraints applied to evidence artifacts before a transaction exists.
#[derive(Debug, Clone)]
pub struct EvidencePolicy {
    pub allowed_types: Vec<String>,
    pub max_size_bytes: u64,
}

impl Default for EvidencePolicy {
    fn default() -> Self {
        Self {
            allowed_types: DEFAULT_ALLOWED_EVIDENCE_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_size_bytes: DEFAULT_MAX_EVIDENCE_BYTES,
        }
    }
}

impl EvidencePolicy {
    /// Validates an artifact's type and size against the policy.
    pub fn validate(&self, evidence: &EvidenceRef) -> Result<(), PaymentError> {
        let content_type = evidence.content_type.to_ascii_lowercase();
        if !self.allowed_types.iter().any(|t| t == &content_type) {
            return Err(PaymentError::UnsupportedEvidenceType(
                evidence.content_type.clone(),
            ));
        }
        if evidence.size_bytes > self.max_size_bytes {
            return Err(PaymentError::EvidenceTooLarge {
                size_bytes: evidence.size_bytes,
                max_bytes: self.max_size_bytes,
            });
        }
        Ok(())
    }
}

/// One attempt to pay the membership fee.
///
/// Transactions are immutable history keyed by account id: deleting the
/// account leaves them in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub channel: PaymentChannel,
    /// Amount in minor currency units.
    pub amount_minor: i64,
    pub currency: String,
    pub status: TransactionStatus,
    /// Gateway-assigned checkout session id, gateway channel only.
    pub gateway_session_id: Option<String>,
    /// Evidence artifact, manual channel only.
    pub evidence: Option<EvidenceRef>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentTransaction {
    /// Creates a pending gateway transaction at checkout-session creation.
    pub fn pending_gateway(
        account_id: AccountId,
        gateway_session_id: impl Into<String>,
        amount_minor: i64,
        currency: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            account_id,
            channel: PaymentChannel::Gateway,
            amount_minor,
            currency: currency.into(),
            status: TransactionStatus::Pending,
            gateway_session_id: Some(gateway_session_id.into()),
            evidence: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a pending manual-evidence transaction.
    pub fn pending_manual(
        account_id: AccountId,
        evidence: EvidenceRef,
        amount_minor: i64,
        currency: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            account_id,
            channel: PaymentChannel::ManualEvidence,
            amount_minor,
            currency: currency.into(),
            status: TransactionStatus::Pending,
            gateway_session_id: None,
            evidence: Some(evidence),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an already-settled transaction for an administrative credit.
    ///
    /// Recorded when an operator marks an account paid with no pending
    /// transaction to transition, so a paid account always has a paid
    /// transaction behind it.
    pub fn settled_override(
        account_id: AccountId,
        amount_minor: i64,
        currency: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            account_id,
            channel: PaymentChannel::AdminOverride,
            amount_minor,
            currency: currency.into(),
            status: TransactionStatus::Paid,
            gateway_session_id: None,
            evidence: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true while the transaction awaits settlement.
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    /// Returns true once the transaction settled paid.
    pub fn is_paid(&self) -> bool {
        self.status == TransactionStatus::Paid
    }
}
