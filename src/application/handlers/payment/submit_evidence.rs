//! SubmitEvidenceHandler - Manual payment evidence submission.

use std::sync::Arc;

use crate::domain::foundation::{AccountId, Timestamp};
use crate::domain::payment::{EvidenceRef, PaymentReconciler, PaymentTransaction};

use super::error::PaymentFlowError;

/// Command to submit payment evidence for review.
#[derive(Debug, Clone)]
pub struct SubmitEvidenceCommand {
    pub account_id: AccountId,
    /// Payment reference claimed by the submitter.
    pub reference: String,
    /// Declared content type of the uploaded artifact.
    pub content_type: String,
    /// Size of the upload in bytes.
    pub size_bytes: u64,
    /// Opaque key the upload was stored under.
    pub object_key: String,
}

/// Handler for manual evidence submission.
///
/// Artifact validation (image types only, bounded size) happens inside the
/// reconciler before any state is written.
pub struct SubmitEvidenceHandler {
    reconciler: Arc<PaymentReconciler>,
    fee_minor: i64,
    currency: String,
}

impl SubmitEvidenceHandler {
    pub fn new(
        reconciler: Arc<PaymentReconciler>,
        fee_minor: i64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            reconciler,
            fee_minor,
            currency: currency.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitEvidenceCommand,
    ) -> Result<PaymentTransaction, PaymentFlowError> {
        let evidence = EvidenceRef {
            reference: cmd.reference,
            content_type: cmd.content_type,
            size_bytes: cmd.size_bytes,
            object_key: cmd.object_key,
        };

        let transaction = self
            .reconciler
            .submit_evidence(
                &cmd.account_id,
                evidence,
                self.fee_minor,
                &self.currency,
                Timestamp::now(),
            )
            .await?;

        Ok(transaction)
    }
}
