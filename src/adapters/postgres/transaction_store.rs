//! PostgreSQL implementation of TransactionStore.
//!
//! The settlement operations are conditional UPDATEs on the status column;
//! `rows_affected` tells a caller whether it won the race, which is what
//! makes the paid transition apply at most once under concurrent webhook
//! and poll delivery.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE payment_transactions (
//!     id UUID PRIMARY KEY,
//!     account_id UUID NOT NULL,
//!     channel TEXT NOT NULL,
//!     amount_minor BIGINT NOT NULL,
//!     currency TEXT NOT NULL,
//!     status TEXT NOT NULL DEFAULT 'pending',
//!     gateway_session_id TEXT,
//!     evidence_reference TEXT,
//!     evidence_content_type TEXT,
//!     evidence_size_bytes BIGINT,
//!     evidence_object_key TEXT,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL
//! );
//! CREATE INDEX payment_transactions_account_idx ON payment_transactions (account_id);
//! CREATE UNIQUE INDEX payment_transactions_gateway_session_key
//!     ON payment_transactions (gateway_session_id)
//!     WHERE gateway_session_id IS NOT NULL;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{AccountId, StoreError, Timestamp, TransactionId};
use crate::domain::payment::{
    EvidenceRef, PaymentChannel, PaymentTransaction, TransactionStatus,
};
use crate::ports::{CasOutcome, TransactionStore};

/// PostgreSQL implementation of the TransactionStore port.
pub struct PostgresTransactionStore {
    pool: PgPool,
}

impl PostgresTransactionStore {
    /// Creates a store over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn settle(
        &self,
        id: &TransactionId,
        target: TransactionStatus,
        at: Timestamp,
    ) -> Result<CasOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE payment_transactions
            SET status = $2, updated_at = $3
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id.as_uuid())
        .bind(target.as_str())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() > 0 {
            Ok(CasOutcome::Applied)
        } else {
            Ok(CasOutcome::Unchanged)
        }
    }
}

/// Database row representation of a payment transaction.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    account_id: Uuid,
    channel: String,
    amount_minor: i64,
    currency: String,
    status: String,
    gateway_session_id: Option<String>,
    evidence_reference: Option<String>,
    evidence_content_type: Option<String>,
    evidence_size_bytes: Option<i64>,
    evidence_object_key: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for PaymentTransaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let evidence = match (
            row.evidence_reference,
            row.evidence_content_type,
            row.evidence_size_bytes,
            row.evidence_object_key,
        ) {
            (Some(reference), Some(content_type), Some(size_bytes), Some(object_key)) => {
                Some(EvidenceRef {
                    reference,
                    content_type,
                    size_bytes: size_bytes.max(0) as u64,
                    object_key,
                })
            }
            (None, None, None, None) => None,
            _ => {
                return Err(StoreError::corrupt(
                    "partial evidence columns on transaction row",
                ))
            }
        };

        Ok(PaymentTransaction {
            id: TransactionId::from_uuid(row.id),
            account_id: AccountId::from_uuid(row.account_id),
            channel: parse_channel(&row.channel)?,
            amount_minor: row.amount_minor,
            currency: row.currency,
            status: parse_status(&row.status)?,
            gateway_session_id: row.gateway_session_id,
            evidence,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_channel(s: &str) -> Result<PaymentChannel, StoreError> {
    match s {
        "gateway" => Ok(PaymentChannel::Gateway),
        "manual_evidence" => Ok(PaymentChannel::ManualEvidence),
        "admin_override" => Ok(PaymentChannel::AdminOverride),
        _ => Err(StoreError::corrupt(format!("invalid channel value: {}", s))),
    }
}

fn parse_status(s: &str) -> Result<TransactionStatus, StoreError> {
    match s {
        "pending" => Ok(TransactionStatus::Pending),
        "paid" => Ok(TransactionStatus::Paid),
        "rejected" => Ok(TransactionStatus::Rejected),
        _ => Err(StoreError::corrupt(format!("invalid status value: {}", s))),
    }
}

fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if let Some(constraint) = db_err.constraint() {
            return StoreError::constraint(constraint.to_string());
        }
    }
    StoreError::unavailable(e.to_string())
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, account_id, channel, amount_minor, currency, status,
           gateway_session_id, evidence_reference, evidence_content_type,
           evidence_size_bytes, evidence_object_key, created_at, updated_at
    FROM payment_transactions
"#;

#[async_trait]
impl TransactionStore for PostgresTransactionStore {
    async fn insert(&self, transaction: &PaymentTransaction) -> Result<(), StoreError> {
        let (evidence_reference, evidence_content_type, evidence_size_bytes, evidence_object_key) =
            match &transaction.evidence {
                Some(e) => (
                    Some(e.reference.clone()),
                    Some(e.content_type.clone()),
                    Some(e.size_bytes as i64),
                    Some(e.object_key.clone()),
                ),
                None => (None, None, None, None),
            };

        sqlx::query(
            r#"
            INSERT INTO payment_transactions (
                id, account_id, channel, amount_minor, currency, status,
                gateway_session_id, evidence_reference, evidence_content_type,
                evidence_size_bytes, evidence_object_key, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.account_id.as_uuid())
        .bind(transaction.channel.as_str())
        .bind(transaction.amount_minor)
        .bind(&transaction.currency)
        .bind(transaction.status.as_str())
        .bind(&transaction.gateway_session_id)
        .bind(evidence_reference)
        .bind(evidence_content_type)
        .bind(evidence_size_bytes)
        .bind(evidence_object_key)
        .bind(transaction.created_at.as_datetime())
        .bind(transaction.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<Option<PaymentTransaction>, StoreError> {
        let row: Option<TransactionRow> =
            sqlx::query_as(&format!("{} WHERE id = $1", SELECT_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        row.map(PaymentTransaction::try_from).transpose()
    }

    async fn find_by_gateway_session(
        &self,
        session_id: &str,
    ) -> Result<Option<PaymentTransaction>, StoreError> {
        let row: Option<TransactionRow> =
            sqlx::query_as(&format!("{} WHERE gateway_session_id = $1", SELECT_COLUMNS))
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        row.map(PaymentTransaction::try_from).transpose()
    }

    async fn find_pending_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<PaymentTransaction>, StoreError> {
        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "{} WHERE account_id = $1 AND status = 'pending' LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(PaymentTransaction::try_from).transpose()
    }

    async fn list_by_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<PaymentTransaction>, StoreError> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            "{} WHERE account_id = $1 ORDER BY created_at ASC",
            SELECT_COLUMNS
        ))
        .bind(account_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(PaymentTransaction::try_from)
            .collect()
    }

    async fn mark_paid_if_pending(
        &self,
        id: &TransactionId,
        at: Timestamp,
    ) -> Result<CasOutcome, StoreError> {
        self.settle(id, TransactionStatus::Paid, at).await
    }

    async fn mark_rejected_if_pending(
        &self,
        id: &TransactionId,
        at: Timestamp,
    ) -> Result<CasOutcome, StoreError> {
        self.settle(id, TransactionStatus::Rejected, at).await
    }

    async fn mark_all_pending_paid(
        &self,
        account_id: &AccountId,
        at: Timestamp,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE payment_transactions
            SET status = 'paid', updated_at = $2
            WHERE account_id = $1 AND status = 'pending'
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_channel_roundtrips_as_str() {
        for channel in [
            PaymentChannel::Gateway,
            PaymentChannel::ManualEvidence,
            PaymentChannel::AdminOverride,
        ] {
            assert_eq!(parse_channel(channel.as_str()).unwrap(), channel);
        }
    }

    #[test]
    fn parse_status_rejects_unknown_value() {
        assert!(matches!(
            parse_status("chargeback"),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn partial_evidence_columns_are_corrupt() {
        let row = TransactionRow {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            channel: "manual_evidence".to_string(),
            amount_minor: 49900,
            currency: "INR".to_string(),
            status: "pending".to_string(),
            gateway_session_id: None,
            evidence_reference: Some("UPI-2025-000123".to_string()),
            evidence_content_type: Some("image/png".to_string()),
            evidence_size_bytes: None,
            evidence_object_key: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(matches!(
            PaymentTransaction::try_from(row),
            Err(StoreError::Corrupt(_))
        ));
    }
}
