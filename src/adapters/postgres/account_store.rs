//! PostgreSQL implementation of AccountStore.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE accounts (
//!     id UUID PRIMARY KEY,
//!     name TEXT NOT NULL,
//!     college TEXT NOT NULL,
//!     class_name TEXT NOT NULL,
//!     stream TEXT NOT NULL,
//!     contact TEXT NOT NULL,
//!     password_hash TEXT NOT NULL,
//!     role TEXT NOT NULL DEFAULT 'student',
//!     payment_paid BOOLEAN NOT NULL DEFAULT FALSE,
//!     payment_status TEXT NOT NULL DEFAULT 'unpaid',
//!     failed_login_count INTEGER NOT NULL DEFAULT 0,
//!     locked_until TIMESTAMPTZ,
//!     last_login TIMESTAMPTZ,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL,
//!     CONSTRAINT accounts_contact_key UNIQUE (contact)
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::account::{Account, AccountRole};
use crate::domain::foundation::{AccountId, StoreError, Timestamp};
use crate::domain::payment::PaymentStatus;
use crate::ports::AccountStore;

/// PostgreSQL implementation of the AccountStore port.
///
/// Uses sqlx with connection pooling; the unique index on `contact` backs
/// the duplicate-registration check.
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    /// Creates a store over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an account.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    college: String,
    class_name: String,
    stream: String,
    contact: String,
    password_hash: String,
    role: String,
    payment_paid: bool,
    payment_status: String,
    failed_login_count: i32,
    locked_until: Option<DateTime<Utc>>,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: AccountId::from_uuid(row.id),
            name: row.name,
            college: row.college,
            class_name: row.class_name,
            stream: row.stream,
            contact: row.contact,
            password_hash: row.password_hash,
            role: parse_role(&row.role)?,
            payment_paid: row.payment_paid,
            payment_status: parse_payment_status(&row.payment_status)?,
            failed_login_count: row.failed_login_count.max(0) as u32,
            locked_until: row.locked_until.map(Timestamp::from_datetime),
            last_login: row.last_login.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_role(s: &str) -> Result<AccountRole, StoreError> {
    match s {
        "student" => Ok(AccountRole::Student),
        "admin" => Ok(AccountRole::Admin),
        _ => Err(StoreError::corrupt(format!("invalid role value: {}", s))),
    }
}

fn parse_payment_status(s: &str) -> Result<PaymentStatus, StoreError> {
    match s {
        "unpaid" => Ok(PaymentStatus::Unpaid),
        "pending" => Ok(PaymentStatus::Pending),
        "paid" => Ok(PaymentStatus::Paid),
        _ => Err(StoreError::corrupt(format!(
            "invalid payment_status value: {}",
            s
        ))),
    }
}

fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.constraint() == Some("accounts_contact_key") {
            return StoreError::constraint("accounts_contact_key");
        }
    }
    StoreError::unavailable(e.to_string())
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    async fn insert(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, name, college, class_name, stream, contact, password_hash,
                role, payment_paid, payment_status, failed_login_count,
                locked_until, last_login, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.name)
        .bind(&account.college)
        .bind(&account.class_name)
        .bind(&account.stream)
        .bind(&account.contact)
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.payment_paid)
        .bind(account.payment_status.as_str())
        .bind(account.failed_login_count as i32)
        .bind(account.locked_until.map(|t| *t.as_datetime()))
        .bind(account.last_login.map(|t| *t.as_datetime()))
        .bind(account.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, name, college, class_name, stream, contact, password_hash,
                   role, payment_paid, payment_status, failed_login_count,
                   locked_until, last_login, created_at
            FROM accounts WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_contact(&self, contact: &str) -> Result<Option<Account>, StoreError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, name, college, class_name, stream, contact, password_hash,
                   role, payment_paid, payment_status, failed_login_count,
                   locked_until, last_login, created_at
            FROM accounts WHERE contact = $1
            "#,
        )
        .bind(contact)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(Account::try_from).transpose()
    }

    async fn update_payment_state(
        &self,
        id: &AccountId,
        paid: bool,
        status: PaymentStatus,
        at: Timestamp,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET payment_paid = $2, payment_status = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(paid)
        .bind(status.as_str())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn update_login_tracking(
        &self,
        id: &AccountId,
        failed_count: u32,
        locked_until: Option<Timestamp>,
        last_login: Option<Timestamp>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET failed_login_count = $2, locked_until = $3, last_login = $4
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(failed_count as i32)
        .bind(locked_until.map(|t| *t.as_datetime()))
        .bind(last_login.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn delete(&self, id: &AccountId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count.max(0) as u64)
    }
}
