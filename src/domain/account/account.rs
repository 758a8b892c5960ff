//! Account entity and registration-time validation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, Timestamp, ValidationError};
use crate::domain::payment::PaymentStatus;

/// Role attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Regular registered student.
    Student,
    /// Operator with access to administrative overrides.
    Admin,
}

impl AccountRole {
    /// Returns the string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::Student => "student",
            AccountRole::Admin => "admin",
        }
    }
}

/// A registered user of the platform.
///
/// Payment fields are written only by the payment reconciler; the
/// login-tracking fields mirror the credential guard's in-process state and
/// are persisted best-effort after each attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub college: String,
    pub class_name: String,
    pub stream: String,
    /// Unique contact number used as the login identifier.
    pub contact: String,
    /// Argon2 PHC-format hash of the password.
    pub password_hash: String,
    pub role: AccountRole,
    pub payment_paid: bool,
    pub payment_status: PaymentStatus,
    pub failed_login_count: u32,
    pub locked_until: Option<Timestamp>,
    pub last_login: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl Account {
    /// Creates a freshly registered student account.
    #[allow(clippy::too_many_arguments)]
    pub fn register(
        id: AccountId,
        name: impl Into<String>,
        college: impl Into<String>,
        class_name: impl Into<String>,
        stream: impl Into<String>,
        contact: impl Into<String>,
        password_hash: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            college: college.into(),
            class_name: class_name.into(),
            stream: stream.into(),
            contact: contact.into(),
            password_hash: password_hash.into(),
            role: AccountRole::Student,
            payment_paid: false,
            payment_status: PaymentStatus::Unpaid,
            failed_login_count: 0,
            locked_until: None,
            last_login: None,
            created_at: now,
        }
    }

    /// Returns true if the account carries the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == AccountRole::Admin
    }

    /// Returns true if the membership fee has been credited.
    pub fn has_paid_membership(&self) -> bool {
        self.payment_paid && self.payment_status == PaymentStatus::Paid
    }
}

/// Validates a contact number: 10 to 15 digits after stripping separators.
pub fn validate_contact(contact: &str) -> Result<(), ValidationError> {
    if contact.is_empty() {
        return Err(ValidationError::empty_field("contact"));
    }
    let digits = contact.chars().filter(|c| c.is_ascii_digit()).count();
    if !(10..=15).contains(&digits) {
        return Err(ValidationError::invalid_format(
            "contact",
            "must contain 10 to 15 digits",
        ));
    }
    Ok(())
}
