//! Error type shared by the authentication flow handlers.

use thiserror::Error;

use crate::domain::foundation::{StoreError, ValidationError};
use crate::domain::security::{PasswordError, SessionError, TokenError};

/// Failures surfaced by registration, login, logout, and request
/// authentication.
///
/// Credential failures are deliberately uniform: an unknown contact and a
/// wrong password both surface as `InvalidCredentials` so responses leak
/// nothing about account existence. A blacklist hit surfaces as the
/// generic `RateLimited` for the same reason.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown contact or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account is locked out; retry after the given duration.
    #[error("account locked, retry in {retry_after_secs} seconds")]
    AccountLocked { retry_after_secs: i64 },

    /// The source address is blocked at the reputation layer.
    #[error("too many requests")]
    RateLimited,

    /// Registration with a contact that is already taken.
    #[error("user with this contact already exists")]
    ContactTaken,

    /// The acting account lacks the required role.
    #[error("forbidden")]
    Forbidden,

    /// A registration field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Bearer-token failure (expired, invalid, revoked).
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Session consistency failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Credential hashing failure.
    #[error("credential hashing failed: {0}")]
    Hashing(String),

    /// Durable store failure, propagated unmodified.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Hashing(err.to_string())
    }
}
