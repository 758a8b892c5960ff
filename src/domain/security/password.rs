//! Credential hashing and the server-side password rule.
//!
//! Hashes are Argon2id in PHC string format. Verification treats an
//! unparseable stored hash as an error rather than a mismatch so corrupt
//! records surface instead of silently rejecting logins.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

use crate::domain::foundation::ValidationError;

/// Failure while hashing or parsing a stored hash.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("credential hashing failed: {0}")]
    Hash(String),
}

/// Hashes a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verifies a password against a stored PHC-format hash.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Server-side password rule applied at registration.
///
/// 8 to 128 characters with at least one letter and one digit.
pub fn validate_password_policy(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::empty_field("password"));
    }
    if password.chars().count() < 8 {
        return Err(ValidationError::invalid_format(
            "password",
            "must be at least 8 characters",
        ));
    }
    if password.chars().count() > 128 {
        return Err(ValidationError::invalid_format("password", "too long"));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::invalid_format(
            "password",
            "must contain at least one letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::invalid_format(
            "password",
            "must contain at least one number",
        ));
    }
    Ok(())
}
