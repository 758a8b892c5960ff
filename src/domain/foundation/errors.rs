//! Error types for the domain layer.

use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
        actual: i64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField {
            field: field.into(),
        }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: i64, max: i64, actual: i64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Infrastructure failure in a durable store.
///
/// These are the only conditions the core treats as fatal: an unreachable
/// or misbehaving store is retried or surfaced upward unmodified, never
/// mapped onto a recoverable domain failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or the operation failed mid-flight.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness or integrity constraint rejected the write.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// The stored representation could not be mapped back to a domain type.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Creates an unavailable error with a message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable(message.into())
    }

    /// Creates a constraint violation error with a message.
    pub fn constraint(message: impl Into<String>) -> Self {
        StoreError::Constraint(message.into())
    }

    /// Creates a corrupt record error with a message.
    pub fn corrupt(message: impl Into<String>) -> Self {
        StoreError::Corrupt(message.into())
    }
}
