//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("JWT signing secret must be at least 32 characters in production")]
    WeakJwtSecret,

    #[error("Invalid webhook signing secret format")]
    InvalidWebhookSecret,

    #[error("Gateway base URL configured without an API key")]
    MissingGatewayApiKey,

    #[error("Security threshold must be non-zero: {0}")]
    ZeroThreshold(&'static str),
}
