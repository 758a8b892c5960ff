//! Authentication configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::domain::security::TokenTtls;

/// Authentication configuration (JWT signing, token lifetimes)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret for bearer tokens
    pub jwt_secret: SecretString,

    /// Standard session token lifetime in hours
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    /// Extended "remember me" token lifetime in days
    #[serde(default = "default_remember_me_ttl_days")]
    pub remember_me_ttl_days: i64,
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_remember_me_ttl_days() -> i64 {
    7
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::new(String::new()),
            token_ttl_hours: default_token_ttl_hours(),
            remember_me_ttl_days: default_remember_me_ttl_days(),
        }
    }
}

impl AuthConfig {
    /// Token lifetimes for the login flow
    pub fn token_ttls(&self) -> TokenTtls {
        TokenTtls {
            standard: chrono::Duration::hours(self.token_ttl_hours),
            extended: chrono::Duration::days(self.remember_me_ttl_days),
        }
    }

    /// Validate authentication configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.jwt_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH_JWT_SECRET"));
        }
        if *environment == Environment::Production && secret.len() < 32 {
            return Err(ValidationError::WeakJwtSecret);
        }
        if self.token_ttl_hours <= 0 || self.remember_me_ttl_days <= 0 {
            return Err(ValidationError::ZeroThreshold("token lifetime"));
        }
        Ok(())
    }
}
