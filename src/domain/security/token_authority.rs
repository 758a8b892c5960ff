//! Bearer-token issuance, validation, and revocation.
//!
//! Tokens are HS256 JWTs carrying the account id, a unique token id (jti),
//! and an absolute expiry. Revocation inserts the jti into an in-process
//! set retained only until the token's natural expiry, pruned lazily on
//! insert and lookup. The set is a cache, not a source of truth: a process
//! restart forgets prior revocations.

use std::collections::HashMap;

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::foundation::{AccountId, Timestamp};

/// Token validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The embedded expiry has passed.
    #[error("token has expired")]
    Expired,

    /// The token is malformed or its signature does not verify.
    #[error("invalid token")]
    Invalid,

    /// The token was revoked before its natural expiry.
    #[error("token has been revoked")]
    Revoked,

    /// Signing failed while issuing (infrastructure condition).
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Claims embedded in an issued token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Account identifier.
    sub: String,
    /// Unique token identifier, the unit of revocation.
    jti: String,
    /// Issued-at, Unix seconds.
    iat: i64,
    /// Expiry, Unix seconds.
    exp: i64,
}

/// Token lifetimes the caller chooses between at issuance.
#[derive(Debug, Clone, Copy)]
pub struct TokenTtls {
    /// Standard session duration.
    pub standard: Duration,
    /// Extended "remember me" duration.
    pub extended: Duration,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            standard: Duration::hours(24),
            extended: Duration::days(7),
        }
    }
}

/// A freshly issued token together with its identifiers.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The signed compact JWT.
    pub token: String,
    /// The jti claim, used for revocation and session binding.
    pub token_id: String,
    /// Absolute expiry of the token.
    pub expires_at: Timestamp,
}

/// Result of revoking a token.
#[derive(Debug, Clone)]
pub struct RevokedToken {
    /// The jti that entered the revocation set.
    pub token_id: String,
    /// The token's original expiry; the entry is pruned once it passes.
    pub expires_at: Timestamp,
}

/// Issues, validates, and revokes bearer tokens.
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    revoked: Mutex<HashMap<String, Timestamp>>,
}

impl TokenAuthority {
    /// Creates an authority signing with the given secret.
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            revoked: Mutex::new(HashMap::new()),
        }
    }

    /// Issues a token for the account, valid for `ttl` from now.
    ///
    /// The caller selects the ttl: standard session or extended
    /// remember-me duration.
    pub fn issue(&self, account_id: &AccountId, ttl: Duration) -> Result<IssuedToken, TokenError> {
        self.issue_at(account_id, ttl, Timestamp::now())
    }

    /// Issues a token with an explicit issued-at instant.
    pub fn issue_at(
        &self,
        account_id: &AccountId,
        ttl: Duration,
        issued_at: Timestamp,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = issued_at.plus(ttl);
        let claims = Claims {
            sub: account_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: issued_at.as_unix_secs(),
            exp: expires_at.as_unix_secs(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken {
            token,
            token_id: claims.jti,
            expires_at,
        })
    }

    /// Validates a token and returns the embedded account id.
    ///
    /// Fails `Expired` past the embedded expiry, `Invalid` when the
    /// signature does not verify or the token is malformed, and `Revoked`
    /// when the jti sits in the non-expired revocation set.
    pub async fn validate(&self, token: &str) -> Result<AccountId, TokenError> {
        let claims = self.decode_claims(token, true)?;

        {
            let mut revoked = self.revoked.lock().await;
            Self::prune_expired(&mut revoked, Timestamp::now());
            if revoked.contains_key(&claims.jti) {
                return Err(TokenError::Revoked);
            }
        }

        claims.sub.parse().map_err(|_| TokenError::Invalid)
    }

    /// Inserts the token into the revocation set.
    ///
    /// The entry is retained only until the token's own expiry. Revoking
    /// an already-expired token is a no-op that still succeeds: the token
    /// can never validate again either way.
    pub async fn revoke(&self, token: &str) -> Result<RevokedToken, TokenError> {
        // Expiry is irrelevant for revocation; the signature still must
        // verify so an attacker cannot poison the set.
        let claims = self.decode_claims(token, false)?;
        let expires_at = Timestamp::from_unix_secs(claims.exp);

        let mut revoked = self.revoked.lock().await;
        Self::prune_expired(&mut revoked, Timestamp::now());
        revoked.insert(claims.jti.clone(), expires_at);

        Ok(RevokedToken {
            token_id: claims.jti,
            expires_at,
        })
    }

    /// Number of entries currently held in the revocation set.
    pub async fn revoked_count(&self) -> usize {
        self.revoked.lock().await.len()
    }

    fn decode_claims(&self, token: &str, validate_exp: bool) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = validate_exp;
        if !validate_exp {
            validation.required_spec_claims.clear();
        }

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }

    fn prune_expired(revoked: &mut HashMap<String, Timestamp>, now: Timestamp) {
        revoked.retain(|_, expires_at| now.is_before(expires_at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority() -> TokenAuthority {
        TokenAuthority::new(&SecretString::new(
            "test-signing-secret-0123456789abcdef".to_string(),
        ))
    }

    // ─── Round Trip ──────────────────────────────────────────────────

    #[tokio::test]
    async fn validate_returns_account_id_for_fresh_token() {
        let authority = authority();
        let account = AccountId::new();

        let issued = authority.issue(&account, Duration::hours(24)).unwrap();
        let validated = authority.validate(&issued.token).await.unwrap();

        assert_eq!(validated, account);
    }

    #[tokio::test]
    async fn issued_token_carries_expiry() {
        let authority = authority();
        let issued_at = Timestamp::from_unix_secs(1_700_000_000);

        let issued = authority
            .issue_at(&AccountId::new(), Duration::hours(24), issued_at)
            .unwrap();

        assert_eq!(
            issued.expires_at.as_unix_secs(),
            issued_at.as_unix_secs() + 24 * 3600
        );
    }

    #[tokio::test]
    async fn distinct_tokens_get_distinct_ids() {
        let authority = authority();
        let account = AccountId::new();

        let a = authority.issue(&account, Duration::hours(1)).unwrap();
        let b = authority.issue(&account, Duration::hours(1)).unwrap();

        assert_ne!(a.token_id, b.token_id);
    }

    // ─── Expiry ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn expired_token_fails_expired() {
        let authority = authority();
        let past = Timestamp::now().minus_secs(7200);

        let issued = authority
            .issue_at(&AccountId::new(), Duration::hours(1), past)
            .unwrap();

        let result = authority.validate(&issued.token).await;
        assert_eq!(result, Err(TokenError::Expired));
    }

    // ─── Malformed / Tampered ────────────────────────────────────────

    #[tokio::test]
    async fn garbage_token_fails_invalid() {
        let authority = authority();
        let result = authority.validate("not-a-jwt").await;
        assert_eq!(result, Err(TokenError::Invalid));
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_fails_invalid() {
        let issuer = TokenAuthority::new(&SecretString::new("secret-one".to_string()));
        let verifier = TokenAuthority::new(&SecretString::new("secret-two".to_string()));

        let issued = issuer.issue(&AccountId::new(), Duration::hours(1)).unwrap();
        let result = verifier.validate(&issued.token).await;

        assert_eq!(result, Err(TokenError::Invalid));
    }

    #[tokio::test]
    async fn tampered_payload_fails_invalid() {
        let authority = authority();
        let issued = authority.issue(&AccountId::new(), Duration::hours(1)).unwrap();

        let mut parts: Vec<&str> = issued.token.split('.').collect();
        let tampered_payload = "eyJzdWIiOiJvdGhlciJ9";
        parts[1] = tampered_payload;
        let tampered = parts.join(".");

        let result = authority.validate(&tampered).await;
        assert_eq!(result, Err(TokenError::Invalid));
    }

    // ─── Revocation ──────────────────────────────────────────────────

    #[tokio::test]
    async fn revoked_token_fails_revoked_before_expiry() {
        let authority = authority();
        let issued = authority.issue(&AccountId::new(), Duration::hours(24)).unwrap();

        let revoked = authority.revoke(&issued.token).await.unwrap();
        assert_eq!(revoked.token_id, issued.token_id);

        let result = authority.validate(&issued.token).await;
        assert_eq!(result, Err(TokenError::Revoked));
    }

    #[tokio::test]
    async fn revoking_does_not_affect_other_tokens() {
        let authority = authority();
        let account = AccountId::new();
        let revoked = authority.issue(&account, Duration::hours(1)).unwrap();
        let live = authority.issue(&account, Duration::hours(1)).unwrap();

        authority.revoke(&revoked.token).await.unwrap();

        assert_eq!(
            authority.validate(&revoked.token).await,
            Err(TokenError::Revoked)
        );
        assert_eq!(authority.validate(&live.token).await, Ok(account));
    }

    #[tokio::test]
    async fn revoking_foreign_token_fails_invalid() {
        let issuer = TokenAuthority::new(&SecretString::new("secret-one".to_string()));
        let authority = TokenAuthority::new(&SecretString::new("secret-two".to_string()));

        let foreign = issuer.issue(&AccountId::new(), Duration::hours(1)).unwrap();
        let result = authority.revoke(&foreign.token).await;

        assert!(matches!(result, Err(TokenError::Invalid)));
    }

    #[tokio::test]
    async fn revocation_set_prunes_entries_past_their_expiry() {
        let authority = authority();

        // Already expired when revoked: pruned on the next insert.
        let stale = authority
            .issue_at(
                &AccountId::new(),
                Duration::hours(1),
                Timestamp::now().minus_secs(7200),
            )
            .unwrap();
        authority.revoke(&stale.token).await.unwrap();

        let live = authority.issue(&AccountId::new(), Duration::hours(1)).unwrap();
        authority.revoke(&live.token).await.unwrap();

        assert_eq!(authority.revoked_count().await, 1);
    }

    #[tokio::test]
    async fn expired_then_revoked_token_still_fails_expired_on_validate() {
        let authority = authority();
        let stale = authority
            .issue_at(
                &AccountId::new(),
                Duration::hours(1),
                Timestamp::now().minus_secs(7200),
            )
            .unwrap();

        authority.revoke(&stale.token).await.unwrap();

        // Expiry is checked before the revocation set.
        assert_eq!(
            authority.validate(&stale.token).await,
            Err(TokenError::Expired)
        );
    }
}
