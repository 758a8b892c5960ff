//! Security core - brute-force defense, token lifecycle, and session
//! consistency.
//!
//! All state here is in-process and owned by explicitly constructed
//! objects handed to request handlers; nothing is ambient. The durable
//! store remains the source of truth for account fields, so these caches
//! may be rebuilt or lost on restart without breaking correctness.

mod credential_guard;
mod ip_reputation;
mod password;
mod session_guard;
mod sliding_window;
mod token_authority;

pub use credential_guard::{
    CredentialGuard, CredentialGuardConfig, CredentialGuardError, LockoutDecision,
};
pub use ip_reputation::{IpReputationConfig, IpReputationMonitor};
pub use password::{hash_password, validate_password_policy, verify_password, PasswordError};
pub use session_guard::{ConsistencyPolicy, SessionError, SessionGuard, SessionRecord};
pub use sliding_window::SlidingWindowCounter;
pub use token_authority::{IssuedToken, RevokedToken, TokenAuthority, TokenError, TokenTtls};
