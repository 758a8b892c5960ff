//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the StudentsNet domain.

mod errors;
mod ids;
mod request_context;
mod state_machine;
mod timestamp;

pub use errors::{StoreError, ValidationError};
pub use ids::{AccountId, SessionId, TransactionId};
pub use request_context::RequestContext;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
