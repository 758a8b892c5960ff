//! Thin HTTP surface over the application handlers.
//!
//! Only the security-relevant endpoints live here; routine profile and
//! listing CRUD is a separate concern. Handlers translate between JSON
//! DTOs and application commands and never touch domain state directly.

mod admin;
mod auth;
mod context;
mod error;
mod payment;
mod routes;
mod state;

pub use context::{Authenticated, BearerAuth, ClientContext, SESSION_HEADER};
pub use error::{ApiError, ErrorBody};
pub use payment::GATEWAY_SIGNATURE_HEADER;
pub use routes::{api_routes, app};
pub use state::AppState;
