//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AccountStore` / `TransactionStore` - durable persistence, the source
//!   of truth for account and payment fields
//! - `PaymentGateway` - external checkout session creation and status query
//! - `AuditSink` - destination for security-relevant audit records

mod account_store;
mod audit_sink;
mod payment_gateway;
mod transaction_store;

pub use account_store::AccountStore;
pub use audit_sink::{AuditSeverity, AuditSink, SecurityEvent};
pub use payment_gateway::{GatewayCheckout, GatewayError, GatewaySessionStatus, PaymentGateway};
pub use transaction_store::{CasOutcome, TransactionStore};
