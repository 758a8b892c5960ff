//! Payment gateway adapters: the production HTTP client and a mock double.

mod http_client;
mod mock;

pub use http_client::HttpPaymentGateway;
pub use mock::MockPaymentGateway;
