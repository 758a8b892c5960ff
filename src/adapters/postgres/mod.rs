//! PostgreSQL adapters for the durable store ports.

mod account_store;
mod transaction_store;

pub use account_store::PostgresAccountStore;
pub use transaction_store::PostgresTransactionStore;
