//! StudentsNet backend binary.
//!
//! Loads configuration, constructs the security core and stores, and
//! serves the API. With no database URL configured the in-memory stores
//! are used, which is only meaningful for development.

use std::net::SocketAddr;
use std::sync::Arc;

use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use students_net::adapters::audit::TracingAuditSink;
use students_net::adapters::gateway::{HttpPaymentGateway, MockPaymentGateway};
use students_net::adapters::http::{app, AppState};
use students_net::adapters::memory::{InMemoryAccountStore, InMemoryTransactionStore};
use students_net::adapters::postgres::{PostgresAccountStore, PostgresTransactionStore};
use students_net::config::AppConfig;
use students_net::domain::payment::PaymentReconciler;
use students_net::domain::security::{
    CredentialGuard, IpReputationMonitor, SessionGuard, TokenAuthority,
};
use students_net::ports::{AccountStore, PaymentGateway, TransactionStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    // Durable stores: PostgreSQL when configured, in-memory otherwise.
    let (accounts, transactions): (Arc<dyn AccountStore>, Arc<dyn TransactionStore>) =
        match &config.database.url {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.database.max_connections)
                    .min_connections(config.database.min_connections)
                    .connect(url)
                    .await?;
                tracing::info!("connected to PostgreSQL");
                (
                    Arc::new(PostgresAccountStore::new(pool.clone())),
                    Arc::new(PostgresTransactionStore::new(pool)),
                )
            }
            None => {
                tracing::warn!("no database configured, using in-memory stores");
                (
                    Arc::new(InMemoryAccountStore::new()),
                    Arc::new(InMemoryTransactionStore::new()),
                )
            }
        };

    // Payment gateway: the HTTP client when configured, a mock otherwise.
    let gateway: Arc<dyn PaymentGateway> = match (
        &config.payment.gateway_base_url,
        &config.payment.gateway_api_key,
    ) {
        (Some(base_url), Some(api_key)) => Arc::new(HttpPaymentGateway::new(
            base_url.clone(),
            secrecy::SecretString::new(api_key.expose_secret().clone()),
        )?),
        _ => {
            tracing::warn!("no gateway configured, using mock payment gateway");
            Arc::new(MockPaymentGateway::new())
        }
    };

    // Security core: explicit state objects owned by this instance.
    let credential_guard = Arc::new(CredentialGuard::new(
        config.security.credential_guard_config(),
    ));
    let reputation = Arc::new(IpReputationMonitor::new(
        config.security.ip_reputation_config(),
    ));
    let tokens = Arc::new(TokenAuthority::new(&config.auth.jwt_secret));
    let sessions = Arc::new(SessionGuard::new(config.security.consistency_policy()));
    let reconciler = Arc::new(PaymentReconciler::new(
        accounts.clone(),
        transactions.clone(),
        config.security.evidence_policy(),
    ));

    let state = AppState {
        accounts,
        transactions,
        gateway,
        audit: Arc::new(TracingAuditSink::new()),
        credential_guard,
        reputation,
        tokens,
        sessions,
        reconciler,
        webhook_secret: config.payment.webhook_secret.clone(),
        token_ttls: config.auth.token_ttls(),
        membership_fee_minor: config.payment.membership_fee_minor,
        currency: config.payment.currency.clone(),
    };

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, "starting StudentsNet API");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
