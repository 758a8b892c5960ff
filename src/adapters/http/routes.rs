//! Axum router for the API surface.

use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::admin;
use super::auth;
use super::payment;
use super::state::AppState;

/// Create the API router.
///
/// # Routes
///
/// ## Auth (client context captured for all three)
/// - `POST /api/register` - create an account and log it in
/// - `POST /api/login` - defended login flow
/// - `POST /api/logout` - revoke the bearer token and its sessions
///
/// ## Payment (require authentication)
/// - `POST /api/payment/create-session` - start a gateway checkout
/// - `GET /api/payment/status/:session_id` - status poll (idempotent credit)
/// - `POST /api/payment/evidence` - manual evidence submission
///
/// ## Admin (require authentication + admin role)
/// - `POST /api/admin/payment-override` - override payment state
/// - `POST /api/admin/evidence/:transaction_id/reject` - reject evidence
/// - `DELETE /api/admin/accounts/:account_id` - delete an account
///
/// ## Webhook (no bearer auth, signature verified)
/// - `POST /api/webhooks/gateway` - gateway payment events
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/payment/create-session", post(payment::create_session))
        .route("/payment/status/:session_id", get(payment::session_status))
        .route("/payment/evidence", post(payment::submit_evidence))
        .route("/admin/payment-override", post(admin::payment_override))
        .route(
            "/admin/evidence/:transaction_id/reject",
            post(admin::reject_evidence),
        )
        .route("/admin/accounts/:account_id", delete(admin::delete_account))
        .route("/webhooks/gateway", post(payment::gateway_webhook))
}

/// Assemble the full application with middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::audit::TracingAuditSink;
    use crate::adapters::gateway::MockPaymentGateway;
    use crate::adapters::memory::{InMemoryAccountStore, InMemoryTransactionStore};
    use crate::application::handlers::auth::TokenTtls;
    use crate::domain::payment::{EvidencePolicy, PaymentReconciler};
    use crate::domain::security::{
        CredentialGuard, IpReputationMonitor, SessionGuard, TokenAuthority,
    };
    use secrecy::SecretString;
    use std::sync::Arc;

    fn test_state() -> AppState {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let transactions = Arc::new(InMemoryTransactionStore::new());
        let reconciler = Arc::new(PaymentReconciler::new(
            accounts.clone(),
            transactions.clone(),
            EvidencePolicy::default(),
        ));

        AppState {
            accounts,
            transactions,
            gateway: Arc::new(MockPaymentGateway::new()),
            audit: Arc::new(TracingAuditSink::new()),
            credential_guard: Arc::new(CredentialGuard::with_defaults()),
            reputation: Arc::new(IpReputationMonitor::with_defaults()),
            tokens: Arc::new(TokenAuthority::new(&SecretString::new(
                "routes-test-secret-0123456789abcdef".to_string(),
            ))),
            sessions: Arc::new(SessionGuard::with_defaults()),
            reconciler,
            webhook_secret: SecretString::new("whsec_routes_test".to_string()),
            token_ttls: TokenTtls::default(),
            membership_fee_minor: 49900,
            currency: "INR".to_string(),
        }
    }

    #[test]
    fn api_routes_assemble_without_panicking() {
        let router = api_routes();
        let _: Router = router.with_state(test_state());
    }

    #[test]
    fn app_assembles_with_middleware() {
        let _ = app(test_state());
    }
}
