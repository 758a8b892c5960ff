//! Shared application state for the HTTP surface.

use std::sync::Arc;

use secrecy::SecretString;

use crate::application::handlers::auth::{
    AuthenticateHandler, DeleteAccountHandler, LoginHandler, LogoutHandler, RegisterHandler,
    TokenTtls,
};
use crate::application::handlers::payment::{
    AdminOverrideHandler, CheckGatewayStatusHandler, CreateGatewaySessionHandler,
    HandleGatewayWebhookHandler, RejectEvidenceHandler, SubmitEvidenceHandler,
};
use crate::domain::payment::{GatewayWebhookVerifier, PaymentReconciler};
use crate::domain::security::{CredentialGuard, IpReputationMonitor, SessionGuard, TokenAuthority};
use crate::ports::{AccountStore, AuditSink, PaymentGateway, TransactionStore};

/// Shared application state containing all dependencies.
///
/// Cloned per request; everything inside is Arc-wrapped. The security
/// components are constructed once at startup and owned here, never
/// ambient process globals.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub transactions: Arc<dyn TransactionStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub audit: Arc<dyn AuditSink>,
    pub credential_guard: Arc<CredentialGuard>,
    pub reputation: Arc<IpReputationMonitor>,
    pub tokens: Arc<TokenAuthority>,
    pub sessions: Arc<SessionGuard>,
    pub reconciler: Arc<PaymentReconciler>,
    pub webhook_secret: SecretString,
    pub token_ttls: TokenTtls,
    pub membership_fee_minor: i64,
    pub currency: String,
}

impl AppState {
    /// Create handlers on demand from the shared state.
    pub fn register_handler(&self) -> RegisterHandler {
        RegisterHandler::new(
            self.accounts.clone(),
            self.tokens.clone(),
            self.sessions.clone(),
            self.token_ttls,
        )
    }

    pub fn login_handler(&self) -> LoginHandler {
        LoginHandler::new(
            self.accounts.clone(),
            self.credential_guard.clone(),
            self.reputation.clone(),
            self.tokens.clone(),
            self.sessions.clone(),
            self.audit.clone(),
            self.token_ttls,
        )
    }

    pub fn logout_handler(&self) -> LogoutHandler {
        LogoutHandler::new(self.tokens.clone(), self.sessions.clone(), self.audit.clone())
    }

    pub fn authenticate_handler(&self) -> AuthenticateHandler {
        AuthenticateHandler::new(self.tokens.clone(), self.sessions.clone(), self.audit.clone())
    }

    pub fn delete_account_handler(&self) -> DeleteAccountHandler {
        DeleteAccountHandler::new(self.accounts.clone())
    }

    pub fn create_session_handler(&self) -> CreateGatewaySessionHandler {
        CreateGatewaySessionHandler::new(
            self.gateway.clone(),
            self.reconciler.clone(),
            self.membership_fee_minor,
            self.currency.clone(),
        )
    }

    pub fn check_status_handler(&self) -> CheckGatewayStatusHandler {
        CheckGatewayStatusHandler::new(self.gateway.clone(), self.reconciler.clone())
    }

    pub fn webhook_handler(&self) -> HandleGatewayWebhookHandler {
        HandleGatewayWebhookHandler::new(
            GatewayWebhookVerifier::new(self.webhook_secret.clone()),
            self.reconciler.clone(),
            self.audit.clone(),
        )
    }

    pub fn submit_evidence_handler(&self) -> SubmitEvidenceHandler {
        SubmitEvidenceHandler::new(
            self.reconciler.clone(),
            self.membership_fee_minor,
            self.currency.clone(),
        )
    }

    pub fn admin_override_handler(&self) -> AdminOverrideHandler {
        AdminOverrideHandler::new(
            self.accounts.clone(),
            self.reconciler.clone(),
            self.audit.clone(),
            self.membership_fee_minor,
            self.currency.clone(),
        )
    }

    pub fn reject_evidence_handler(&self) -> RejectEvidenceHandler {
        RejectEvidenceHandler::new(self.accounts.clone(), self.reconciler.clone())
    }
}
