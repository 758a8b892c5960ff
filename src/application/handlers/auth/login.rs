//! LoginHandler - Command handler for the defended login flow.
//!
//! Ordering per request: reputation gate, credential-guard gate, password
//! check, then guard/reputation bookkeeping on the result. A blacklisted
//! address is rejected before the credential guard ever runs.

use std::sync::Arc;

use crate::domain::account::Account;
use crate::domain::foundation::{RequestContext, SessionId, Timestamp};
use crate::domain::security::{
    verify_password, CredentialGuard, CredentialGuardError, IpReputationMonitor, IssuedToken,
    SessionGuard, TokenAuthority, TokenTtls,
};
use crate::ports::{AccountStore, AuditSink, SecurityEvent};

use super::error::AuthError;

/// Command to authenticate with contact and password.
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub contact: String,
    pub password: String,
    /// Selects the extended token lifetime.
    pub remember_me: bool,
    pub context: RequestContext,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub account: Account,
    pub token: IssuedToken,
    pub session_id: SessionId,
}

/// Handler for the login flow.
pub struct LoginHandler {
    accounts: Arc<dyn AccountStore>,
    guard: Arc<CredentialGuard>,
    reputation: Arc<IpReputationMonitor>,
    tokens: Arc<TokenAuthority>,
    sessions: Arc<SessionGuard>,
    audit: Arc<dyn AuditSink>,
    ttls: TokenTtls,
}

impl LoginHandler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        guard: Arc<CredentialGuard>,
        reputation: Arc<IpReputationMonitor>,
        tokens: Arc<TokenAuthority>,
        sessions: Arc<SessionGuard>,
        audit: Arc<dyn AuditSink>,
        ttls: TokenTtls,
    ) -> Self {
        Self {
            accounts,
            guard,
            reputation,
            tokens,
            sessions,
            audit,
            ttls,
        }
    }

    pub async fn handle(&self, cmd: LoginCommand) -> Result<LoginOutcome, AuthError> {
        let now = Timestamp::now();
        let addr = cmd.context.source_addr.as_str();

        // 1. Reputation layer runs before anything touches the account
        self.reputation.record_request(addr, now).await;
        if self.reputation.is_blacklisted(addr, now).await {
            self.audit
                .record(
                    SecurityEvent::BlacklistedRequestRejected {
                        source_addr: addr.to_string(),
                    },
                    now,
                )
                .await;
            return Err(AuthError::RateLimited);
        }
        if self.reputation.is_suspicious_traffic(addr, now).await {
            // Advisory only; the request proceeds.
            self.audit
                .record(
                    SecurityEvent::SuspiciousTraffic {
                        source_addr: addr.to_string(),
                    },
                    now,
                )
                .await;
        }

        // 2. Look up the account; unknown contacts still count as an
        //    address failure and surface as generic invalid credentials
        let account = match self.accounts.find_by_contact(&cmd.contact).await? {
            Some(account) => account,
            None => {
                self.record_address_failure(addr, now).await;
                self.audit
                    .record(
                        SecurityEvent::LoginFailed {
                            contact: cmd.contact.clone(),
                            source_addr: addr.to_string(),
                            failed_count: 0,
                        },
                        now,
                    )
                    .await;
                return Err(AuthError::InvalidCredentials);
            }
        };

        // 3. Lockout gate, before the password check
        if let Err(CredentialGuardError::AccountLocked { retry_after_secs }) =
            self.guard.check(&account.id, now).await
        {
            self.audit
                .record(
                    SecurityEvent::LockedAttemptRejected {
                        account_id: account.id,
                        source_addr: addr.to_string(),
                    },
                    now,
                )
                .await;
            return Err(AuthError::AccountLocked { retry_after_secs });
        }

        // 4. Password check
        if !verify_password(&cmd.password, &account.password_hash)? {
            let decision = self.guard.record_failure(&account.id, now).await;
            self.record_address_failure(addr, now).await;
            self.persist_tracking(&account, now).await?;

            self.audit
                .record(
                    SecurityEvent::LoginFailed {
                        contact: cmd.contact.clone(),
                        source_addr: addr.to_string(),
                        failed_count: decision.failed_count,
                    },
                    now,
                )
                .await;
            if decision.lock_engaged {
                let retry_after_secs = self
                    .guard
                    .locked_until(&account.id)
                    .await
                    .map(|until| until.duration_since(&now).num_seconds())
                    .unwrap_or(0);
                self.audit
                    .record(
                        SecurityEvent::AccountLocked {
                            account_id: account.id,
                            source_addr: addr.to_string(),
                            retry_after_secs,
                        },
                        now,
                    )
                    .await;
            }
            return Err(AuthError::InvalidCredentials);
        }

        // 5. Success: reset counters, issue token, bind session
        self.guard.record_success(&account.id, now).await;
        self.persist_tracking(&account, now).await?;

        let ttl = if cmd.remember_me {
            self.ttls.extended
        } else {
            self.ttls.standard
        };
        let token = self.tokens.issue(&account.id, ttl)?;
        let session_id = self
            .sessions
            .create(account.id, &cmd.context, token.token_id.clone(), now)
            .await;

        self.audit
            .record(
                SecurityEvent::LoginSucceeded {
                    account_id: account.id,
                    source_addr: addr.to_string(),
                },
                now,
            )
            .await;

        Ok(LoginOutcome {
            account,
            token,
            session_id,
        })
    }

    async fn record_address_failure(&self, addr: &str, now: Timestamp) {
        if self.reputation.record_failure(addr, now).await {
            self.audit
                .record(
                    SecurityEvent::AddressBlacklisted {
                        source_addr: addr.to_string(),
                    },
                    now,
                )
                .await;
        }
    }

    /// Mirrors the guard's in-process state onto the durable account row.
    async fn persist_tracking(&self, account: &Account, _now: Timestamp) -> Result<(), AuthError> {
        let failed_count = self.guard.failed_count(&account.id).await;
        let locked_until = self.guard.locked_until(&account.id).await;
        let last_login = self.guard.last_login(&account.id).await;
        self.accounts
            .update_login_tracking(&account.id, failed_count, locked_until, last_login)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryAccountStore;
    use crate::domain::account::Account;
    use crate::domain::foundation::AccountId;
    use crate::domain::security::{hash_password, CredentialGuardConfig};
    use async_trait::async_trait;
    use chrono::Duration;
    use secrecy::SecretString;
    use std::sync::Mutex as StdMutex;

    /// Audit sink that remembers event kinds for assertions.
    #[derive(Default)]
    struct RecordingAuditSink {
        kinds: StdMutex<Vec<&'static str>>,
    }

    impl RecordingAuditSink {
        fn kinds(&self) -> Vec<&'static str> {
            self.kinds.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AuditSink for RecordingAuditSink {
        async fn record(&self, event: SecurityEvent, _at: Timestamp) {
            self.kinds.lock().unwrap().push(event.kind());
        }
    }

    struct Fixture {
        handler: LoginHandler,
        accounts: Arc<InMemoryAccountStore>,
        guard: Arc<CredentialGuard>,
        reputation: Arc<IpReputationMonitor>,
        audit: Arc<RecordingAuditSink>,
        account_id: AccountId,
    }

    async fn fixture_with(guard_config: CredentialGuardConfig) -> Fixture {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let guard = Arc::new(CredentialGuard::new(guard_config));
        let reputation = Arc::new(IpReputationMonitor::with_defaults());
        let tokens = Arc::new(TokenAuthority::new(&SecretString::new(
            "login-test-secret-0123456789abcdef".to_string(),
        )));
        let sessions = Arc::new(SessionGuard::with_defaults());
        let audit = Arc::new(RecordingAuditSink::default());

        let account = Account::register(
            AccountId::new(),
            "Asha Rao",
            "City College",
            "2nd Year",
            "Science",
            "9876543210",
            hash_password("TestPass123").unwrap(),
            Timestamp::now(),
        );
        let account_id = account.id;
        accounts.insert(&account).await.unwrap();

        let handler = LoginHandler::new(
            accounts.clone(),
            guard.clone(),
            reputation.clone(),
            tokens,
            sessions,
            audit.clone(),
            TokenTtls::default(),
        );

        Fixture {
            handler,
            accounts,
            guard,
            reputation,
            audit,
            account_id,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(CredentialGuardConfig::default()).await
    }

    fn login(password: &str) -> LoginCommand {
        LoginCommand {
            contact: "9876543210".to_string(),
            password: password.to_string(),
            remember_me: false,
            context: RequestContext::new("203.0.113.7", "Mozilla/5.0"),
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Happy Path
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn correct_password_logs_in() {
        let f = fixture().await;
        let outcome = f.handler.handle(login("TestPass123")).await.unwrap();

        assert_eq!(outcome.account.id, f.account_id);
        assert!(f.audit.kinds().contains(&"login_succeeded"));
    }

    #[tokio::test]
    async fn remember_me_extends_token_lifetime() {
        let f = fixture().await;
        let mut cmd = login("TestPass123");
        cmd.remember_me = true;

        let outcome = f.handler.handle(cmd).await.unwrap();
        let remaining = outcome
            .token
            .expires_at
            .duration_since(&Timestamp::now())
            .num_hours();

        assert!(remaining > 24 * 6, "expected ~7 days, got {}h", remaining);
    }

    #[tokio::test]
    async fn success_persists_last_login_to_store() {
        let f = fixture().await;
        f.handler.handle(login("TestPass123")).await.unwrap();

        let stored = f.accounts.find_by_id(&f.account_id).await.unwrap().unwrap();
        assert_eq!(stored.failed_login_count, 0);
        assert!(stored.last_login.is_some());
    }

    // ══════════════════════════════════════════════════════════════
    // Failure Accounting
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let f = fixture().await;
        let result = f.handler.handle(login("WrongPass999")).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn unknown_contact_is_also_invalid_credentials() {
        let f = fixture().await;
        let mut cmd = login("TestPass123");
        cmd.contact = "9999999999".to_string();

        let result = f.handler.handle(cmd).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn failures_persist_to_store() {
        let f = fixture().await;
        let _ = f.handler.handle(login("WrongPass999")).await;
        let _ = f.handler.handle(login("WrongPass999")).await;

        let stored = f.accounts.find_by_id(&f.account_id).await.unwrap().unwrap();
        assert_eq!(stored.failed_login_count, 2);
    }

    // ══════════════════════════════════════════════════════════════
    // Lockout Scenario
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn sixth_attempt_with_correct_password_is_locked() {
        let f = fixture().await;

        for _ in 0..5 {
            let result = f.handler.handle(login("WrongPass999")).await;
            assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        }

        let result = f.handler.handle(login("TestPass123")).await;
        assert!(matches!(result, Err(AuthError::AccountLocked { .. })));

        let kinds = f.audit.kinds();
        assert!(kinds.contains(&"account_locked"));
        assert!(kinds.contains(&"locked_attempt_rejected"));

        let stored = f.accounts.find_by_id(&f.account_id).await.unwrap().unwrap();
        assert!(stored.locked_until.is_some());
    }

    #[tokio::test]
    async fn lock_expiry_allows_correct_password_and_resets_count() {
        // Zero-duration lockout: the lock engages and is immediately past
        // its deadline, exercising the full lazy-expiry path in-handler.
        let f = fixture_with(CredentialGuardConfig {
            lockout_duration: Duration::zero(),
            ..CredentialGuardConfig::default()
        })
        .await;

        for _ in 0..5 {
            let _ = f.handler.handle(login("WrongPass999")).await;
        }

        let outcome = f.handler.handle(login("TestPass123")).await.unwrap();
        assert_eq!(outcome.account.id, f.account_id);
        assert_eq!(f.guard.failed_count(&f.account_id).await, 0);

        let stored = f.accounts.find_by_id(&f.account_id).await.unwrap().unwrap();
        assert_eq!(stored.failed_login_count, 0);
        assert!(stored.locked_until.is_none());
    }

    // ══════════════════════════════════════════════════════════════
    // Reputation Layer
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn blacklisted_address_is_rejected_before_credential_guard() {
        let f = fixture().await;
        let now = Timestamp::now();

        // Blacklist the address directly at the reputation layer.
        for _ in 0..51 {
            f.reputation.record_failure("203.0.113.7", now).await;
        }

        let result = f.handler.handle(login("TestPass123")).await;
        assert!(matches!(result, Err(AuthError::RateLimited)));

        // The credential guard never saw the attempt.
        assert_eq!(f.guard.failed_count(&f.account_id).await, 0);
        assert!(f.audit.kinds().contains(&"blacklisted_request_rejected"));
    }

    #[tokio::test]
    async fn failed_logins_feed_the_reputation_monitor() {
        let f = fixture().await;
        let _ = f.handler.handle(login("WrongPass999")).await;

        let count = f
            .reputation
            .failed_attempts("203.0.113.7", Timestamp::now())
            .await;
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn unknown_contact_failures_blacklist_the_address() {
        let f = fixture().await;

        for _ in 0..51 {
            let mut cmd = login("whatever1");
            cmd.contact = "9999999999".to_string();
            let _ = f.handler.handle(cmd).await;
        }

        assert!(f.audit.kinds().contains(&"address_blacklisted"));
        let result = f.handler.handle(login("TestPass123")).await;
        assert!(matches!(result, Err(AuthError::RateLimited)));
    }
}
