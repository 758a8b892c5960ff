//! End-to-end login defense scenarios: per-account lockout and
//! address-level blacklisting through the full handler stack.

use std::sync::Arc;

use chrono::Duration;
use secrecy::SecretString;

use students_net::adapters::audit::TracingAuditSink;
use students_net::adapters::memory::InMemoryAccountStore;
use students_net::application::handlers::auth::{
    AuthError, LoginCommand, LoginHandler, RegisterCommand, RegisterHandler, TokenTtls,
};
use students_net::domain::foundation::{RequestContext, Timestamp};
use students_net::domain::security::{
    CredentialGuard, CredentialGuardConfig, IpReputationMonitor, SessionGuard, TokenAuthority,
};
use students_net::ports::AccountStore;

struct Stack {
    accounts: Arc<InMemoryAccountStore>,
    guard: Arc<CredentialGuard>,
    reputation: Arc<IpReputationMonitor>,
    register: RegisterHandler,
    login: LoginHandler,
}

fn stack_with(guard_config: CredentialGuardConfig) -> Stack {
    let accounts = Arc::new(InMemoryAccountStore::new());
    let guard = Arc::new(CredentialGuard::new(guard_config));
    let reputation = Arc::new(IpReputationMonitor::with_defaults());
    let tokens = Arc::new(TokenAuthority::new(&SecretString::new(
        "integration-secret-0123456789abcdef".to_string(),
    )));
    let sessions = Arc::new(SessionGuard::with_defaults());
    let audit = Arc::new(TracingAuditSink::new());

    let register = RegisterHandler::new(
        accounts.clone(),
        tokens.clone(),
        sessions.clone(),
        TokenTtls::default(),
    );
    let login = LoginHandler::new(
        accounts.clone(),
        guard.clone(),
        reputation.clone(),
        tokens,
        sessions,
        audit,
        TokenTtls::default(),
    );

    Stack {
        accounts,
        guard,
        reputation,
        register,
        login,
    }
}

fn stack() -> Stack {
    stack_with(CredentialGuardConfig::default())
}

fn ctx(addr: &str) -> RequestContext {
    RequestContext::new(addr, "Mozilla/5.0 (X11; Linux x86_64)")
}

fn register_cmd(contact: &str) -> RegisterCommand {
    RegisterCommand {
        name: "Asha Rao".to_string(),
        college: "City College".to_string(),
        class_name: "2nd Year".to_string(),
        stream: "Science".to_string(),
        contact: contact.to_string(),
        password: "TestPass123".to_string(),
        context: ctx("203.0.113.7"),
    }
}

fn login_cmd(contact: &str, password: &str, addr: &str) -> LoginCommand {
    LoginCommand {
        contact: contact.to_string(),
        password: password.to_string(),
        remember_me: false,
        context: ctx(addr),
    }
}

#[tokio::test]
async fn five_failures_lock_out_even_the_correct_password() {
    let stack = stack();
    stack.register.handle(register_cmd("9876543210")).await.unwrap();

    for i in 1..=5 {
        let result = stack
            .login
            .handle(login_cmd("9876543210", "WrongPass999", "203.0.113.7"))
            .await;
        assert!(
            matches!(result, Err(AuthError::InvalidCredentials)),
            "attempt {} should be invalid credentials",
            i
        );
    }

    // Sixth attempt with the CORRECT password is rejected without a
    // password check.
    let result = stack
        .login
        .handle(login_cmd("9876543210", "TestPass123", "203.0.113.7"))
        .await;
    match result {
        Err(AuthError::AccountLocked { retry_after_secs }) => {
            assert!(retry_after_secs > 0 && retry_after_secs <= 30 * 60);
        }
        other => panic!("expected AccountLocked, got {:?}", other.map(|_| ())),
    }

    // The lockout mirrored into the durable store.
    let stored = stack
        .accounts
        .find_by_contact("9876543210")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.failed_login_count, 5);
    assert!(stored.locked_until.is_some());
}

#[tokio::test]
async fn lockout_expiry_resets_the_counter_and_lets_the_password_through() {
    // An immediately-expiring lockout drives the lazy-expiry transition
    // through the full handler path.
    let stack = stack_with(CredentialGuardConfig {
        lockout_duration: Duration::zero(),
        ..CredentialGuardConfig::default()
    });
    stack.register.handle(register_cmd("9876543210")).await.unwrap();

    for _ in 0..5 {
        let _ = stack
            .login
            .handle(login_cmd("9876543210", "WrongPass999", "203.0.113.7"))
            .await;
    }

    let outcome = stack
        .login
        .handle(login_cmd("9876543210", "TestPass123", "203.0.113.7"))
        .await
        .unwrap();

    assert_eq!(outcome.account.contact, "9876543210");
    assert_eq!(stack.guard.failed_count(&outcome.account.id).await, 0);

    let stored = stack
        .accounts
        .find_by_contact("9876543210")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.failed_login_count, 0);
    assert!(stored.last_login.is_some());
}

#[tokio::test]
async fn lockout_window_elapses_at_the_guard_level() {
    // The 31-minutes-later half of the scenario, driven at the guard with
    // simulated time.
    let guard = CredentialGuard::with_defaults();
    let account = students_net::domain::foundation::AccountId::new();
    let start = Timestamp::from_unix_secs(1_700_000_000);

    for _ in 0..5 {
        guard.record_failure(&account, start).await;
    }
    assert!(guard.check(&account, start.plus_minutes(5)).await.is_err());

    assert!(guard.check(&account, start.plus_minutes(31)).await.is_ok());
    assert_eq!(guard.failed_count(&account).await, 0);
}

#[tokio::test]
async fn flood_of_failures_from_one_address_trips_the_blacklist() {
    let stack = stack();
    stack.register.handle(register_cmd("9876543210")).await.unwrap();

    // Sixty failed attempts from address X against various accounts.
    for i in 0..60 {
        let contact = format!("99999999{:02}", i % 30);
        let result = stack
            .login
            .handle(login_cmd(&contact, "WrongPass999", "198.51.100.9"))
            .await;

        if i < 51 {
            assert!(
                matches!(result, Err(AuthError::InvalidCredentials)),
                "attempt {} should still reach the credential layer",
                i + 1
            );
        } else {
            // Past the threshold the reputation layer rejects first.
            assert!(
                matches!(result, Err(AuthError::RateLimited)),
                "attempt {} should be blocked at the reputation layer",
                i + 1
            );
        }
    }

    assert!(
        stack
            .reputation
            .is_blacklisted("198.51.100.9", Timestamp::now())
            .await
    );

    // A 61st request, even with valid credentials for a real account,
    // never reaches the credential guard.
    let result = stack
        .login
        .handle(login_cmd("9876543210", "TestPass123", "198.51.100.9"))
        .await;
    assert!(matches!(result, Err(AuthError::RateLimited)));

    let registered_account = stack
        .accounts
        .find_by_contact("9876543210")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stack.guard.failed_count(&registered_account.id).await, 0);

    // Other addresses are unaffected.
    let outcome = stack
        .login
        .handle(login_cmd("9876543210", "TestPass123", "203.0.113.7"))
        .await;
    assert!(outcome.is_ok());
}
