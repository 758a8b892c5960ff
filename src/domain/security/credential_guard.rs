//! Per-account failed-login tracking and lockout state machine.
//!
//! Each account moves `Open -> Locked -> Open`. Five failures engage a
//! thirty-minute lock; expiry is lazy, applied by the first check at or
//! after the deadline rather than by a background timer. Lockout is
//! per-account, not per-IP: credential stuffing typically rotates source
//! addresses, which the IP reputation monitor handles independently.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::domain::foundation::{AccountId, Timestamp};

use super::sliding_window::SlidingWindowCounter;

/// Tunables for the lockout state machine.
#[derive(Debug, Clone)]
pub struct CredentialGuardConfig {
    /// Failures before the account locks.
    pub max_failed_attempts: u32,
    /// How long an engaged lock lasts.
    pub lockout_duration: Duration,
    /// Retention for the failed-attempt reporting window.
    pub reporting_window: Duration,
}

impl Default for CredentialGuardConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_duration: Duration::minutes(30),
            reporting_window: Duration::hours(1),
        }
    }
}

/// Failure returned while an account is locked.
#[derive(Debug, Clone, Error)]
pub enum CredentialGuardError {
    /// The account is locked; retry after the given duration.
    #[error("account locked, retry in {retry_after_secs} seconds")]
    AccountLocked { retry_after_secs: i64 },
}

/// Outcome of recording one failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutDecision {
    /// Total failures since the last reset, including this one.
    pub failed_count: u32,
    /// True when this failure engaged the lock.
    pub lock_engaged: bool,
}

#[derive(Debug, Default)]
struct GuardState {
    failed_count: u32,
    locked_until: Option<Timestamp>,
    last_login: Option<Timestamp>,
}

/// Per-account lockout guard.
///
/// The lockout decision uses the total failures since the last reset; the
/// sliding window exists for reporting only. A per-account mutex makes
/// concurrent attempts for the same account linearizable while attempts for
/// different accounts proceed independently.
pub struct CredentialGuard {
    config: CredentialGuardConfig,
    attempts: SlidingWindowCounter,
    states: RwLock<HashMap<AccountId, Arc<Mutex<GuardState>>>>,
}

impl CredentialGuard {
    /// Creates a guard with the given configuration.
    pub fn new(config: CredentialGuardConfig) -> Self {
        let attempts = SlidingWindowCounter::new(config.reporting_window);
        Self {
            config,
            attempts,
            states: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a guard with default thresholds (5 failures, 30 minutes).
    pub fn with_defaults() -> Self {
        Self::new(CredentialGuardConfig::default())
    }

    /// Gate to run before the password check.
    ///
    /// While locked and before expiry this fails without touching the
    /// counters. At or past expiry the counters reset and the account
    /// reopens before the password check proceeds.
    pub async fn check(&self, account: &AccountId, now: Timestamp) -> Result<(), CredentialGuardError> {
        let state = self.state_for(account).await;
        let mut state = state.lock().await;

        if let Some(until) = state.locked_until {
            if now.is_before(&until) {
                return Err(CredentialGuardError::AccountLocked {
                    retry_after_secs: until.duration_since(&now).num_seconds(),
                });
            }
            // Lazy expiry: reopen and reset before the password check.
            state.locked_until = None;
            state.failed_count = 0;
        }

        Ok(())
    }

    /// Records a failed login, engaging the lock at the threshold.
    pub async fn record_failure(&self, account: &AccountId, now: Timestamp) -> LockoutDecision {
        self.attempts.record(&account.to_string(), now).await;

        let state = self.state_for(account).await;
        let mut state = state.lock().await;

        state.failed_count += 1;
        let lock_engaged =
            state.locked_until.is_none() && state.failed_count >= self.config.max_failed_attempts;
        if lock_engaged {
            state.locked_until = Some(now.plus(self.config.lockout_duration));
        }

        LockoutDecision {
            failed_count: state.failed_count,
            lock_engaged,
        }
    }

    /// Records a successful login, resetting the failure counter.
    ///
    /// If a lock engaged concurrently between this attempt's gate check and
    /// now, the lock stands and the reset is skipped.
    pub async fn record_success(&self, account: &AccountId, now: Timestamp) {
        let state = self.state_for(account).await;
        let mut state = state.lock().await;

        if let Some(until) = state.locked_until {
            if now.is_before(&until) {
                return;
            }
            state.locked_until = None;
        }
        state.failed_count = 0;
        state.last_login = Some(now);
    }

    /// Failed attempts within the reporting window (read-time pruned).
    pub async fn failed_attempts_in_window(&self, account: &AccountId, now: Timestamp) -> usize {
        self.attempts
            .count(&account.to_string(), self.config.reporting_window, now)
            .await
    }

    /// Current failure count since the last reset.
    pub async fn failed_count(&self, account: &AccountId) -> u32 {
        let state = self.state_for(account).await;
        let state = state.lock().await;
        state.failed_count
    }

    /// Last successful login, if any.
    pub async fn last_login(&self, account: &AccountId) -> Option<Timestamp> {
        let state = self.state_for(account).await;
        let state = state.lock().await;
        state.last_login
    }

    /// Lock deadline currently in force, if any.
    pub async fn locked_until(&self, account: &AccountId) -> Option<Timestamp> {
        let state = self.state_for(account).await;
        let state = state.lock().await;
        state.locked_until
    }

    async fn state_for(&self, account: &AccountId) -> Arc<Mutex<GuardState>> {
        {
            let states = self.states.read().await;
            if let Some(state) = states.get(account) {
                return Arc::clone(state);
            }
        }
        let mut states = self.states.write().await;
        Arc::clone(states.entry(*account).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    // ─── Lock Engagement ─────────────────────────────────────────────

    #[tokio::test]
    async fn open_account_passes_check() {
        let guard = CredentialGuard::with_defaults();
        let account = AccountId::new();

        assert!(guard.check(&account, base()).await.is_ok());
    }

    #[tokio::test]
    async fn fifth_failure_engages_lock() {
        let guard = CredentialGuard::with_defaults();
        let account = AccountId::new();
        let now = base();

        for i in 1..=4 {
            let decision = guard.record_failure(&account, now).await;
            assert_eq!(decision.failed_count, i);
            assert!(!decision.lock_engaged);
        }

        let decision = guard.record_failure(&account, now).await;
        assert_eq!(decision.failed_count, 5);
        assert!(decision.lock_engaged);
    }

    #[tokio::test]
    async fn sixth_attempt_fails_locked_without_password_check() {
        let guard = CredentialGuard::with_defaults();
        let account = AccountId::new();
        let now = base();

        for _ in 0..5 {
            guard.record_failure(&account, now).await;
        }

        let result = guard.check(&account, now.plus_secs(1)).await;
        match result {
            Err(CredentialGuardError::AccountLocked { retry_after_secs }) => {
                assert!(retry_after_secs > 0);
                assert!(retry_after_secs <= 30 * 60);
            }
            Ok(()) => panic!("expected AccountLocked"),
        }
    }

    #[tokio::test]
    async fn locked_attempt_does_not_extend_lock() {
        let guard = CredentialGuard::with_defaults();
        let account = AccountId::new();
        let now = base();

        for _ in 0..5 {
            guard.record_failure(&account, now).await;
        }
        let deadline = guard.locked_until(&account).await.unwrap();

        // Further failures while locked must not push the deadline out.
        guard.record_failure(&account, now.plus_minutes(5)).await;
        assert_eq!(guard.locked_until(&account).await, Some(deadline));
    }

    // ─── Lazy Expiry ─────────────────────────────────────────────────

    #[tokio::test]
    async fn lock_expires_lazily_and_resets_counters() {
        let guard = CredentialGuard::with_defaults();
        let account = AccountId::new();
        let now = base();

        for _ in 0..5 {
            guard.record_failure(&account, now).await;
        }
        assert!(guard.check(&account, now.plus_minutes(29)).await.is_err());

        // Thirty-one minutes later the first check reopens the account.
        let later = now.plus_minutes(31);
        assert!(guard.check(&account, later).await.is_ok());
        assert_eq!(guard.failed_count(&account).await, 0);
        assert!(guard.locked_until(&account).await.is_none());
    }

    #[tokio::test]
    async fn check_at_exact_expiry_reopens() {
        let guard = CredentialGuard::with_defaults();
        let account = AccountId::new();
        let now = base();

        for _ in 0..5 {
            guard.record_failure(&account, now).await;
        }

        let exactly = now.plus_minutes(30);
        assert!(guard.check(&account, exactly).await.is_ok());
    }

    // ─── Success Reset ───────────────────────────────────────────────

    #[tokio::test]
    async fn success_resets_failure_count() {
        let guard = CredentialGuard::with_defaults();
        let account = AccountId::new();
        let now = base();

        guard.record_failure(&account, now).await;
        guard.record_failure(&account, now).await;
        guard.record_success(&account, now.plus_secs(5)).await;

        assert_eq!(guard.failed_count(&account).await, 0);
        assert_eq!(guard.last_login(&account).await, Some(now.plus_secs(5)));
    }

    #[tokio::test]
    async fn success_does_not_clear_active_lock() {
        let guard = CredentialGuard::with_defaults();
        let account = AccountId::new();
        let now = base();

        for _ in 0..5 {
            guard.record_failure(&account, now).await;
        }

        // The lock engaged after this login's gate check; the lock wins.
        guard.record_success(&account, now.plus_secs(1)).await;
        assert!(guard.check(&account, now.plus_secs(2)).await.is_err());
    }

    #[tokio::test]
    async fn failures_resume_counting_after_reset() {
        let guard = CredentialGuard::with_defaults();
        let account = AccountId::new();
        let now = base();

        for _ in 0..4 {
            guard.record_failure(&account, now).await;
        }
        guard.record_success(&account, now).await;

        let decision = guard.record_failure(&account, now.plus_secs(1)).await;
        assert_eq!(decision.failed_count, 1);
        assert!(!decision.lock_engaged);
    }

    // ─── Reporting Window ────────────────────────────────────────────

    #[tokio::test]
    async fn reporting_window_excludes_old_failures() {
        let guard = CredentialGuard::with_defaults();
        let account = AccountId::new();
        let now = base();

        guard.record_failure(&account, now.minus_secs(3700)).await;
        guard.record_failure(&account, now.minus_secs(60)).await;

        assert_eq!(guard.failed_attempts_in_window(&account, now).await, 1);
    }

    // ─── Concurrency ─────────────────────────────────────────────────

    #[tokio::test]
    async fn concurrent_failures_are_all_counted() {
        let guard = Arc::new(CredentialGuard::with_defaults());
        let account = AccountId::new();
        let now = base();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let guard = Arc::clone(&guard);
            handles.push(tokio::spawn(async move {
                guard.record_failure(&account, now).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(guard.failed_count(&account).await, 10);
        assert!(guard.locked_until(&account).await.is_some());
    }

    #[tokio::test]
    async fn accounts_lock_independently() {
        let guard = CredentialGuard::with_defaults();
        let locked = AccountId::new();
        let open = AccountId::new();
        let now = base();

        for _ in 0..5 {
            guard.record_failure(&locked, now).await;
        }

        assert!(guard.check(&locked, now.plus_secs(1)).await.is_err());
        assert!(guard.check(&open, now.plus_secs(1)).await.is_ok());
    }
}
