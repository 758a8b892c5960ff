//! Per-source-address abuse tracking, blacklist-with-TTL, and an
//! automated-traffic heuristic.
//!
//! The blacklist is a hard block surfaced to callers as a generic
//! rate-limit response; the automation heuristic is advisory and only
//! feeds logging and alerting. Both expire lazily on lookup.

use std::collections::HashMap;

use chrono::Duration;
use tokio::sync::Mutex;

use crate::domain::foundation::Timestamp;

use super::sliding_window::SlidingWindowCounter;

/// Tunables for the reputation monitor.
#[derive(Debug, Clone)]
pub struct IpReputationConfig {
    /// Failures in the rolling window beyond which the address blacklists.
    pub failure_threshold: usize,
    /// How long a blacklisted address stays blocked.
    pub blacklist_duration: Duration,
    /// Rolling window for failure and request tracking.
    pub window: Duration,
    /// Requests in the window above which traffic is inspected for
    /// automation.
    pub request_flood_threshold: usize,
    /// Number of most recent requests sampled for the inter-arrival check.
    pub burst_sample: usize,
    /// Mean inter-arrival time below which the sample reads as automated.
    pub burst_max_mean_gap_secs: f64,
    /// Cap on tracked addresses (least-recently-active eviction).
    pub max_tracked_addresses: usize,
}

impl Default for IpReputationConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 50,
            blacklist_duration: Duration::hours(24),
            window: Duration::hours(1),
            request_flood_threshold: 100,
            burst_sample: 10,
            burst_max_mean_gap_secs: 1.0,
            max_tracked_addresses: 100_000,
        }
    }
}

/// Per-address reputation monitor.
pub struct IpReputationMonitor {
    config: IpReputationConfig,
    failures: SlidingWindowCounter,
    requests: SlidingWindowCounter,
    blacklist: Mutex<HashMap<String, Timestamp>>,
}

impl IpReputationMonitor {
    /// Creates a monitor with the given configuration.
    pub fn new(config: IpReputationConfig) -> Self {
        let failures =
            SlidingWindowCounter::new(config.window).with_max_keys(config.max_tracked_addresses);
        let requests =
            SlidingWindowCounter::new(config.window).with_max_keys(config.max_tracked_addresses);
        Self {
            config,
            failures,
            requests,
            blacklist: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a monitor with default thresholds (50 failures/hour, 24h
    /// blacklist).
    pub fn with_defaults() -> Self {
        Self::new(IpReputationConfig::default())
    }

    /// Records a failed attempt from the address.
    ///
    /// Returns true when this failure pushed the address onto the
    /// blacklist.
    pub async fn record_failure(&self, addr: &str, now: Timestamp) -> bool {
        self.failures.record(addr, now).await;
        let recent = self.failures.count(addr, self.config.window, now).await;

        if recent > self.config.failure_threshold {
            let mut blacklist = self.blacklist.lock().await;
            let newly = !blacklist
                .get(addr)
                .map(|until| now.is_before(until))
                .unwrap_or(false);
            blacklist.insert(addr.to_string(), now.plus(self.config.blacklist_duration));
            return newly;
        }
        false
    }

    /// Returns true while a blacklist entry exists and is in the future.
    ///
    /// Expired entries are cleared on lookup.
    pub async fn is_blacklisted(&self, addr: &str, now: Timestamp) -> bool {
        let mut blacklist = self.blacklist.lock().await;
        match blacklist.get(addr) {
            Some(until) if now.is_before(until) => true,
            Some(_) => {
                blacklist.remove(addr);
                false
            }
            None => false,
        }
    }

    /// Records one inbound request from the address.
    pub async fn record_request(&self, addr: &str, now: Timestamp) {
        self.requests.record(addr, now).await;
    }

    /// Advisory automation heuristic.
    ///
    /// True when the address issued more than the flood threshold of
    /// requests in the rolling window AND the mean inter-arrival time of
    /// its most recent sample is under the configured bound.
    pub async fn is_suspicious_traffic(&self, addr: &str, now: Timestamp) -> bool {
        let total = self.requests.count(addr, self.config.window, now).await;
        if total <= self.config.request_flood_threshold {
            return false;
        }

        let sample = self
            .requests
            .recent(addr, self.config.burst_sample, now)
            .await;
        if sample.len() < 2 {
            return false;
        }

        let gaps: i64 = sample
            .windows(2)
            .map(|pair| pair[1].duration_since(&pair[0]).num_milliseconds())
            .sum();
        let mean_gap_secs = gaps as f64 / 1000.0 / (sample.len() - 1) as f64;

        mean_gap_secs < self.config.burst_max_mean_gap_secs
    }

    /// Failed attempts from the address within the rolling window.
    pub async fn failed_attempts(&self, addr: &str, now: Timestamp) -> usize {
        self.failures.count(addr, self.config.window, now).await
    }
}
