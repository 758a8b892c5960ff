//! Generic time-windowed event counter keyed by an identifier.
//!
//! Stale entries are filtered at read time: an event older than the
//! retention period is logically absent even before it is physically
//! pruned. Pruning happens in one place, at the top of every read, rather
//! than being repeated at each call site.
//!
//! Keys synchronize independently: the outer map lock is held only long
//! enough to fetch or insert a key's slot, so concurrent record/count calls
//! for different keys never contend on the same mutex.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Duration;
use tokio::sync::{Mutex, RwLock};

use crate::domain::foundation::Timestamp;

/// Default cap on tracked keys before least-recently-active eviction.
const DEFAULT_MAX_KEYS: usize = 100_000;

/// Per-key slot: the recorded timestamps plus an activity marker used for
/// eviction without taking the entry mutex.
struct KeySlot {
    entries: Arc<Mutex<Vec<Timestamp>>>,
    last_active: Arc<AtomicI64>,
}

impl KeySlot {
    fn new(at: Timestamp) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            last_active: Arc::new(AtomicI64::new(at.as_unix_secs())),
        }
    }

    fn touch(&self, at: Timestamp) {
        self.last_active.store(at.as_unix_secs(), Ordering::Relaxed);
    }
}

/// Sliding-window event counter.
///
/// `retention` bounds how long an event can matter; `count` may query any
/// window up to the retention period.
pub struct SlidingWindowCounter {
    retention: Duration,
    max_keys: usize,
    slots: RwLock<HashMap<String, KeySlot>>,
}

impl SlidingWindowCounter {
    /// Creates a counter retaining events for the given period.
    pub fn new(retention: Duration) -> Self {
        Self {
            retention,
            max_keys: DEFAULT_MAX_KEYS,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Caps the number of tracked keys; the least-recently-active key is
    /// evicted when the cap is reached.
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys.max(1);
        self
    }

    /// Records an event for `key` at the given instant.
    pub async fn record(&self, key: &str, at: Timestamp) {
        let entries = {
            let slots = self.slots.read().await;
            match slots.get(key) {
                Some(slot) => {
                    slot.touch(at);
                    Arc::clone(&slot.entries)
                }
                None => {
                    drop(slots);
                    self.insert_slot(key, at).await
                }
            }
        };

        let mut entries = entries.lock().await;
        entries.push(at);
    }

    /// Counts events for `key` within `[now - window, now]`.
    ///
    /// Entries older than the retention period are discarded first; unknown
    /// keys count as zero.
    pub async fn count(&self, key: &str, window: Duration, now: Timestamp) -> usize {
        let entries = {
            let slots = self.slots.read().await;
            match slots.get(key) {
                Some(slot) => Arc::clone(&slot.entries),
                None => return 0,
            }
        };

        let mut entries = entries.lock().await;
        Self::prune_stale(&mut entries, self.retention, now);

        let cutoff = now.plus(-window);
        entries
            .iter()
            .filter(|t| **t >= cutoff && **t <= now)
            .count()
    }

    /// Returns the most recent `n` retained event timestamps for `key`, in
    /// chronological order.
    pub async fn recent(&self, key: &str, n: usize, now: Timestamp) -> Vec<Timestamp> {
        let entries = {
            let slots = self.slots.read().await;
            match slots.get(key) {
                Some(slot) => Arc::clone(&slot.entries),
                None => return Vec::new(),
            }
        };

        let mut entries = entries.lock().await;
        Self::prune_stale(&mut entries, self.retention, now);

        let start = entries.len().saturating_sub(n);
        entries[start..].to_vec()
    }

    /// Drops all recorded events for `key`.
    pub async fn clear(&self, key: &str) {
        let mut slots = self.slots.write().await;
        slots.remove(key);
    }

    /// Number of keys currently tracked.
    pub async fn tracked_keys(&self) -> usize {
        self.slots.read().await.len()
    }

    /// The single prune operation every read goes through.
    fn prune_stale(entries: &mut Vec<Timestamp>, retention: Duration, now: Timestamp) {
        let cutoff = now.plus(-retention);
        entries.retain(|t| *t >= cutoff);
    }

    async fn insert_slot(&self, key: &str, at: Timestamp) -> Arc<Mutex<Vec<Timestamp>>> {
        let mut slots = self.slots.write().await;

        // Re-check: another task may have inserted while we upgraded.
        if let Some(slot) = slots.get(key) {
            slot.touch(at);
            return Arc::clone(&slot.entries);
        }

        if slots.len() >= self.max_keys {
            let evict = slots
                .iter()
                .min_by_key(|(_, slot)| slot.last_active.load(Ordering::Relaxed))
                .map(|(k, _)| k.clone());
            if let Some(k) = evict {
                slots.remove(&k);
            }
        }

        let slot = KeySlot::new(at);
        let entries = Arc::clone(&slot.entries);
        slots.insert(key.to_string(), slot);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000)
    }

    // ─── Basic Counting ───────────────────────────────────────────────

    #[tokio::test]
    async fn unknown_key_counts_zero() {
        let counter = SlidingWindowCounter::new(Duration::hours(1));
        let count = counter.count("nobody", Duration::hours(1), base()).await;
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn counts_events_within_window() {
        let counter = SlidingWindowCounter::new(Duration::hours(1));
        let now = base();

        counter.record("k", now.minus_secs(30)).await;
        counter.record("k", now.minus_secs(10)).await;
        counter.record("k", now).await;

        let count = counter.count("k", Duration::minutes(1), now).await;
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn excludes_events_outside_window() {
        let counter = SlidingWindowCounter::new(Duration::hours(1));
        let now = base();

        counter.record("k", now.minus_secs(120)).await;
        counter.record("k", now.minus_secs(10)).await;

        let count = counter.count("k", Duration::minutes(1), now).await;
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn stale_entries_are_invisible_even_before_pruning() {
        let counter = SlidingWindowCounter::new(Duration::hours(1));
        let now = base();

        counter.record("k", now.minus_secs(3700)).await;
        counter.record("k", now.minus_secs(5)).await;

        // Retention is one hour; the first entry is logically absent.
        let count = counter.count("k", Duration::hours(2), now).await;
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn window_boundary_is_inclusive() {
        let counter = SlidingWindowCounter::new(Duration::hours(1));
        let now = base();

        counter.record("k", now.minus_secs(60)).await;

        let count = counter.count("k", Duration::minutes(1), now).await;
        assert_eq!(count, 1);
    }

    // ─── Recent Entries ──────────────────────────────────────────────

    #[tokio::test]
    async fn recent_returns_latest_entries_in_order() {
        let counter = SlidingWindowCounter::new(Duration::hours(1));
        let now = base();

        for i in 0..5 {
            counter.record("k", now.minus_secs(50 - i * 10)).await;
        }

        let recent = counter.recent("k", 3, now).await;
        assert_eq!(recent.len(), 3);
        assert!(recent[0] < recent[1]);
        assert!(recent[1] < recent[2]);
    }

    #[tokio::test]
    async fn recent_for_unknown_key_is_empty() {
        let counter = SlidingWindowCounter::new(Duration::hours(1));
        let recent = counter.recent("nobody", 10, base()).await;
        assert!(recent.is_empty());
    }

    #[tokio::test]
    async fn recent_caps_at_available_entries() {
        let counter = SlidingWindowCounter::new(Duration::hours(1));
        let now = base();
        counter.record("k", now).await;

        let recent = counter.recent("k", 10, now).await;
        assert_eq!(recent.len(), 1);
    }

    // ─── Key Independence ────────────────────────────────────────────

    #[tokio::test]
    async fn different_keys_count_independently() {
        let counter = SlidingWindowCounter::new(Duration::hours(1));
        let now = base();

        counter.record("a", now).await;
        counter.record("a", now).await;
        counter.record("b", now).await;

        assert_eq!(counter.count("a", Duration::hours(1), now).await, 2);
        assert_eq!(counter.count("b", Duration::hours(1), now).await, 1);
    }

    #[tokio::test]
    async fn clear_drops_only_the_given_key() {
        let counter = SlidingWindowCounter::new(Duration::hours(1));
        let now = base();

        counter.record("a", now).await;
        counter.record("b", now).await;
        counter.clear("a").await;

        assert_eq!(counter.count("a", Duration::hours(1), now).await, 0);
        assert_eq!(counter.count("b", Duration::hours(1), now).await, 1);
    }

    // ─── Concurrency ─────────────────────────────────────────────────

    #[tokio::test]
    async fn concurrent_records_for_same_key_are_all_counted() {
        let counter = Arc::new(SlidingWindowCounter::new(Duration::hours(1)));
        let now = base();

        let mut handles = Vec::new();
        for _ in 0..50 {
            let counter = Arc::clone(&counter);
            handles.push(tokio::spawn(async move {
                counter.record("shared", now).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counter.count("shared", Duration::hours(1), now).await, 50);
    }

    // ─── Eviction ────────────────────────────────────────────────────

    #[tokio::test]
    async fn evicts_least_recently_active_key_at_cap() {
        let counter = SlidingWindowCounter::new(Duration::hours(1)).with_max_keys(2);
        let now = base();

        counter.record("old", now).await;
        counter.record("newer", now.plus_secs(10)).await;
        counter.record("newest", now.plus_secs(20)).await;

        assert_eq!(counter.tracked_keys().await, 2);
        let later = now.plus_secs(30);
        assert_eq!(counter.count("old", Duration::hours(1), later).await, 0);
        assert_eq!(counter.count("newest", Duration::hours(1), later).await, 1);
    }

    // ─── Properties ──────────────────────────────────────────────────

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn count_never_exceeds_recorded_events(
                offsets in prop::collection::vec(0i64..7200, 0..50),
                window_secs in 1i64..7200,
            ) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .build()
                    .unwrap();
                rt.block_on(async {
                    let counter = SlidingWindowCounter::new(Duration::hours(1));
                    let now = base();
                    for offset in &offsets {
                        counter.record("k", now.minus_secs(*offset)).await;
                    }
                    let count = counter
                        .count("k", Duration::seconds(window_secs), now)
                        .await;
                    prop_assert!(count <= offsets.len());

                    // The count also respects both the window and retention.
                    let visible = offsets
                        .iter()
                        .filter(|o| **o <= window_secs.min(3600))
                        .count();
                    prop_assert_eq!(count, visible);
                    Ok(())
                })?;
            }
        }
    }
}
