//! In-memory result cache with a fixed TTL
//!
//! Entries expire a fixed time after insertion. Expiry is checked on read
//! and by an optional background reaper that bounds memory.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::types::{CacheStats, ExtractionResult};

/// Default entry lifetime (5 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
/// Default period between reaper sweeps
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(60);

/// Shortest reaper period; `tokio::time::interval` rejects zero
const MIN_REAP_INTERVAL: Duration = Duration::from_millis(1);

/// Stand-in deadline for lifetimes too long to represent (about 30 years)
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + lifetime`, saturating to a far-future deadline on overflow
pub(crate) fn deadline_after(now: Instant, lifetime: Duration) -> Instant {
    now.checked_add(lifetime)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

struct CacheEntry {
    result: Arc<ExtractionResult>,
    expires_at: Instant,
}

/// Extraction results keyed by tweet identifier
pub struct ResultCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    /// Create a cache with the default 5 minute TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    /// Create a cache with a custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a result; expired entries count as a miss and are removed
    pub fn get(&self, tweet_id: &str) -> Option<Arc<ExtractionResult>> {
        let now = Instant::now();

        {
            let entries = self.entries.read();
            match entries.get(tweet_id) {
                Some(entry) if now < entry.expires_at => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(Arc::clone(&entry.result));
                }
                Some(_) => {}
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
            }
        }

        // Expired: re-check under the write lock, a fresh put may have landed
        let mut entries = self.entries.write();
        if let Some(entry) = entries.get(tweet_id)
            && now < entry.expires_at
        {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Some(Arc::clone(&entry.result));
        }
        entries.remove(tweet_id);
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a result, replacing any previous entry for the same tweet
    pub fn put(&self, tweet_id: impl Into<String>, result: Arc<ExtractionResult>) {
        let entry = CacheEntry {
            result,
            expires_at: deadline_after(Instant::now(), self.ttl),
        };
        self.entries.write().insert(tweet_id.into(), entry);
    }

    /// Remove every entry regardless of TTL
    pub fn flush(&self) {
        self.entries.write().clear();
    }

    /// Current entry count and hit/miss counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entries.read().len(),
            hit_count: self.hits.load(Ordering::Relaxed),
            miss_count: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Remove every expired entry, returning how many were removed
    pub fn reap_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| now < entry.expires_at);
        before - entries.len()
    }

    /// Run [`ResultCache::reap_expired`] every `period` on a background task
    ///
    /// The task runs until aborted or the runtime shuts down. A zero
    /// `period` is raised to one millisecond.
    pub fn spawn_reaper(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        let period = period.max(MIN_REAP_INTERVAL);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.reap_expired();
                if removed > 0 {
                    debug!(removed, "Reaped expired cache entries");
                }
            }
        })
    }
}
