//! In-memory TTL store for serialized response payloads
//!
//! Entries are independent key/value pairs with no cross-key invariants.
//! Expired entries behave as misses on lookup and are reaped by an optional
//! background sweep task. Handles are cheap to clone and share one
//! underlying map, so several clients cache together only when wired to the
//! same store.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Shared TTL-expiring byte store.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    stats: Arc<RwLock<CacheStats>>,
}

#[derive(Debug)]
struct CacheEntry {
    payload: Vec<u8>,
    expires_at: Instant,
}

/// Store counters.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

impl MemoryCache {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a payload. An expired entry behaves as a miss and is removed.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => {
                    let mut stats = self.stats.write();
                    stats.hits += 1;
                    debug!("cache HIT key={}", key);
                    return Some(entry.payload.clone());
                }
                Some(_) => {}
                None => {
                    let mut stats = self.stats.write();
                    stats.misses += 1;
                    debug!("cache MISS key={}", key);
                    return None;
                }
            }
        }

        // Expired: upgrade to the write lock and re-check, since a
        // concurrent set may have refreshed the entry in between.
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| e.expires_at <= now) {
            entries.remove(key);
            let mut stats = self.stats.write();
            stats.evictions += 1;
            stats.entries = entries.len();
            debug!("cache EVICT expired key={}", key);
        }
        let mut stats = self.stats.write();
        stats.misses += 1;
        None
    }

    /// Store a payload under `key` for `ttl`. Overwrites any previous entry.
    pub fn set(&self, key: String, payload: Vec<u8>, ttl: Duration) {
        let size = payload.len();
        let mut entries = self.entries.write();
        entries.insert(
            key.clone(),
            CacheEntry {
                payload,
                expires_at: Instant::now() + ttl,
            },
        );
        let mut stats = self.stats.write();
        stats.entries = entries.len();
        debug!("cache SET key={} ({} bytes, ttl={:?})", key, size, ttl);
    }

    /// Remove an entry by key.
    pub fn remove(&self, key: &str) {
        let mut entries = self.entries.write();
        if entries.remove(key).is_some() {
            let mut stats = self.stats.write();
            stats.entries = entries.len();
            debug!("cache DELETE key={}", key);
        }
    }

    /// Number of stored entries, expired ones included until reaped.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of the store counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.read().clone();
        stats.entries = self.entries.read().len();
        stats
    }

    /// Start the background sweep task removing expired entries at a fixed
    /// interval. Callers never participate in expiry beyond this.
    pub fn start_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        info!("starting cache sweep task (interval={:?})", interval);

        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            loop {
                ticker.tick().await;
                store.sweep();
            }
        })
    }

    fn sweep(&self) {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let removed = before - entries.len();

        if removed > 0 {
            let mut stats = self.stats.write();
            stats.evictions += removed as u64;
            stats.entries = entries.len();
            debug!("cache sweep removed {} expired entries", removed);
        }
    }
}
