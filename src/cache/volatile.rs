//! Volatile Cache Module
//!
//! Process-lifetime key-value store with a fixed TTL, used to absorb bursts
//! of identical requests. Expired entries are evicted when read; there is no
//! background sweeper.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats};

/// Default volatile TTL in seconds.
pub const DEFAULT_VOLATILE_TTL: u64 = 120;

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

// == Volatile Cache ==
/// In-memory cache with a single fixed TTL for every entry.
///
/// Safe to share between tasks; the lock is held only for the duration of a
/// single map operation.
#[derive(Debug)]
pub struct VolatileCache {
    inner: Mutex<Inner>,
    ttl: Duration,
}

impl VolatileCache {
    // == Constructor ==
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            ttl,
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` when the key was never set or its entry is older than
    /// the TTL; an expired entry is removed as part of the read.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&self, key: &str, now: Instant) -> Option<Value> {
        let mut inner = self.inner.lock();

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.is_expired(self.ttl, now),
            None => {
                inner.stats.record_miss();
                return None;
            }
        };

        if expired {
            inner.entries.remove(key);
            inner.stats.record_expiration();
            return None;
        }

        inner.stats.record_hit();
        inner.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores a value, replacing any previous entry and resetting its age.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.set_at(key, value, Instant::now());
    }

    pub(crate) fn set_at(&self, key: impl Into<String>, value: Value, now: Instant) {
        let mut inner = self.inner.lock();
        inner.entries.insert(key.into(), CacheEntry::new(value, now));
    }

    // == Contains ==
    /// Checks whether an entry is physically stored, expired or not.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }
}

impl Default for VolatileCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_VOLATILE_TTL))
    }
}
