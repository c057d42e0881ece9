//! Cache Entry Module
//!
//! Defines the structure for individual volatile cache entries.

use std::time::{Duration, Instant};

use serde_json::Value;

// == Cache Entry ==
/// A cached upstream payload and the monotonic instant it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Value,
    /// Insertion instant (monotonic clock)
    pub inserted_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry stamped with `now`.
    pub fn new(value: Value, now: Instant) -> Self {
        Self {
            value,
            inserted_at: now,
        }
    }

    // == Is Expired ==
    /// Checks if the entry is older than `ttl` at `now`.
    ///
    /// Boundary condition: an entry whose age equals the TTL is still valid;
    /// it expires once the age strictly exceeds the TTL.
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) > ttl
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in seconds.
pub fn current_timestamp_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_fresh_within_ttl() {
        let now = Instant::now();
        let entry = CacheEntry::new(json!({"a": 1}), now);

        assert!(!entry.is_expired(Duration::from_secs(120), now));
        assert!(!entry.is_expired(Duration::from_secs(120), now + Duration::from_secs(60)));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let entry = CacheEntry::new(json!("v"), now);
        let ttl = Duration::from_secs(120);

        assert!(!entry.is_expired(ttl, now + ttl));
        assert!(entry.is_expired(ttl, now + ttl + Duration::from_millis(1)));
    }

    #[test]
    fn test_current_timestamp_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(current_timestamp_secs() > 1_577_836_800);
    }
}
