//! Response DTOs for the gateway API
//!
//! Defines the structure of outgoing HTTP response bodies that the gateway
//! builds itself. Upstream payloads are passed through untouched.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::cache::{CacheStats, PersistedEntry};

/// Response body for the cached-view endpoints (`GET /api/cache/...`)
#[derive(Debug, Clone, serde::Serialize)]
pub struct CachedResponse {
    /// Upper-cased symbol
    pub symbol: String,
    /// Stored upstream payload
    pub data: Value,
    /// Unix seconds of the upstream fetch
    pub cached_at: i64,
    pub ttl_seconds: u64,
    pub stale: bool,
}

impl CachedResponse {
    /// Creates a new CachedResponse from a persisted entry
    pub fn new(symbol: &str, entry: PersistedEntry) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            data: entry.payload,
            cached_at: entry.fetched_at,
            ttl_seconds: entry.ttl_seconds,
            stale: entry.stale,
        }
    }
}

/// Dated data points, newest first.
///
/// Serializes as a JSON object whose keys keep the vector's order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyWindow(pub Vec<(String, Value)>);

impl DailyWindow {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dates in window order.
    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(date, _)| date.as_str())
    }
}

impl Serialize for DailyWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (date, point) in &self.0 {
            map.serialize_entry(date, point)?;
        }
        map.end()
    }
}

/// Response body for the day-window endpoints (`GET /api/time-series/daily/:symbol/last-N`)
#[derive(Debug, Clone, serde::Serialize)]
pub struct DailyWindowResponse {
    /// Upper-cased symbol
    pub symbol: String,
    /// Requested window size
    pub days: usize,
    pub data: DailyWindow,
}

impl DailyWindowResponse {
    pub fn new(symbol: &str, days: usize, data: DailyWindow) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            days,
            data,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, serde::Serialize)]
pub struct StatsResponse {
    /// Volatile cache hits
    pub hits: u64,
    /// Volatile cache misses, expirations included
    pub misses: u64,
    /// Volatile entries evicted on read after their TTL
    pub expirations: u64,
    /// Current number of volatile entries
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Rows in the persistent cache, stale ones included
    pub persistent_entries: usize,
}

impl StatsResponse {
    /// Creates a new StatsResponse from volatile statistics and the persistent row count
    pub fn new(stats: &CacheStats, persistent_entries: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            persistent_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
