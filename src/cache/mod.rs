//! Cache Module
//!
//! The two cache tiers sitting in front of the upstream API:
//! - [`VolatileCache`]: in-process, fixed short TTL, evicted on read
//! - [`PersistentCache`]: SQLite-backed, per-entry TTL, staleness reported on read
//!
//! Both tiers are keyed by [`RequestDescriptor::cache_key`].

mod descriptor;
mod entry;
mod persistent;
mod stats;
mod volatile;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use descriptor::{RequestDescriptor, CREDENTIAL_PARAM, FUNCTION_PARAM};
pub use entry::{current_timestamp_secs, CacheEntry};
pub use persistent::{PersistedEntry, PersistentCache, DEFAULT_PERSISTENT_TTL};
pub use stats::CacheStats;
pub use volatile::{VolatileCache, DEFAULT_VOLATILE_TTL};
