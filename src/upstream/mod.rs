//! Upstream Module
//!
//! Everything between the route handlers and the market-data API: call kinds
//! and their TTL policy, the response classifier, and the caching client.

pub mod classify;
mod client;
mod policy;

pub use classify::{classify, UpstreamOutcome};
pub use client::{UpstreamClient, DEFAULT_TIMEOUT};
pub use policy::{CallKind, Metal, TtlPolicy};
