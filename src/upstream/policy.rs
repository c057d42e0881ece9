//! Call kinds and their persistence policy.

use std::collections::HashMap;
use std::fmt;

use crate::cache::RequestDescriptor;

// == Call Kind ==
/// Logical category of an upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Quote,
    Daily,
    Weekly,
    Monthly,
    Search,
    Overview,
    Spot,
}

impl CallKind {
    pub const ALL: [CallKind; 7] = [
        CallKind::Quote,
        CallKind::Daily,
        CallKind::Weekly,
        CallKind::Monthly,
        CallKind::Search,
        CallKind::Overview,
        CallKind::Spot,
    ];

    /// Upstream `function` parameter for this kind.
    pub fn function(self) -> &'static str {
        match self {
            CallKind::Quote => "GLOBAL_QUOTE",
            CallKind::Daily => "TIME_SERIES_DAILY",
            CallKind::Weekly => "TIME_SERIES_WEEKLY",
            CallKind::Monthly => "TIME_SERIES_MONTHLY",
            CallKind::Search => "SYMBOL_SEARCH",
            CallKind::Overview => "OVERVIEW",
            CallKind::Spot => "GOLD_SILVER_SPOT",
        }
    }

    /// Name of the single argument this kind takes upstream.
    pub fn arg_name(self) -> &'static str {
        match self {
            CallKind::Search => "keywords",
            _ => "symbol",
        }
    }

    /// Builds the descriptor for a call of this kind.
    pub fn descriptor(self, arg: &str) -> RequestDescriptor {
        RequestDescriptor::new(self.function()).arg(self.arg_name(), arg)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CallKind::Quote => "quote",
            CallKind::Daily => "daily",
            CallKind::Weekly => "weekly",
            CallKind::Monthly => "monthly",
            CallKind::Search => "search",
            CallKind::Overview => "overview",
            CallKind::Spot => "spot",
        }
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Metal ==
/// Precious metal for spot-price lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metal {
    Gold,
    Silver,
}

impl Metal {
    /// Upstream symbol for the metal.
    pub fn symbol(self) -> &'static str {
        match self {
            Metal::Gold => "XAU",
            Metal::Silver => "XAG",
        }
    }
}

// == TTL Policy ==
/// Persistent TTL per call kind. Kinds without an entry are volatile-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlPolicy {
    persistent: HashMap<CallKind, u64>,
}

impl TtlPolicy {
    /// A policy where every kind is volatile-only.
    pub fn volatile_only() -> Self {
        Self {
            persistent: HashMap::new(),
        }
    }

    /// Persist `kind` for `ttl_seconds`.
    pub fn with_ttl(mut self, kind: CallKind, ttl_seconds: u64) -> Self {
        self.persistent.insert(kind, ttl_seconds);
        self
    }

    /// Stop persisting `kind`.
    pub fn without_ttl(mut self, kind: CallKind) -> Self {
        self.persistent.remove(&kind);
        self
    }

    /// Persistent TTL for `kind`, `None` when it is only cached in memory.
    pub fn persistent_ttl(&self, kind: CallKind) -> Option<u64> {
        self.persistent.get(&kind).copied()
    }
}

impl Default for TtlPolicy {
    /// Quotes and daily series for ten minutes, overviews for a day.
    fn default() -> Self {
        Self::volatile_only()
            .with_ttl(CallKind::Quote, 600)
            .with_ttl(CallKind::Daily, 600)
            .with_ttl(CallKind::Overview, 86_400)
    }
}
