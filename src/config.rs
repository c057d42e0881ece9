//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::cache::{DEFAULT_PERSISTENT_TTL, DEFAULT_VOLATILE_TTL};
use crate::upstream::{CallKind, TtlPolicy};

/// Default upstream endpoint.
pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Default location of the persistent cache database.
pub const DEFAULT_DB_PATH: &str = "data/alphavantage_cache.db";

/// Gateway configuration parameters.
///
/// Everything except the API key has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream API credential
    pub api_key: String,
    /// Upstream endpoint URL
    pub base_url: String,
    /// SQLite file backing the persistent cache
    pub db_path: PathBuf,
    /// TTL in seconds for persistent saves that do not specify one
    pub default_persistent_ttl: u64,
    /// Volatile cache TTL in seconds
    pub volatile_ttl: u64,
    /// Outbound request timeout in seconds
    pub request_timeout: u64,
    /// Persistent TTL per call kind
    pub ttl_policy: TtlPolicy,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `ALPHAVANTAGE_API_KEY` - Upstream credential (required)
    /// - `ALPHAVANTAGE_BASE_URL` - Upstream endpoint (default: Alpha Vantage `/query`)
    /// - `ALPHAVANTAGE_DB_PATH` - Persistent cache file (default: `data/alphavantage_cache.db`)
    /// - `ALPHAVANTAGE_DEFAULT_TTL` - Default persistent TTL in seconds (default: 600)
    /// - `ALPHAVANTAGE_VOLATILE_TTL` - Volatile cache TTL in seconds (default: 120)
    /// - `ALPHAVANTAGE_TIMEOUT` - Outbound timeout in seconds (default: 10)
    /// - `ALPHAVANTAGE_TTL_<KIND>` - Persistent TTL for one call kind, `off` for volatile-only
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    pub fn from_env() -> Result<Self> {
        let api_key = match env::var("ALPHAVANTAGE_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => bail!("ALPHAVANTAGE_API_KEY must be set"),
        };

        let defaults = Self::with_api_key(api_key);

        Ok(Self {
            base_url: env::var("ALPHAVANTAGE_BASE_URL").unwrap_or(defaults.base_url),
            db_path: env::var("ALPHAVANTAGE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            default_persistent_ttl: parse_var("ALPHAVANTAGE_DEFAULT_TTL")
                .unwrap_or(defaults.default_persistent_ttl),
            volatile_ttl: parse_var("ALPHAVANTAGE_VOLATILE_TTL").unwrap_or(defaults.volatile_ttl),
            request_timeout: parse_var("ALPHAVANTAGE_TIMEOUT").unwrap_or(defaults.request_timeout),
            ttl_policy: policy_from_env(defaults.ttl_policy),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            api_key: defaults.api_key,
        })
    }

    /// Default configuration with the given credential.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            default_persistent_ttl: DEFAULT_PERSISTENT_TTL,
            volatile_ttl: DEFAULT_VOLATILE_TTL,
            request_timeout: 10,
            ttl_policy: TtlPolicy::default(),
            server_port: 8000,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Applies `ALPHAVANTAGE_TTL_<KIND>` overrides on top of `base`.
fn policy_from_env(base: TtlPolicy) -> TtlPolicy {
    CallKind::ALL.into_iter().fold(base, |policy, kind| {
        let name = format!("ALPHAVANTAGE_TTL_{}", kind.as_str().to_uppercase());
        match env::var(&name) {
            Ok(value) if value.trim().eq_ignore_ascii_case("off") => policy.without_ttl(kind),
            Ok(value) => match value.trim().parse() {
                Ok(ttl) => policy.with_ttl(kind, ttl),
                Err(_) => {
                    tracing::warn!("Ignoring {}: not a number of seconds", name);
                    policy
                }
            },
            Err(_) => policy,
        }
    })
}
