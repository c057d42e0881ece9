//! Upstream Client
//!
//! Orchestrates one logical fetch:
//! volatile cache → persistent cache (fresh only) → network → classify →
//! populate caches or fail.
//!
//! A persistent hit does not refresh the volatile cache; the volatile tier
//! only ever holds payloads that came straight from the network.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::classify::{classify, UpstreamOutcome, EMPTY_RESPONSE_MESSAGE};
use super::policy::{CallKind, Metal, TtlPolicy};
use crate::cache::{PersistedEntry, PersistentCache, RequestDescriptor, VolatileCache};
use crate::config::Config;
use crate::error::{FetchError, StorageError, UpstreamFailure};

/// Default bound on a single outbound call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

// == Upstream Client ==
/// Client for the market-data API, owning both cache tiers.
pub struct UpstreamClient {
    http: Client,
    base_url: String,
    api_key: String,
    volatile: VolatileCache,
    persistent: Arc<PersistentCache>,
    policy: TtlPolicy,
}

impl UpstreamClient {
    // == Constructors ==
    /// Creates a client with the default TTL policy.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        volatile: VolatileCache,
        persistent: PersistentCache,
    ) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            volatile,
            persistent: Arc::new(persistent),
            policy: TtlPolicy::default(),
        })
    }

    /// Builds the client and both caches from configuration.
    ///
    /// Fails if the persistent store cannot be opened.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let volatile = VolatileCache::new(Duration::from_secs(config.volatile_ttl));
        let persistent = PersistentCache::open(&config.db_path, config.default_persistent_ttl)?;

        let client = Self::new(
            config.api_key.clone(),
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout),
            volatile,
            persistent,
        )?
        .with_policy(config.ttl_policy.clone());

        Ok(client)
    }

    /// Replaces the TTL policy.
    pub fn with_policy(mut self, policy: TtlPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn volatile(&self) -> &VolatileCache {
        &self.volatile
    }

    pub fn persistent(&self) -> &PersistentCache {
        &self.persistent
    }

    // == Fetch ==
    /// Fetches `descriptor`, serving from cache when possible.
    ///
    /// On success the payload is written to the volatile cache and then, only
    /// if `kind` has a persistent TTL, to the persistent cache. A failed
    /// persistent write is returned as [`FetchError::Storage`] but leaves the
    /// volatile entry in place. On upstream failure nothing is cached. Errors
    /// are never retried.
    pub async fn fetch(
        &self,
        kind: CallKind,
        descriptor: &RequestDescriptor,
    ) -> Result<Value, FetchError> {
        let function = descriptor.function();
        let key = descriptor.cache_key();

        if let Some(value) = self.volatile.get(&key) {
            info!("Volatile cache hit: function={}", function);
            return Ok(value);
        }

        let lookup = key.clone();
        if let Some(entry) = self.with_store(move |store| store.get(&lookup, false)).await? {
            info!("Persistent cache hit: function={}", function);
            return Ok(entry.payload);
        }

        let payload = self.request(descriptor).await?;
        self.volatile.set(key.clone(), payload.clone());

        if let Some(ttl) = self.policy.persistent_ttl(kind) {
            let stored = payload.clone();
            let endpoint = function.to_string();
            self.with_store(move |store| {
                store.save(&key, &stored, Some(ttl), Some(endpoint.as_str()))
            })
            .await
            .inspect_err(|e| {
                error!("Persistent cache save failed: function={} error={}", function, e)
            })?;
        }

        info!("Upstream request success: function={} kind={}", function, kind);
        Ok(payload)
    }

    /// Runs one persistent-cache statement on the blocking pool.
    ///
    /// rusqlite calls block (up to the busy timeout under write contention),
    /// so they never run on an async worker thread.
    async fn with_store<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&PersistentCache) -> Result<T, StorageError> + Send + 'static,
    {
        let store = Arc::clone(&self.persistent);
        tokio::task::spawn_blocking(move || op(store.as_ref())).await?
    }

    /// Performs the network call and classifies the outcome.
    async fn request(&self, descriptor: &RequestDescriptor) -> Result<Value, UpstreamFailure> {
        let function = descriptor.function();
        info!("Upstream request start: function={} key={}", function, descriptor.cache_key());

        let response = match self
            .http
            .get(&self.base_url)
            .query(&descriptor.query_pairs(&self.api_key))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // the URL carries the credential
                let detail = e.without_url().to_string();
                error!("Upstream request failed: function={} error={}", function, detail);
                return classify(UpstreamOutcome::Transport(&detail));
            }
        };

        let status = response.status().as_u16();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                let detail = e.without_url().to_string();
                error!("Upstream body read failed: function={} error={}", function, detail);
                return classify(UpstreamOutcome::Transport(&detail));
            }
        };

        classify(UpstreamOutcome::Response { status, body: &body[..] })
            .inspect_err(|failure| log_failure(function, status, failure))
    }

    // == Cache Read API ==
    /// Reads the persistent entry for a call without touching the network or
    /// the volatile cache. `Ok(None)` means nothing (fresh enough) is cached.
    pub async fn read_cached(
        &self,
        kind: CallKind,
        arg: &str,
        allow_stale: bool,
    ) -> Result<Option<PersistedEntry>, StorageError> {
        let key = kind.descriptor(arg).cache_key();
        let entry = self
            .with_store(move |store| store.get(&key, allow_stale))
            .await?;
        debug!(
            "Cache read: kind={} allow_stale={} found={}",
            kind,
            allow_stale,
            entry.is_some()
        );
        Ok(entry)
    }

    pub async fn read_cached_quote(
        &self,
        symbol: &str,
        allow_stale: bool,
    ) -> Result<Option<PersistedEntry>, StorageError> {
        self.read_cached(CallKind::Quote, symbol, allow_stale).await
    }

    pub async fn read_cached_daily(
        &self,
        symbol: &str,
        allow_stale: bool,
    ) -> Result<Option<PersistedEntry>, StorageError> {
        self.read_cached(CallKind::Daily, symbol, allow_stale).await
    }

    pub async fn read_cached_overview(
        &self,
        symbol: &str,
        allow_stale: bool,
    ) -> Result<Option<PersistedEntry>, StorageError> {
        self.read_cached(CallKind::Overview, symbol, allow_stale).await
    }

    /// Number of persistent rows, stale ones included.
    pub async fn persistent_len(&self) -> Result<usize, StorageError> {
        self.with_store(|store| store.len()).await
    }

    // == Named Operations ==
    async fn fetch_kind(&self, kind: CallKind, arg: &str) -> Result<Value, FetchError> {
        self.fetch(kind, &kind.descriptor(arg)).await
    }

    /// Latest quote for a symbol.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Value, FetchError> {
        self.fetch_kind(CallKind::Quote, symbol).await
    }

    /// Daily time series for a symbol.
    pub async fn fetch_daily(&self, symbol: &str) -> Result<Value, FetchError> {
        self.fetch_kind(CallKind::Daily, symbol).await
    }

    pub async fn fetch_weekly(&self, symbol: &str) -> Result<Value, FetchError> {
        self.fetch_kind(CallKind::Weekly, symbol).await
    }

    pub async fn fetch_monthly(&self, symbol: &str) -> Result<Value, FetchError> {
        self.fetch_kind(CallKind::Monthly, symbol).await
    }

    /// Symbol search by keywords.
    pub async fn search(&self, keywords: &str) -> Result<Value, FetchError> {
        self.fetch_kind(CallKind::Search, keywords).await
    }

    /// Company overview for a symbol.
    pub async fn fetch_overview(&self, symbol: &str) -> Result<Value, FetchError> {
        self.fetch_kind(CallKind::Overview, symbol).await
    }

    /// Spot price of gold or silver.
    pub async fn fetch_spot(&self, metal: Metal) -> Result<Value, FetchError> {
        self.fetch_kind(CallKind::Spot, metal.symbol()).await
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.base_url)
            .field("volatile", &self.volatile)
            .field("persistent", &self.persistent)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn log_failure(function: &str, status: u16, failure: &UpstreamFailure) {
    match failure {
        UpstreamFailure::RateLimited(note) => {
            warn!("Upstream rate limit: function={} note={}", function, note)
        }
        UpstreamFailure::InvalidInput(message) => {
            warn!("Upstream invalid input: function={} error={}", function, message)
        }
        UpstreamFailure::Generic(message) if message == EMPTY_RESPONSE_MESSAGE => {
            error!("Upstream empty response: function={}", function)
        }
        UpstreamFailure::Generic(message) if (200..300).contains(&status) => {
            warn!("Upstream info response: function={} info={}", function, message)
        }
        other => error!(
            "Upstream error: function={} status={} kind={} message={}",
            function,
            status,
            other.kind(),
            other.message()
        ),
    }
}
