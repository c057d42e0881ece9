//! API Handlers
//!
//! HTTP request handlers for each gateway endpoint. Handlers validate input,
//! call the upstream client, and leave status mapping to [`ApiError`].

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use super::series::{extract_daily_series, filter_last_days};
use crate::cache::PersistedEntry;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    validate_keywords, validate_symbol, CacheViewQuery, CachedResponse, DailyWindowResponse,
    HealthResponse, StatsResponse,
};
use crate::upstream::{Metal, UpstreamClient};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upstream client owning both cache tiers
    pub client: Arc<UpstreamClient>,
}

impl AppState {
    /// Creates a new AppState around the given client.
    pub fn new(client: UpstreamClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the persistent cache and builds the HTTP client.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(UpstreamClient::from_config(config)?))
    }
}

fn check_symbol(symbol: &str) -> Result<()> {
    match validate_symbol(symbol) {
        Some(msg) => Err(ApiError::InvalidRequest(msg)),
        None => Ok(()),
    }
}

/// Handler for GET /api/stock-price/:symbol
pub async fn stock_price_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>> {
    check_symbol(&symbol)?;
    Ok(Json(state.client.fetch_quote(&symbol).await?))
}

/// Handler for GET /api/app/search-symbol/:keywords
pub async fn search_symbol_handler(
    State(state): State<AppState>,
    Path(keywords): Path<String>,
) -> Result<Json<Value>> {
    if let Some(msg) = validate_keywords(&keywords) {
        return Err(ApiError::InvalidRequest(msg));
    }
    Ok(Json(state.client.search(&keywords).await?))
}

/// Handler for GET /api/time-series/daily/:symbol
pub async fn daily_series_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>> {
    check_symbol(&symbol)?;
    Ok(Json(state.client.fetch_daily(&symbol).await?))
}

/// Handler for GET /api/time-series/weekly/:symbol
pub async fn weekly_series_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>> {
    check_symbol(&symbol)?;
    Ok(Json(state.client.fetch_weekly(&symbol).await?))
}

/// Handler for GET /api/time-series/monthly/:symbol
pub async fn monthly_series_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>> {
    check_symbol(&symbol)?;
    Ok(Json(state.client.fetch_monthly(&symbol).await?))
}

/// Handler for GET /api/time-series/daily/:symbol/last-{DAYS}
///
/// Returns the `DAYS` most recent daily points, newest first.
pub async fn daily_window_handler<const DAYS: usize>(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<DailyWindowResponse>> {
    check_symbol(&symbol)?;
    let payload = state.client.fetch_daily(&symbol).await?;
    let series = extract_daily_series(&payload)?;

    Ok(Json(DailyWindowResponse::new(
        &symbol,
        DAYS,
        filter_last_days(series, DAYS),
    )))
}

/// Handler for GET /api/gold-spot-price
pub async fn gold_spot_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    Ok(Json(state.client.fetch_spot(Metal::Gold).await?))
}

/// Handler for GET /api/silver-spot-price
pub async fn silver_spot_handler(State(state): State<AppState>) -> Result<Json<Value>> {
    Ok(Json(state.client.fetch_spot(Metal::Silver).await?))
}

/// Handler for GET /api/company-overview/:symbol
pub async fn company_overview_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>> {
    check_symbol(&symbol)?;
    Ok(Json(state.client.fetch_overview(&symbol).await?))
}

fn cached_view(symbol: &str, entry: Option<PersistedEntry>) -> Result<Json<CachedResponse>> {
    entry
        .map(|entry| Json(CachedResponse::new(symbol, entry)))
        .ok_or_else(|| ApiError::NotFound("No cached data found.".to_string()))
}

/// Handler for GET /api/cache/quote/:symbol
pub async fn cached_quote_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<CacheViewQuery>,
) -> Result<Json<CachedResponse>> {
    check_symbol(&symbol)?;
    let entry = state.client.read_cached_quote(&symbol, query.include_stale).await?;
    cached_view(&symbol, entry)
}

/// Handler for GET /api/cache/time-series/daily/:symbol
pub async fn cached_daily_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<CacheViewQuery>,
) -> Result<Json<CachedResponse>> {
    check_symbol(&symbol)?;
    let entry = state.client.read_cached_daily(&symbol, query.include_stale).await?;
    cached_view(&symbol, entry)
}

/// Handler for GET /api/cache/company-overview/:symbol
pub async fn cached_overview_handler(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<CacheViewQuery>,
) -> Result<Json<CachedResponse>> {
    check_symbol(&symbol)?;
    let entry = state.client.read_cached_overview(&symbol, query.include_stale).await?;
    cached_view(&symbol, entry)
}

/// Handler for GET /stats
///
/// Volatile cache counters plus the persistent row count.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.client.volatile().stats();
    let persistent_entries = state.client.persistent_len().await?;

    Ok(Json(StatsResponse::new(&stats, persistent_entries)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
