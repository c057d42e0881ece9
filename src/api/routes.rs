//! API Routes
//!
//! Configures the Axum router with all gateway endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cached_daily_handler, cached_overview_handler, cached_quote_handler,
    company_overview_handler, daily_series_handler, daily_window_handler, gold_spot_handler,
    health_handler, monthly_series_handler, search_symbol_handler, silver_spot_handler,
    stats_handler, stock_price_handler, weekly_series_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/stock-price/:symbol` - Latest quote
/// - `GET /api/app/search-symbol/:keywords` - Symbol search
/// - `GET /api/time-series/{daily,weekly,monthly}/:symbol` - Time series
/// - `GET /api/time-series/daily/:symbol/last-{7,15,30}` - Most recent daily points
/// - `GET /api/gold-spot-price`, `GET /api/silver-spot-price` - Spot prices
/// - `GET /api/company-overview/:symbol` - Company overview
/// - `GET /api/cache/...` - Persistent cache views, never call upstream
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/stock-price/:symbol", get(stock_price_handler))
        .route("/app/search-symbol/:keywords", get(search_symbol_handler))
        .route("/time-series/daily/:symbol", get(daily_series_handler))
        .route("/time-series/weekly/:symbol", get(weekly_series_handler))
        .route("/time-series/monthly/:symbol", get(monthly_series_handler))
        .route("/time-series/daily/:symbol/last-7", get(daily_window_handler::<7>))
        .route("/time-series/daily/:symbol/last-15", get(daily_window_handler::<15>))
        .route("/time-series/daily/:symbol/last-30", get(daily_window_handler::<30>))
        .route("/gold-spot-price", get(gold_spot_handler))
        .route("/silver-spot-price", get(silver_spot_handler))
        .route("/company-overview/:symbol", get(company_overview_handler))
        .route("/cache/quote/:symbol", get(cached_quote_handler))
        .route("/cache/time-series/daily/:symbol", get(cached_daily_handler))
        .route("/cache/company-overview/:symbol", get(cached_overview_handler));

    Router::new()
        .nest("/api", api)
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
