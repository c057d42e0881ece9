//! API Module
//!
//! HTTP handlers and routing for the gateway REST API.
//!
//! # Endpoints
//! - `GET /api/stock-price/:symbol`
//! - `GET /api/app/search-symbol/:keywords`
//! - `GET /api/time-series/{daily,weekly,monthly}/:symbol`
//! - `GET /api/time-series/daily/:symbol/last-{7,15,30}`
//! - `GET /api/gold-spot-price`, `GET /api/silver-spot-price`
//! - `GET /api/company-overview/:symbol`
//! - `GET /api/cache/{quote,time-series/daily,company-overview}/:symbol`
//! - `GET /stats`, `GET /health`

pub mod handlers;
pub mod routes;
pub mod series;

pub use handlers::*;
pub use routes::create_router;
