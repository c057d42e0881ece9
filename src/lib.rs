//! Market Gateway - A caching HTTP gateway for market data
//!
//! Forwards symbol and keyword queries to the Alpha Vantage API behind a
//! two-tier cache (in-process and SQLite) and a typed error taxonomy.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod upstream;

pub use api::AppState;
pub use config::Config;
pub use upstream::UpstreamClient;
