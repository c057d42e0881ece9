//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against a wiremock
//! upstream.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use market_gateway::{
    api::create_router,
    cache::{PersistentCache, VolatileCache},
    upstream::CallKind,
    AppState, UpstreamClient,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// == Helper Functions ==

fn create_test_state(server: &MockServer) -> AppState {
    let client = UpstreamClient::new(
        "test-key",
        format!("{}/query", server.uri()),
        Duration::from_secs(2),
        VolatileCache::default(),
        PersistentCache::open_in_memory(600).unwrap(),
    )
    .unwrap();
    AppState::new(client)
}

fn create_test_app(server: &MockServer) -> Router {
    create_router(create_test_state(server))
}

async fn respond(server: &MockServer, function: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/query"))
        .and(query_param("function", function))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    // extractor rejections carry plain-text bodies
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn daily_body(days: usize) -> Value {
    let mut series = serde_json::Map::new();
    for day in 1..=days {
        series.insert(
            format!("2024-01-{:02}", day),
            json!({"4. close": format!("{}.00", 100 + day)}),
        );
    }
    json!({
        "Meta Data": {"2. Symbol": "IBM"},
        "Time Series (Daily)": series,
    })
}

// == Passthrough Endpoint Tests ==

#[tokio::test]
async fn test_stock_price_passthrough() {
    let server = MockServer::start().await;
    let body = json!({"Global Quote": {"01. symbol": "AAPL", "05. price": "189.95"}});
    respond(&server, "GLOBAL_QUOTE", ResponseTemplate::new(200).set_body_json(body.clone())).await;

    let (status, json) = get(create_test_app(&server), "/api/stock-price/AAPL").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, body);
}

#[tokio::test]
async fn test_search_symbol_passthrough() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("function", "SYMBOL_SEARCH"))
        .and(query_param("keywords", "tesla"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"bestMatches": []})))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = get(create_test_app(&server), "/api/app/search-symbol/tesla").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({"bestMatches": []}));
}

#[tokio::test]
async fn test_gold_spot_price() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("function", "GOLD_SILVER_SPOT"))
        .and(query_param("symbol", "XAU"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"price": "2034.10"})))
        .expect(1)
        .mount(&server)
        .await;

    let (status, json) = get(create_test_app(&server), "/api/gold-spot-price").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["price"], "2034.10");
}

// == Error Mapping Tests ==

#[tokio::test]
async fn test_invalid_input_maps_to_not_found() {
    let server = MockServer::start().await;
    respond(
        &server,
        "GLOBAL_QUOTE",
        ResponseTemplate::new(200).set_body_json(json!({"Error Message": "Invalid API call."})),
    )
    .await;

    let (status, json) = get(create_test_app(&server), "/api/stock-price/NOPE").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({"error": "Invalid API call."}));
}

#[tokio::test]
async fn test_rate_limit_maps_to_too_many_requests() {
    let server = MockServer::start().await;
    respond(
        &server,
        "OVERVIEW",
        ResponseTemplate::new(200).set_body_json(json!({"Note": "Too many requests."})),
    )
    .await;

    let (status, json) = get(create_test_app(&server), "/api/company-overview/IBM").await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"], "Too many requests.");
}

#[tokio::test]
async fn test_auth_failure_maps_to_unauthorized() {
    let server = MockServer::start().await;
    respond(&server, "TIME_SERIES_WEEKLY", ResponseTemplate::new(403)).await;

    let (status, json) = get(create_test_app(&server), "/api/time-series/weekly/IBM").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_server_error_maps_to_service_unavailable() {
    let server = MockServer::start().await;
    respond(&server, "TIME_SERIES_MONTHLY", ResponseTemplate::new(502)).await;

    let (status, _) = get(create_test_app(&server), "/api/time-series/monthly/IBM").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_empty_upstream_body_maps_to_internal_error() {
    let server = MockServer::start().await;
    respond(&server, "GLOBAL_QUOTE", ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let (status, json) = get(create_test_app(&server), "/api/stock-price/AAPL").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Empty response from upstream.");
}

#[tokio::test]
async fn test_invalid_keywords_rejected_before_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"bestMatches": []})))
        .expect(0)
        .mount(&server)
        .await;

    let long = "k".repeat(51);
    let (status, json) =
        get(create_test_app(&server), &format!("/api/app/search-symbol/{}", long)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid keywords.");
}

// == Daily Window Tests ==

#[tokio::test]
async fn test_last_seven_days_newest_first() {
    let server = MockServer::start().await;
    respond(
        &server,
        "TIME_SERIES_DAILY",
        ResponseTemplate::new(200).set_body_json(daily_body(20)),
    )
    .await;

    let (status, json) = get(create_test_app(&server), "/api/time-series/daily/ibm/last-7").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["symbol"], "IBM");
    assert_eq!(json["days"], 7);
    let data = json["data"].as_object().unwrap();
    assert_eq!(data.len(), 7);
    assert!(data.contains_key("2024-01-20"));
    assert!(data.contains_key("2024-01-14"));
    assert!(!data.contains_key("2024-01-13"));
}

#[tokio::test]
async fn test_window_shorter_than_requested() {
    let server = MockServer::start().await;
    respond(
        &server,
        "TIME_SERIES_DAILY",
        ResponseTemplate::new(200).set_body_json(daily_body(10)),
    )
    .await;

    let (status, json) = get(create_test_app(&server), "/api/time-series/daily/IBM/last-30").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["days"], 30);
    assert_eq!(json["data"].as_object().unwrap().len(), 10);
}

#[tokio::test]
async fn test_window_without_series_is_bad_gateway() {
    let server = MockServer::start().await;
    respond(
        &server,
        "TIME_SERIES_DAILY",
        ResponseTemplate::new(200).set_body_json(json!({"Meta Data": {}})),
    )
    .await;

    let (status, json) = get(create_test_app(&server), "/api/time-series/daily/IBM/last-15").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"], "Upstream daily series data missing.");
}

// == Cache View Tests ==

#[tokio::test]
async fn test_cache_view_after_fetch() {
    let server = MockServer::start().await;
    let body = json!({"Global Quote": {"01. symbol": "AAPL"}});
    Mock::given(method("GET"))
        .and(query_param("function", "GLOBAL_QUOTE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;
    let app = create_test_app(&server);

    let (status, _) = get(app.clone(), "/api/stock-price/AAPL").await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = get(app, "/api/cache/quote/AAPL").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["symbol"], "AAPL");
    assert_eq!(json["data"], body);
    assert_eq!(json["ttl_seconds"], 600);
    assert_eq!(json["stale"], false);
}

#[tokio::test]
async fn test_cache_view_never_calls_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Symbol": "IBM"})))
        .expect(0)
        .mount(&server)
        .await;

    let (status, json) = get(create_test_app(&server), "/api/cache/company-overview/IBM").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "No cached data found.");
}

#[tokio::test]
async fn test_cache_view_include_stale() {
    let server = MockServer::start().await;
    let state = create_test_state(&server);
    let key = CallKind::Daily.descriptor("IBM").cache_key();
    state
        .client
        .persistent()
        .save(&key, &daily_body(2), Some(0), Some("TIME_SERIES_DAILY"))
        .unwrap();
    let app = create_router(state);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let (status, _) = get(app.clone(), "/api/cache/time-series/daily/IBM").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = get(app, "/api/cache/time-series/daily/IBM?include_stale=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stale"], true);
    assert_eq!(json["ttl_seconds"], 0);
}

#[tokio::test]
async fn test_cache_view_storage_failure_is_internal_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("cache.db");
    let client = UpstreamClient::new(
        "test-key",
        format!("{}/query", server.uri()),
        Duration::from_secs(2),
        VolatileCache::default(),
        PersistentCache::open(&db_path, 600).unwrap(),
    )
    .unwrap();
    let app = create_router(AppState::new(client));

    rusqlite::Connection::open(&db_path)
        .unwrap()
        .execute_batch("DROP TABLE cache_entries;")
        .unwrap();

    let (status, json) = get(app.clone(), "/api/cache/quote/AAPL").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().starts_with("storage error"));

    let (status, _) = get(app, "/stats").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_cache_view_accepts_numeric_flag() {
    let server = MockServer::start().await;
    let state = create_test_state(&server);
    let key = CallKind::Quote.descriptor("AAPL").cache_key();
    state
        .client
        .persistent()
        .save(&key, &json!({"Global Quote": {}}), Some(0), Some("GLOBAL_QUOTE"))
        .unwrap();
    let app = create_router(state);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let (status, json) = get(app.clone(), "/api/cache/quote/AAPL?include_stale=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stale"], true);

    let (status, _) = get(app.clone(), "/api/cache/quote/AAPL?include_stale=no").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(app, "/api/cache/quote/AAPL?include_stale=maybe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let server = MockServer::start().await;
    respond(
        &server,
        "SYMBOL_SEARCH",
        ResponseTemplate::new(200).set_body_json(json!({"bestMatches": []})),
    )
    .await;
    let app = create_test_app(&server);

    // miss then hit
    get(app.clone(), "/api/app/search-symbol/ibm").await;
    get(app.clone(), "/api/app/search-symbol/ibm").await;

    let (status, json) = get(app, "/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["total_entries"].as_u64().unwrap(), 1);
    assert_eq!(json["persistent_entries"].as_u64().unwrap(), 0);
    assert!(json.get("hit_rate").is_some());
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let server = MockServer::start().await;

    let (status, json) = get(create_test_app(&server), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
    assert!(json.get("timestamp").is_some());
}
