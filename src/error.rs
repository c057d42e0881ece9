//! Error types for the gateway
//!
//! Three layers of errors live here:
//! - [`UpstreamFailure`]: the typed taxonomy produced by the response classifier
//! - [`StorageError`]: infrastructure failures of the persistent cache
//! - [`ApiError`]: the HTTP boundary, mapping everything to a status code

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Upstream Failure ==
/// Classified failure of a single upstream call.
///
/// Every variant carries the human-readable message extracted from the
/// upstream signal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamFailure {
    /// Upstream rate limit note in a 200 body
    #[error("{0}")]
    RateLimited(String),

    /// Symbol or keyword not recognized upstream
    #[error("{0}")]
    InvalidInput(String),

    /// Credential rejected (HTTP 401/403)
    #[error("{0}")]
    AuthFailed(String),

    /// Upstream overloaded or down (HTTP 429/5xx)
    #[error("{0}")]
    UpstreamUnavailable(String),

    /// 2xx response whose body could not be decoded
    #[error("{0}")]
    MalformedResponse(String),

    /// Anything else: network errors, unexpected statuses, informational bodies
    #[error("{0}")]
    Generic(String),
}

impl UpstreamFailure {
    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamFailure::RateLimited(_) => "rate_limited",
            UpstreamFailure::InvalidInput(_) => "invalid_input",
            UpstreamFailure::AuthFailed(_) => "auth_failed",
            UpstreamFailure::UpstreamUnavailable(_) => "upstream_unavailable",
            UpstreamFailure::MalformedResponse(_) => "malformed_response",
            UpstreamFailure::Generic(_) => "generic",
        }
    }

    /// The message carried by the failure.
    pub fn message(&self) -> &str {
        match self {
            UpstreamFailure::RateLimited(msg)
            | UpstreamFailure::InvalidInput(msg)
            | UpstreamFailure::AuthFailed(msg)
            | UpstreamFailure::UpstreamUnavailable(msg)
            | UpstreamFailure::MalformedResponse(msg)
            | UpstreamFailure::Generic(msg) => msg,
        }
    }
}

// == Storage Error ==
/// Failure of the persistent cache store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

// == Fetch Error ==
/// Error returned by fetch operations of the upstream client.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Upstream(#[from] UpstreamFailure),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

// == API Error ==
/// Error type of the HTTP layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed symbol or keywords
    #[error("{0}")]
    InvalidRequest(String),

    /// Nothing cached for a read-only endpoint
    #[error("{0}")]
    NotFound(String),

    /// Upstream payload lacked an expected section
    #[error("{0}")]
    BadGateway(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Fetch(FetchError::Storage(err))
    }
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Fetch(FetchError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Fetch(FetchError::Upstream(failure)) => match failure {
                UpstreamFailure::InvalidInput(_) => StatusCode::NOT_FOUND,
                UpstreamFailure::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                UpstreamFailure::AuthFailed(_) => StatusCode::UNAUTHORIZED,
                UpstreamFailure::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                UpstreamFailure::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
                UpstreamFailure::Generic(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Fetch(FetchError::Storage(err)) = &self {
            tracing::error!("Persistent cache failure: {}", err);
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
