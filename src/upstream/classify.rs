//! Response Classifier
//!
//! Turns the raw outcome of an upstream call into either a success payload or
//! a typed [`UpstreamFailure`]. Pure: no caching, no logging.

use serde_json::Value;

use crate::error::UpstreamFailure;

/// Body field signalling the upstream rate limit.
pub const RATE_LIMIT_MARKER: &str = "Note";

/// Body field signalling an unknown symbol or bad argument.
pub const ERROR_MARKER: &str = "Error Message";

/// Body field carrying an informational (non-data) message.
pub const INFO_MARKER: &str = "Information";

pub const EMPTY_RESPONSE_MESSAGE: &str = "Empty response from upstream.";

// == Upstream Outcome ==
/// What came back from one outbound call.
#[derive(Debug, Clone, Copy)]
pub enum UpstreamOutcome<'a> {
    /// The request never produced a complete response (connect, DNS, timeout, body read)
    Transport(&'a str),
    /// A complete HTTP response
    Response { status: u16, body: &'a [u8] },
}

// == Classify ==
/// Classifies an upstream outcome.
///
/// Status checks come first; for 2xx responses the body markers are checked
/// in the order rate-limit, error-message, informational, empty. The first
/// match wins.
pub fn classify(outcome: UpstreamOutcome<'_>) -> Result<Value, UpstreamFailure> {
    let (status, body) = match outcome {
        UpstreamOutcome::Transport(detail) => {
            return Err(UpstreamFailure::Generic(format!("Network error: {}", detail)));
        }
        UpstreamOutcome::Response { status, body } => (status, body),
    };

    match status {
        200..=299 => {}
        401 | 403 => {
            return Err(UpstreamFailure::AuthFailed(
                "Authentication failed with upstream.".to_string(),
            ));
        }
        429 | 500 | 502 | 503 | 504 => {
            return Err(UpstreamFailure::UpstreamUnavailable(format!(
                "Upstream error (status {}).",
                status
            )));
        }
        other => {
            return Err(UpstreamFailure::Generic(format!(
                "API request failed with status code {}",
                other
            )));
        }
    }

    let data: Value = serde_json::from_slice(body).map_err(|e| {
        UpstreamFailure::MalformedResponse(format!("Malformed response from upstream: {}", e))
    })?;

    classify_body(data)
}

/// Applies the marker checks to a decoded 2xx body.
pub fn classify_body(data: Value) -> Result<Value, UpstreamFailure> {
    if let Some(object) = data.as_object() {
        if let Some(note) = object.get(RATE_LIMIT_MARKER) {
            return Err(UpstreamFailure::RateLimited(marker_text(note)));
        }
        if let Some(message) = object.get(ERROR_MARKER) {
            return Err(UpstreamFailure::InvalidInput(marker_text(message)));
        }
        if let Some(info) = object.get(INFO_MARKER) {
            return Err(UpstreamFailure::Generic(marker_text(info)));
        }
    }

    if is_empty(&data) {
        return Err(UpstreamFailure::Generic(EMPTY_RESPONSE_MESSAGE.to_string()));
    }

    Ok(data)
}

fn marker_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Falsy JSON: null, false, zero, empty string, empty array, empty object.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
