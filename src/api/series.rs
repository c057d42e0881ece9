//! Daily series helpers for the day-window endpoints.

use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::models::DailyWindow;

/// Key of the daily series inside a `TIME_SERIES_DAILY` payload.
pub const DAILY_SERIES_KEY: &str = "Time Series (Daily)";

/// Returns the non-empty daily series object of a payload.
pub fn extract_daily_series(payload: &Value) -> Result<&Map<String, Value>, ApiError> {
    payload
        .get(DAILY_SERIES_KEY)
        .and_then(Value::as_object)
        .filter(|series| !series.is_empty())
        .ok_or_else(|| ApiError::BadGateway("Upstream daily series data missing.".to_string()))
}

/// Selects the `days` most recent entries, newest first.
///
/// Dates are ISO `YYYY-MM-DD` strings, so lexical order is date order.
/// Returns fewer entries when the series is shorter.
pub fn filter_last_days(series: &Map<String, Value>, days: usize) -> DailyWindow {
    let mut dates: Vec<&String> = series.keys().collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));

    DailyWindow(
        dates
            .into_iter()
            .take(days)
            .map(|date| (date.clone(), series[date.as_str()].clone()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn series(n: u32) -> Map<String, Value> {
        (1..=n)
            .map(|day| {
                (
                    format!("2024-03-{:02}", day),
                    json!({"4. close": day.to_string()}),
                )
            })
            .collect()
    }

    #[test]
    fn test_extract_missing_series() {
        assert!(matches!(
            extract_daily_series(&json!({"Meta Data": {}})),
            Err(ApiError::BadGateway(_))
        ));
        assert!(extract_daily_series(&json!({DAILY_SERIES_KEY: {}})).is_err());
        assert!(extract_daily_series(&json!({DAILY_SERIES_KEY: [1, 2]})).is_err());
    }

    #[test]
    fn test_extract_present_series() {
        let payload = json!({DAILY_SERIES_KEY: {"2024-01-02": {"4. close": "1"}}});
        assert_eq!(extract_daily_series(&payload).unwrap().len(), 1);
    }

    #[test]
    fn test_filter_returns_min_of_n_and_k() {
        for (n, k) in [(10, 7), (3, 7), (30, 30), (0, 15), (20, 15)] {
            let window = filter_last_days(&series(n), k);
            assert_eq!(window.len(), (n as usize).min(k), "n={} k={}", n, k);
        }
    }

    #[test]
    fn test_filter_is_descending_and_contiguous() {
        let window = filter_last_days(&series(20), 7);
        let dates: Vec<&str> = window.dates().collect();

        assert_eq!(
            dates,
            vec![
                "2024-03-20",
                "2024-03-19",
                "2024-03-18",
                "2024-03-17",
                "2024-03-16",
                "2024-03-15",
                "2024-03-14",
            ]
        );
        assert_eq!(window.0[0].1, json!({"4. close": "20"}));
    }
}
