//! Request models and input validation
//!
//! Path parameters are checked here before anything reaches the upstream
//! client.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

/// Maximum accepted symbol length.
pub const MAX_SYMBOL_LENGTH: usize = 10;

/// Maximum accepted search keywords length.
pub const MAX_KEYWORDS_LENGTH: usize = 50;

/// Query string of the cached-view endpoints (`?include_stale=true`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheViewQuery {
    /// Return entries older than their TTL as well
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub include_stale: bool,
}

/// Accepts the usual spellings of a query-string boolean, case-insensitive:
/// `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`, `t`/`f`, `y`/`n`.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean flag")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
            Ok(value)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
            match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" | "t" | "y" => Ok(true),
                "false" | "0" | "no" | "off" | "f" | "n" => Ok(false),
                _ => Err(E::invalid_value(de::Unexpected::Str(value), &self)),
            }
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

/// Validates a ticker symbol.
///
/// Returns an error message if validation fails, None if valid. Symbols are
/// 1 to 10 characters, alphanumeric apart from `-` (e.g. `BRK-B`).
pub fn validate_symbol(symbol: &str) -> Option<String> {
    let valid = !symbol.is_empty()
        && symbol.chars().count() <= MAX_SYMBOL_LENGTH
        && symbol
            .chars()
            .filter(|c| *c != '-')
            .all(char::is_alphanumeric)
        && symbol.chars().any(|c| c != '-');

    if valid {
        None
    } else {
        Some("Invalid symbol format.".to_string())
    }
}

/// Validates search keywords: non-empty and at most 50 characters.
pub fn validate_keywords(keywords: &str) -> Option<String> {
    if keywords.is_empty() || keywords.chars().count() > MAX_KEYWORDS_LENGTH {
        Some("Invalid keywords.".to_string())
    } else {
        None
    }
}
