//! Request Descriptor Module
//!
//! Normalized identity of a single logical upstream call, used as the basis
//! for cache keys in both cache tiers.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::Serialize;
use serde_json::ser::Formatter;

/// Query parameter carrying the upstream credential.
pub const CREDENTIAL_PARAM: &str = "apikey";

/// Query parameter carrying the upstream function name.
pub const FUNCTION_PARAM: &str = "function";

// == Request Descriptor ==
/// A function name plus named arguments.
///
/// Arguments are kept in a sorted map, so two descriptors built with the same
/// arguments in a different order are equal and derive the same cache key.
/// The credential is never stored here; the client attaches it to the
/// outbound query only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestDescriptor {
    function: String,
    args: BTreeMap<String, String>,
}

impl RequestDescriptor {
    // == Constructor ==
    /// Creates a descriptor for the given upstream function with no arguments.
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            args: BTreeMap::new(),
        }
    }

    // == Builder ==
    /// Adds a named argument.
    ///
    /// The credential parameter and the function parameter are ignored: the
    /// former must never reach a cache key, the latter is owned by the
    /// descriptor itself.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if name != CREDENTIAL_PARAM && name != FUNCTION_PARAM {
            self.args.insert(name, value.into());
        }
        self
    }

    /// Upstream function name.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Value of a named argument, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }

    // == Cache Key ==
    /// Derives the cache key: `FUNCTION:{"arg": "value", ...}`.
    ///
    /// The JSON object contains the function and every argument, sorted by
    /// name, written with `", "`/`": "` separators and ASCII-only escapes so
    /// keys match rows already present in existing cache databases.
    pub fn cache_key(&self) -> String {
        let mut fields: BTreeMap<&str, &str> = self
            .args
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        fields.insert(FUNCTION_PARAM, &self.function);

        let mut encoded = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut encoded, KeyFormatter);
        // A map of strings always serializes.
        let _ = fields.serialize(&mut serializer);
        format!("{}:{}", self.function, String::from_utf8_lossy(&encoded))
    }

    // == Query Parameters ==
    /// Outbound query parameters, credential appended last.
    pub fn query_pairs<'a>(&'a self, api_key: &'a str) -> Vec<(&'a str, &'a str)> {
        let mut pairs = Vec::with_capacity(self.args.len() + 2);
        pairs.push((FUNCTION_PARAM, self.function.as_str()));
        pairs.extend(self.args.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        pairs.push((CREDENTIAL_PARAM, api_key));
        pairs
    }
}

// == Key Formatter ==
/// JSON formatter for cache keys: spaced separators, non-ASCII escaped as
/// lowercase `\uXXXX` (UTF-16 units).
struct KeyFormatter;

impl Formatter for KeyFormatter {
    fn begin_object_key<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        if fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}
