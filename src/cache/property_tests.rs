//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check key derivation and both cache tiers against
//! arbitrary inputs.

use proptest::prelude::*;
use serde_json::json;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::cache::{PersistentCache, RequestDescriptor, VolatileCache, CREDENTIAL_PARAM};

// == Strategies ==
/// Generates upstream function names
fn function_strategy() -> impl Strategy<Value = String> {
    "[A-Z_]{1,24}".prop_map(|s| s)
}

/// Generates argument sets (unique names, excluding reserved ones)
fn args_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::hash_map("[a-z]{1,12}", "[A-Za-z0-9 .-]{0,24}", 0..8).prop_map(|m| {
        m.into_iter()
            .filter(|(k, _)| k != CREDENTIAL_PARAM && k != "function")
            .collect()
    })
}

/// Generates JSON-like payloads
fn payload_strategy() -> impl Strategy<Value = serde_json::Value> {
    prop::collection::hash_map("[a-zA-Z0-9 .]{1,16}", "[a-zA-Z0-9 .]{0,32}", 1..6)
        .prop_map(|m: HashMap<String, String>| json!(m))
}

fn build(function: &str, args: &[(String, String)]) -> RequestDescriptor {
    args.iter()
        .fold(RequestDescriptor::new(function), |d, (k, v)| d.arg(k.clone(), v.clone()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Reordering the arguments of a descriptor never changes its key.
    #[test]
    fn prop_key_invariant_under_reordering(
        function in function_strategy(),
        args in args_strategy(),
        rotate in 0usize..8,
    ) {
        let forward = build(&function, &args);

        let mut shuffled = args.clone();
        shuffled.reverse();
        if !shuffled.is_empty() {
            let n = rotate % shuffled.len();
            shuffled.rotate_left(n);
        }
        let reordered = build(&function, &shuffled);

        prop_assert_eq!(forward.cache_key(), reordered.cache_key());
    }

    // Adding a credential, whatever its value, never changes the key.
    #[test]
    fn prop_credential_excluded_from_key(
        function in function_strategy(),
        args in args_strategy(),
        secret in "[A-Za-z0-9]{8,32}",
    ) {
        let without = build(&function, &args);
        let with = build(&function, &args).arg(CREDENTIAL_PARAM, secret.clone());

        prop_assert_eq!(without.cache_key(), with.cache_key());
    }

    // A set followed by a get before expiry returns the stored payload.
    #[test]
    fn prop_volatile_roundtrip(key in "[a-zA-Z0-9_:]{1,64}", payload in payload_strategy()) {
        let cache = VolatileCache::default();
        cache.set(key.clone(), payload.clone());
        prop_assert_eq!(cache.get(&key), Some(payload));
    }

    // A get past the TTL returns nothing and removes the entry.
    #[test]
    fn prop_volatile_expiry_evicts(
        key in "[a-zA-Z0-9_:]{1,64}",
        payload in payload_strategy(),
        ttl_secs in 1u64..3600,
        overshoot_ms in 1u64..10_000,
    ) {
        let cache = VolatileCache::new(Duration::from_secs(ttl_secs));
        let start = Instant::now();
        cache.set_at(key.clone(), payload, start);

        let later = start + Duration::from_secs(ttl_secs) + Duration::from_millis(overshoot_ms);
        prop_assert!(cache.get_at(&key, later).is_none());
        prop_assert!(!cache.contains(&key));
    }

    // Persistent rows are fresh up to their TTL and stale one second later.
    #[test]
    fn prop_persistent_staleness_boundary(
        payload in payload_strategy(),
        ttl in 1u64..100_000,
        fetched_at in 1_600_000_000i64..1_900_000_000,
    ) {
        let cache = PersistentCache::open_in_memory(600).unwrap();
        cache.save_at("k", &payload, Some(ttl), None, fetched_at).unwrap();

        let boundary = fetched_at + ttl as i64;
        let fresh = cache.get_at("k", false, boundary).unwrap();
        prop_assert_eq!(fresh.map(|e| (e.payload, e.stale)), Some((payload.clone(), false)));

        prop_assert!(cache.get_at("k", false, boundary + 1).unwrap().is_none());
        let stale = cache.get_at("k", true, boundary + 1).unwrap();
        prop_assert_eq!(stale.map(|e| (e.payload, e.stale)), Some((payload, true)));
    }
}
