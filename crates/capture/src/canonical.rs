// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical JSON and request fingerprints.
//!
//! Record and replay must agree on these bytes exactly, otherwise a replay
//! silently misses. Object keys are sorted at every depth and the output is
//! compact, so two requests that differ only in key order hash the same.

use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

/// Rebuild `value` with the keys of every nested object in sorted order.
///
/// Keys are re-inserted in order, so the result is sorted whether or not
/// `serde_json` was built with `preserve_order`.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::with_capacity(entries.len());
            for (key, item) in entries {
                sorted.insert(key.clone(), canonicalize(item));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Compact, key-sorted JSON text for `value`.
pub fn canonical_json(value: &Value) -> String {
    canonicalize(value).to_string()
}

/// The normalized `{provider, model, request}` document that gets hashed.
pub fn normalize_request(provider: &str, model: &str, request: &Value) -> Value {
    canonicalize(&json!({
        "provider": provider,
        "model": model,
        "request": request,
    }))
}

/// Content address of a provider request: hex SHA-256 of its canonical form.
pub fn fingerprint(provider: &str, model: &str, request: &Value) -> String {
    let normalized = normalize_request(provider, model, request);
    let digest = Sha256::digest(canonical_json(&normalized).as_bytes());
    hex::encode(digest)
}

#[cfg(test)]
#[path = "canonical_tests.rs"]
mod tests;
