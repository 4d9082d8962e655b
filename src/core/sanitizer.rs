//! Metadata sanitization
//!
//! Runs on every entry that passes the level filter, before the entry is
//! buffered or written. Sensitive keys are redacted and nested values are
//! deep-copied through a JSON round trip so that nothing shared with the
//! caller (and nothing cyclic) ever reaches a transport.

use super::meta::{Meta, MetaValue};

/// Replacement for values under sensitive keys
pub const REDACTED: &str = "[REDACTED]";

/// Replacement for nested values that cannot be copied
pub const CIRCULAR_REFERENCE: &str = "[CIRCULAR_REFERENCE]";

/// Lower-case fragments that mark a key as sensitive
pub const SENSITIVE_KEY_FRAGMENTS: &[&str] = &["password", "token", "key", "secret", "auth"];

/// True when the key name contains a sensitive fragment (case-insensitive)
pub fn is_sensitive_key(key: &str) -> bool {
    let lowered = key.to_lowercase();
    SENSITIVE_KEY_FRAGMENTS
        .iter()
        .any(|fragment| lowered.contains(fragment))
}

/// Produce a sanitized copy of `meta`. Never fails.
pub fn sanitize(meta: &Meta) -> Meta {
    meta.iter()
        .map(|(key, value)| (key.clone(), sanitize_field(key, value)))
        .collect()
}

fn sanitize_field(key: &str, value: &MetaValue) -> MetaValue {
    if is_sensitive_key(key) {
        return MetaValue::String(REDACTED.to_string());
    }

    if !value.is_nested() {
        return value.clone();
    }

    match value.to_json() {
        Ok(mut json) => {
            redact_nested(&mut json);
            MetaValue::from(json)
        }
        Err(_) => MetaValue::String(CIRCULAR_REFERENCE.to_string()),
    }
}

fn redact_nested(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(object) => {
            for (key, child) in object.iter_mut() {
                if is_sensitive_key(key) {
                    *child = serde_json::Value::String(REDACTED.to_string());
                } else {
                    redact_nested(child);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(redact_nested),
        _ => {}
    }
}
