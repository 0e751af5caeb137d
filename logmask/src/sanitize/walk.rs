//! Recursive mask-and-truncate over flattened metadata.

use serde_json::{Map, Value};

use super::policy::{mask, truncate};
use crate::config::SanitizerConfig;

/// Returns a sanitized copy of `node`.
///
/// Object fields whose name is block-listed are masked and never truncated.
/// Nested objects and arrays are walked; any other value is truncated.
/// `node` is only borrowed, so a caller holding it sees no change.
pub fn walk(node: &Value, config: &SanitizerConfig) -> Value {
    match node {
        Value::Array(items) => Value::Array(items.iter().map(|item| walk(item, config)).collect()),
        Value::Object(entries) => Value::Object(walk_object(entries, config)),
        scalar => truncate(scalar.clone(), config.max_log_value_length),
    }
}

pub(crate) fn walk_object(
    entries: &Map<String, Value>,
    config: &SanitizerConfig,
) -> Map<String, Value> {
    entries
        .iter()
        .map(|(key, value)| {
            let sanitized = if config.block_list.is_sensitive(key) {
                mask(value, config.visible_chars, config.max_masked_chars)
            } else if value.is_object() || value.is_array() {
                walk(value, config)
            } else {
                truncate(value.clone(), config.max_log_value_length)
            };
            (key.clone(), sanitized)
        })
        .collect()
}
