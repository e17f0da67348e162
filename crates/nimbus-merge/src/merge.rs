//! Configuration merge logic
//!
//! Merge rules, applied per key:
//! - Undefined overlay (missing key or `null`): base kept
//! - Objects: deep-merge by key (recursive)
//! - Arrays: overlay elements first, then base elements not already present
//! - `false` base under an object overlay: stays `false`
//! - Scalars and type conflicts: overlay wins

use serde_json::{Map, Value};

/// Deep merge two option trees, `overlay` taking precedence over `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        // Undefined never replaces anything
        (base, Value::Null) => base,

        // Both objects: deep merge
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None if overlay_value.is_null() => continue,
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }

        // A section disabled with `false` ignores later sub-key merges
        (Value::Bool(false), Value::Object(_)) => Value::Bool(false),

        // Arrays: overlay first, base-only entries appended in base order
        (Value::Array(base_items), Value::Array(overlay_items)) => {
            let mut merged = overlay_items;
            for item in base_items {
                if !merged.contains(&item) {
                    merged.push(item);
                }
            }
            Value::Array(merged)
        }

        // Scalars and any other case: overlay wins
        (_, overlay) => overlay,
    }
}

/// Merge multiple config layers in order (first is base, last has highest precedence)
pub fn merge_layers<I>(layers: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    layers
        .into_iter()
        .fold(Value::Object(Map::new()), deep_merge)
}

/// Remove structural duplicates, keeping the first occurrence of each value.
pub fn dedupe(values: Vec<Value>) -> Vec<Value> {
    let mut unique: Vec<Value> = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}
