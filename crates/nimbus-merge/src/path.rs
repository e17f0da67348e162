//! Dotted-path access into option trees.
//!
//! `output.server_dir` walks object keys; a numeric segment indexes into an
//! array (`plugins.0`).

use serde_json::{Map, Value};

/// Get a value by dotted path
pub fn get_path<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = tree;
    for part in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Set a value by dotted path.
///
/// A numeric segment addresses an existing array element. Any other missing
/// or non-object intermediate node is replaced by an empty object.
pub fn set_path(tree: &mut Value, path: &str, value: Value) {
    let mut current = tree;
    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        let last = parts.peek().is_none();

        let index = match &*current {
            Value::Array(items) => part.parse::<usize>().ok().filter(|i| *i < items.len()),
            _ => None,
        };
        if let Some(index) = index {
            if last {
                current[index] = value;
                return;
            }
            current = &mut current[index];
            continue;
        }

        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Some(map) = current.as_object_mut() else {
            return;
        };
        if last {
            map.insert(part.to_string(), value);
            return;
        }
        current = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}
