//! Auto-import section finalization
//!
//! `imports` configures which names are injected into server code without an
//! explicit import. `imports = false` disables it; the legacy `auto_import`
//! key is folded into `imports` here.

use nimbus_merge::deep_merge;
use serde_json::{json, Value};
use std::path::Path;
use tracing::debug;

use crate::paths::{display, ModuleResolver};

/// Package whose exports become auto-imported names
pub const EXPORTS_SOURCE: &str = "h3";

/// Exported names never offered as auto-imports
const EXCLUDED_EXPORTS: &[&str] = &["use"];

/// Names of `EXPORTS_SOURCE` eligible for auto-import: no types/classes
/// (leading uppercase) and nothing from [`EXCLUDED_EXPORTS`].
pub fn importable_exports(exports: Vec<String>) -> Vec<String> {
    exports
        .into_iter()
        .filter(|name| !name.starts_with(|c: char| c.is_ascii_uppercase()))
        .filter(|name| !EXCLUDED_EXPORTS.contains(&name.as_str()))
        .collect()
}

/// Fold `auto_import` into `imports`, exclude the build directory from
/// scanning and register the runtime's exports as an import preset.
pub fn finalize_imports(tree: &mut Value, build_dir: &Path, modules: &dyn ModuleResolver) {
    let Some(options) = tree.as_object_mut() else {
        return;
    };
    let legacy = options.remove("auto_import").unwrap_or(Value::Null);
    let imports = options.remove("imports").unwrap_or(Value::Null);

    let imports = if legacy == Value::Bool(false) || imports == Value::Bool(false) {
        Value::Bool(false)
    } else {
        match deep_merge(legacy, imports) {
            Value::Null => json!({}),
            merged => merged,
        }
    };
    options.insert("imports".to_string(), imports);

    let Some(Value::Object(imports)) = options.get_mut("imports") else {
        debug!("auto-imports disabled");
        return;
    };

    if let Some(Value::Array(exclude)) = imports.get_mut("exclude") {
        exclude.push(json!(display(build_dir)));
    }

    let names = importable_exports(modules.module_exports(EXPORTS_SOURCE));
    if names.is_empty() {
        debug!(package = EXPORTS_SOURCE, "no exports discovered; skipping import preset");
        return;
    }
    let preset = json!({"from": EXPORTS_SOURCE, "imports": names});
    match imports.get_mut("presets") {
        Some(Value::Array(presets)) => presets.push(preset),
        _ => {
            imports.insert("presets".to_string(), json!([preset]));
        }
    }
}
