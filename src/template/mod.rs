//! Path templates
//!
//! String options may embed `{{ dotted.path }}` placeholders naming other
//! options (`output.server_dir = "{{ output.dir }}/server"`). Placeholders
//! are expanded against the merged option tree; a referenced value is itself
//! expanded first, up to [`MAX_TEMPLATE_DEPTH`] levels.

use nimbus_merge::{get_path, set_path};
use regex_lite::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;

use crate::paths;

/// Deepest chain of nested placeholder references before giving up
pub const MAX_TEMPLATE_DEPTH: usize = 8;

/// Template expansion errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("template '{template}' exceeds {depth} nested substitutions; it probably references itself")]
    Cycle { template: String, depth: usize },
}

/// A template failure attributed to the option that held the template
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("option '{field}': {source}")]
pub struct FieldError {
    pub field: String,
    #[source]
    pub source: TemplateError,
}

fn placeholder_re() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([\w.\-]+)\s*\}\}").expect("placeholder pattern is valid")
    })
}

/// Check if a string holds at least one placeholder
pub fn has_placeholders(raw: &str) -> bool {
    placeholder_re().is_match(raw)
}

/// Expand every placeholder in `raw` against `tree`.
///
/// A reference to a missing or `null` option is replaced by its own dotted
/// path and logged.
pub fn resolve_template(tree: &Value, raw: &str) -> Result<String, TemplateError> {
    expand(tree, raw, raw, 0)
}

fn expand(tree: &Value, raw: &str, origin: &str, depth: usize) -> Result<String, TemplateError> {
    if !has_placeholders(raw) {
        return Ok(raw.to_string());
    }
    if depth >= MAX_TEMPLATE_DEPTH {
        return Err(TemplateError::Cycle {
            template: origin.to_string(),
            depth: MAX_TEMPLATE_DEPTH,
        });
    }

    let mut expanded = String::with_capacity(raw.len());
    let mut last = 0;
    for caps in placeholder_re().captures_iter(raw) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let key = &caps[1];
        expanded.push_str(&raw[last..whole.start()]);

        let replacement = match get_path(tree, key) {
            Some(Value::String(value)) => expand(tree, value, origin, depth + 1)?,
            Some(Value::Null) | None => {
                warn!(param = key, template = origin, "cannot resolve template param");
                key.to_string()
            }
            Some(other) => other.to_string(),
        };
        expanded.push_str(&replacement);
        last = whole.end();
    }
    expanded.push_str(&raw[last..]);
    Ok(expanded)
}

/// Expand a path template, substitute a leading alias, and make it absolute
/// against `base`.
///
/// When several `alias` keys prefix the path the longest one is used.
pub fn resolve_path(tree: &Value, raw: &str, base: &Path) -> Result<String, TemplateError> {
    let expanded = resolve_template(tree, raw)?;
    let aliased = apply_alias(tree, &expanded);
    Ok(paths::display(&paths::resolve(base, &aliased)))
}

/// Resolve the string option at dotted path `field` in place.
///
/// Returns the resolved value, or `None` when the option is unset or not a
/// string.
pub fn resolve_field(tree: &mut Value, field: &str, base: &Path) -> Result<Option<String>, FieldError> {
    let Some(raw) = get_path(tree, field).and_then(Value::as_str) else {
        return Ok(None);
    };
    let resolved = resolve_path(tree, raw, base).map_err(|source| FieldError {
        field: field.to_string(),
        source,
    })?;
    set_path(tree, field, Value::String(resolved.clone()));
    Ok(Some(resolved))
}

fn apply_alias(tree: &Value, path: &str) -> String {
    let Some(Value::Object(aliases)) = tree.get("alias") else {
        return path.to_string();
    };
    aliases
        .iter()
        .filter_map(|(prefix, target)| Some((prefix, target.as_str()?)))
        .filter(|(prefix, _)| alias_matches(prefix, path))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(prefix, target)| format!("{}{}", target, &path[prefix.len()..]))
        .unwrap_or_else(|| path.to_string())
}

// An alias only matches whole path segments: `#internal/nimbus` covers
// `#internal/nimbus/x` but not `#internal/nimbusfoo/x`.
fn alias_matches(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => prefix.ends_with('/') || rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_reference() {
        let tree = json!({
            "root_dir": "/app",
            "output": {
                "dir": "{{ root_dir }}/.output",
                "server_dir": "{{ output.dir }}/server"
            }
        });
        assert_eq!(
            resolve_template(&tree, "{{ output.dir }}").unwrap(),
            "/app/.output"
        );
        assert_eq!(
            resolve_template(&tree, "{{ output.server_dir }}").unwrap(),
            "/app/.output/server"
        );
    }

    #[test]
    fn test_whitespace_optional() {
        let tree = json!({"root_dir": "/app"});
        assert_eq!(resolve_template(&tree, "{{root_dir}}/x").unwrap(), "/app/x");
        assert_eq!(resolve_template(&tree, "{{   root_dir }}/x").unwrap(), "/app/x");
    }

    #[test]
    fn test_multiple_placeholders() {
        let tree = json!({"root_dir": "/app", "build_dir": ".nimbus"});
        assert_eq!(
            resolve_template(&tree, "{{ root_dir }}/{{ build_dir }}/cache").unwrap(),
            "/app/.nimbus/cache"
        );
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let tree = json!({"a": "{{ a }}"});
        let err = resolve_template(&tree, "{{ a }}").unwrap_err();
        assert_eq!(
            err,
            TemplateError::Cycle {
                template: "{{ a }}".to_string(),
                depth: MAX_TEMPLATE_DEPTH
            }
        );
    }

    #[test]
    fn test_mutual_reference_is_cycle() {
        let tree = json!({"a": "{{ b }}/x", "b": "{{ a }}/y"});
        assert!(matches!(
            resolve_template(&tree, "{{ a }}"),
            Err(TemplateError::Cycle { .. })
        ));
    }

    #[test]
    fn test_missing_reference_uses_key() {
        let tree = json!({});
        assert_eq!(
            resolve_template(&tree, "{{ nowhere.dir }}/x").unwrap(),
            "nowhere.dir/x"
        );
    }

    #[test]
    fn test_scalar_references() {
        let tree = json!({"port": 3000, "dev": true});
        assert_eq!(
            resolve_template(&tree, "{{ port }}-{{ dev }}").unwrap(),
            "3000-true"
        );
    }

    #[test]
    fn test_plain_string_untouched() {
        assert_eq!(resolve_template(&json!({}), "/srv/www").unwrap(), "/srv/www");
    }

    #[test]
    fn test_resolve_path_relative_to_base() {
        let tree = json!({"build_dir": ".nimbus"});
        assert_eq!(
            resolve_path(&tree, "{{ build_dir }}/dev", Path::new("/app")).unwrap(),
            "/app/.nimbus/dev"
        );
    }

    #[test]
    fn test_resolve_field_in_place() {
        let mut tree = json!({
            "root_dir": "/app",
            "output": {"dir": "{{ root_dir }}/.output", "server_dir": "{{ output.dir }}/server"}
        });
        let base = Path::new("/app");

        assert_eq!(
            resolve_field(&mut tree, "output.server_dir", base).unwrap(),
            Some("/app/.output/server".to_string())
        );
        assert_eq!(tree["output"]["server_dir"], "/app/.output/server");
        assert_eq!(resolve_field(&mut tree, "output.missing", base).unwrap(), None);
    }

    #[test]
    fn test_resolve_field_names_field_on_cycle() {
        let mut tree = json!({"entry": "{{ entry }}/x"});
        let err = resolve_field(&mut tree, "entry", Path::new("/app")).unwrap_err();
        assert_eq!(err.field, "entry");
        assert!(matches!(err.source, TemplateError::Cycle { .. }));
    }

    #[test]
    fn test_resolve_path_longest_alias() {
        let tree = json!({
            "alias": {
                "#internal/nimbus": "/opt/nimbus/runtime",
                "#internal/nimbus/entries": "/opt/nimbus/entries",
                "~/": "/app/src/"
            }
        });
        assert_eq!(
            resolve_path(&tree, "#internal/nimbus/entries/node-server", Path::new("/app")).unwrap(),
            "/opt/nimbus/entries/node-server"
        );
        assert_eq!(
            resolve_path(&tree, "~/plugins/auth", Path::new("/app")).unwrap(),
            "/app/src/plugins/auth"
        );
    }

    #[test]
    fn test_alias_matches_whole_segments() {
        let tree = json!({"alias": {"#internal/nimbus": "/opt/nimbus/runtime", "~/": "/app/src/"}});
        let base = Path::new("/app");
        assert_eq!(
            resolve_path(&tree, "#internal/nimbus/entries/node", base).unwrap(),
            "/opt/nimbus/runtime/entries/node"
        );
        assert_eq!(
            resolve_path(&tree, "#internal/nimbus", base).unwrap(),
            "/opt/nimbus/runtime"
        );
        assert_eq!(
            resolve_path(&tree, "#internal/nimbusfoo/x", base).unwrap(),
            "/app/#internal/nimbusfoo/x"
        );
        assert_eq!(resolve_path(&tree, "~/plugins/a", base).unwrap(), "/app/src/plugins/a");
    }
}
