//! Parsing route rules into explicit directives.

use nimbus_merge::deep_merge;
use serde_json::{json, Map, Number, Value};

use crate::options::RouteOptions;
use crate::{CORS_HEADERS, DEFAULT_REDIRECT_STATUS, DEFAULT_REDIRECT_TO};

/// Where a `redirect` shorthand points
#[derive(Debug, Clone, PartialEq)]
pub enum RedirectTarget {
    /// `redirect = "/new"`
    Path(String),
    /// `redirect = { to = "/new", status_code = 301 }`, possibly partial
    Object(Map<String, Value>),
}

/// A recognized shorthand flag on a route rule
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Redirect(RedirectTarget),
    Cors,
    Swr { max_age: Option<Number> },
    Static,
}

/// A route rule split into directives and passthrough fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteRule {
    pub directives: Vec<Directive>,
    pub fields: Map<String, Value>,
}

impl RouteRule {
    /// Split a raw rule into directives.
    ///
    /// Shorthand keys are always consumed. Any truthy value enables its flag
    /// (`true`, a non-zero number, a non-empty string, an object or array);
    /// falsy ones (`false`, `0`, `""`, `null`) produce no directive. A truthy
    /// `redirect` that is neither a string nor an object redirects to the
    /// defaults, and only a numeric `swr` sets `max_age`.
    pub fn parse(rule: Map<String, Value>) -> Self {
        let mut fields = rule;
        let mut directives = Vec::new();

        match fields.remove("redirect") {
            Some(Value::String(to)) if !to.is_empty() => {
                directives.push(Directive::Redirect(RedirectTarget::Path(to)));
            }
            Some(Value::Object(target)) => {
                directives.push(Directive::Redirect(RedirectTarget::Object(target)));
            }
            Some(other) if is_truthy(&other) => {
                directives.push(Directive::Redirect(RedirectTarget::Object(Map::new())));
            }
            _ => {}
        }

        if fields.remove("cors").is_some_and(|cors| is_truthy(&cors)) {
            directives.push(Directive::Cors);
        }

        match fields.remove("swr") {
            Some(Value::Number(seconds)) if is_truthy_number(&seconds) => {
                directives.push(Directive::Swr {
                    max_age: Some(seconds),
                });
            }
            Some(other) if is_truthy(&other) => directives.push(Directive::Swr { max_age: None }),
            _ => {}
        }

        if fields.remove("static").is_some_and(|flag| is_truthy(&flag)) {
            directives.push(Directive::Static);
        }

        Self { directives, fields }
    }

    /// Apply every directive to the passthrough fields.
    pub fn expand(self) -> RouteOptions {
        let mut options = self.fields;
        for directive in &self.directives {
            directive.apply(&mut options);
        }
        RouteOptions::from_map(options)
    }
}

impl Directive {
    /// Expand this directive into `options`.
    pub fn apply(&self, options: &mut Map<String, Value>) {
        match self {
            Directive::Redirect(RedirectTarget::Path(to)) => {
                options.insert(
                    "redirect".to_string(),
                    json!({"to": to, "status_code": DEFAULT_REDIRECT_STATUS}),
                );
            }
            Directive::Redirect(RedirectTarget::Object(target)) => {
                let defaults = json!({"to": DEFAULT_REDIRECT_TO, "status_code": DEFAULT_REDIRECT_STATUS});
                options.insert(
                    "redirect".to_string(),
                    deep_merge(defaults, Value::Object(target.clone())),
                );
            }
            Directive::Cors => {
                let cors: Map<String, Value> = CORS_HEADERS
                    .iter()
                    .map(|(name, value)| (name.to_string(), json!(value)))
                    .collect();
                let explicit = match options.remove("headers") {
                    Some(headers @ Value::Object(_)) => headers,
                    _ => Value::Null,
                };
                options.insert("headers".to_string(), deep_merge(Value::Object(cors), explicit));
            }
            Directive::Swr { max_age } => update_cache(options, |cache| {
                cache.insert("swr".to_string(), Value::Bool(true));
                if let Some(seconds) = max_age {
                    cache.insert("max_age".to_string(), Value::Number(seconds.clone()));
                }
            }),
            Directive::Static => update_cache(options, |cache| {
                cache.insert("static".to_string(), Value::Bool(true));
            }),
        }
    }
}

fn is_truthy_number(n: &Number) -> bool {
    n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan())
}

/// Whether a shorthand value switches its flag on
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => is_truthy_number(n),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// A non-object `cache` is replaced, not merged.
fn update_cache<F>(options: &mut Map<String, Value>, update: F)
where
    F: FnOnce(&mut Map<String, Value>),
{
    let mut cache = match options.remove("cache") {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    update(&mut cache);
    options.insert("cache".to_string(), Value::Object(cache));
}
