//! Route rule shorthand expansion.
//!
//! Users declare per-route policy with compact flags (`redirect`, `cors`,
//! `swr`, `static`). The normalizer parses each rule into explicit
//! [`Directive`]s and expands every directive into its canonical form, so
//! consumers only ever see `redirect: {to, status_code}`, `headers: {..}`
//! and `cache: {swr, max_age, static}`.

mod directive;
mod options;

pub use directive::{is_truthy, Directive, RedirectTarget, RouteRule};
pub use options::{CacheOptions, Redirect, RouteOptions};

use serde_json::{Map, Value};

/// Status code used when a redirect does not name one.
pub const DEFAULT_REDIRECT_STATUS: u16 = 307;

/// Redirect target used when a redirect object does not name one.
pub const DEFAULT_REDIRECT_TO: &str = "/";

/// Headers added by `cors: true`, beneath any headers the route declares.
pub const CORS_HEADERS: &[(&str, &str)] = &[
    ("access-control-allow-origin", "*"),
    ("access-control-allowed-methods", "*"),
    ("access-control-allow-headers", "*"),
    ("access-control-max-age", "0"),
];

/// Keys that are consumed by normalization and never appear in the output.
pub const SHORTHAND_KEYS: &[&str] = &["cors", "swr", "static"];

/// Normalize a whole route map (path pattern -> rule).
///
/// One output entry per input key. Rules that are not objects pass through
/// untouched.
pub fn normalize_routes(routes: &Map<String, Value>) -> Map<String, Value> {
    routes
        .iter()
        .map(|(path, rule)| (path.clone(), normalize_route(rule)))
        .collect()
}

/// Normalize a single route rule.
pub fn normalize_route(rule: &Value) -> Value {
    match rule {
        Value::Object(fields) => RouteRule::parse(fields.clone()).expand().into_value(),
        other => other.clone(),
    }
}
