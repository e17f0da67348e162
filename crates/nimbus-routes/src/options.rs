//! Normalized route options

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A fully expanded route rule. Holds no shorthand flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteOptions(Map<String, Value>);

/// Canonical redirect record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub to: String,
    pub status_code: u16,
}

/// Canonical cache record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheOptions {
    #[serde(default)]
    pub swr: bool,

    /// Seconds; kept as written, fractional or not
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<f64>,

    #[serde(default, rename = "static")]
    pub is_static: bool,
}

impl RouteOptions {
    pub(crate) fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Typed view of `redirect`, if present and well formed
    pub fn redirect(&self) -> Option<Redirect> {
        serde_json::from_value(self.0.get("redirect")?.clone()).ok()
    }

    /// Typed view of `cache`, if present and well formed
    pub fn cache(&self) -> Option<CacheOptions> {
        serde_json::from_value(self.0.get("cache")?.clone()).ok()
    }

    /// String-valued response headers; other values are skipped
    pub fn headers(&self) -> BTreeMap<String, String> {
        match self.0.get("headers") {
            Some(Value::Object(headers)) => headers
                .iter()
                .filter_map(|(name, value)| Some((name.clone(), value.as_str()?.to_string())))
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    /// Any field by name
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
