//! User configuration layers
//!
//! A [`LayerLoader`] produces the user layers of one resolution, base-most
//! first, following `extends` chains. [`FileLayerLoader`] reads them from
//! disk; [`StaticLayers`] serves fixed trees.

mod file;

pub use file::{FileLayerLoader, CONFIG_EXTENSIONS, DEFAULT_CONFIG_NAME};

use serde_json::Value;
use std::path::Path;

use crate::config::{ConfigError, ConfigOrigin, ConfigSource, Diagnostic};
use crate::preset::PresetRegistry;

/// Key naming the layers a config file builds upon
pub const EXTENDS_KEY: &str = "extends";

/// One user layer and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLayer {
    pub source: ConfigSource,
    pub config: Value,
}

/// Layers in merge order (lowest precedence first)
#[derive(Debug, Clone, Default)]
pub struct LoadedLayers {
    pub layers: Vec<ConfigLayer>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Source of the user configuration layers
pub trait LayerLoader {
    /// Load the layers rooted at the project directory `root`. Bare
    /// `extends` identifiers are looked up in `presets`.
    fn load(&self, root: &Path, presets: &PresetRegistry) -> Result<LoadedLayers, ConfigError>;
}

/// Fixed in-memory layers, base-most first
#[derive(Debug, Clone, Default)]
pub struct StaticLayers(pub Vec<Value>);

impl StaticLayers {
    pub fn new(layers: Vec<Value>) -> Self {
        Self(layers)
    }
}

impl LayerLoader for StaticLayers {
    fn load(&self, _root: &Path, _presets: &PresetRegistry) -> Result<LoadedLayers, ConfigError> {
        Ok(LoadedLayers {
            layers: self
                .0
                .iter()
                .map(|config| ConfigLayer {
                    source: ConfigSource::new(ConfigOrigin::User),
                    config: config.clone(),
                })
                .collect(),
            diagnostics: Vec::new(),
        })
    }
}

/// Entries of an `extends` value: a single string or a list of strings
pub(crate) fn extends_entries(value: &Value) -> Vec<String> {
    match value {
        Value::String(entry) if !entry.trim().is_empty() => vec![entry.trim().to_string()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
