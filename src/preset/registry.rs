//! Preset registry keyed by normalized identifier

use serde_json::Value;
use std::collections::BTreeMap;

use super::builtin;

/// Produces a preset's option tree
#[derive(Debug, Clone)]
pub enum PresetProvider {
    /// A fixed tree
    Tree(Value),
    /// Built on every lookup
    Factory(fn() -> Value),
}

impl PresetProvider {
    /// The option tree contributed by this preset
    pub fn config(&self) -> Value {
        match self {
            PresetProvider::Tree(tree) => tree.clone(),
            PresetProvider::Factory(build) => build(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    id: String,
    provider: PresetProvider,
}

/// Registry of presets.
///
/// Identifiers are normalized once when registered and once when looked up,
/// so `node-server`, `nodeServer`, `NODE_SERVER` all name the same preset.
#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    presets: BTreeMap<String, Entry>,
}

/// Case-fold an identifier and drop separators.
pub fn normalize_id(id: &str) -> String {
    id.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl PresetRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in presets
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry
    }

    /// Register a preset, returning the provider it replaced (if any)
    pub fn register(&mut self, id: &str, provider: PresetProvider) -> Option<PresetProvider> {
        self.presets
            .insert(
                normalize_id(id),
                Entry {
                    id: id.to_string(),
                    provider,
                },
            )
            .map(|previous| previous.provider)
    }

    /// Look up a preset's option tree
    pub fn get(&self, id: &str) -> Option<Value> {
        self.presets
            .get(&normalize_id(id))
            .map(|entry| entry.provider.config())
    }

    /// Check if a preset is registered
    pub fn contains(&self, id: &str) -> bool {
        self.presets.contains_key(&normalize_id(id))
    }

    /// Registered identifiers as given at registration, sorted by normalized key
    pub fn ids(&self) -> Vec<&str> {
        self.presets.values().map(|entry| entry.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
