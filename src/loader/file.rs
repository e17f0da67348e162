//! On-disk config files (`nimbus.config.toml` / `nimbus.config.json`)

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{extends_entries, ConfigLayer, LayerLoader, LoadedLayers, EXTENDS_KEY};
use crate::config::{sha256_hex, ConfigError, ConfigOrigin, ConfigSource, Diagnostic};
use crate::paths::{display, normalize};
use crate::preset::PresetRegistry;

/// Base name of the project config file
pub const DEFAULT_CONFIG_NAME: &str = "nimbus.config";

/// Recognized config file extensions, in lookup order
pub const CONFIG_EXTENSIONS: &[&str] = &["toml", "json"];

/// Loads the project config file and everything it extends.
#[derive(Debug, Clone)]
pub struct FileLayerLoader {
    name: String,
}

impl Default for FileLayerLoader {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_NAME)
    }
}

impl FileLayerLoader {
    /// Loader for `<name>.toml` / `<name>.json`
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The config file in `dir`, if any
    pub fn find_config(&self, dir: &Path) -> Option<PathBuf> {
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", self.name, ext)))
            .find(|candidate| candidate.is_file())
    }

    /// Locate the file an `extends` entry points at, relative to `dir`
    fn find_extended(&self, dir: &Path, entry: &str) -> Option<PathBuf> {
        let target = normalize(&dir.join(entry));
        if target.is_file() {
            return Some(target);
        }
        if target.is_dir() {
            return self.find_config(&target);
        }
        CONFIG_EXTENSIONS
            .iter()
            .map(|ext| PathBuf::from(format!("{}.{}", target.display(), ext)))
            .find(|candidate| candidate.is_file())
    }

    fn load_chain(
        &self,
        path: &Path,
        origin: ConfigOrigin,
        presets: &PresetRegistry,
        stack: &mut Vec<PathBuf>,
        loaded: &mut LoadedLayers,
    ) -> Result<(), ConfigError> {
        let path = normalize(path);
        if stack.contains(&path) {
            let chain: Vec<String> = stack
                .iter()
                .chain(std::iter::once(&path))
                .map(|p| display(p))
                .collect();
            return Err(ConfigError::ExtendsCycle(chain.join(" -> ")));
        }
        stack.push(path.clone());

        let (mut config, digest) = load_config_file(&path)?;
        let extends = config
            .as_object_mut()
            .and_then(|map| map.remove(EXTENDS_KEY))
            .map(|value| extends_entries(&value))
            .unwrap_or_default();

        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        // Earlier entries take precedence, so the last one is merged first.
        for entry in extends.iter().rev() {
            if is_path_like(entry) {
                let target = self.find_extended(&dir, entry).ok_or_else(|| {
                    ConfigError::IoError(format!(
                        "cannot find config '{}' extended by {}",
                        entry,
                        path.display()
                    ))
                })?;
                self.load_chain(&target, ConfigOrigin::Extends, presets, stack, loaded)?;
            } else if let Some(mut preset) = presets.get(entry) {
                debug!(preset = %entry, by = %path.display(), "extending preset");
                if let Some(map) = preset.as_object_mut() {
                    map.remove(EXTENDS_KEY);
                }
                loaded.layers.push(ConfigLayer {
                    source: ConfigSource::preset(ConfigOrigin::Extends, entry),
                    config: preset,
                });
            } else {
                loaded.diagnostics.push(Diagnostic::PresetNotFound {
                    id: entry.clone(),
                    requested_by: display(&path),
                });
            }
        }

        stack.pop();
        debug!(path = %path.display(), ?origin, "loaded config file");
        loaded.layers.push(ConfigLayer {
            source: ConfigSource::file(origin, &path, digest),
            config,
        });
        Ok(())
    }
}

impl LayerLoader for FileLayerLoader {
    fn load(&self, root: &Path, presets: &PresetRegistry) -> Result<LoadedLayers, ConfigError> {
        let mut loaded = LoadedLayers::default();
        let Some(path) = self.find_config(root) else {
            debug!(root = %root.display(), "no config file found");
            return Ok(loaded);
        };
        self.load_chain(&path, ConfigOrigin::User, presets, &mut Vec::new(), &mut loaded)?;
        Ok(loaded)
    }
}

fn is_path_like(entry: &str) -> bool {
    entry.starts_with('.')
        || entry.contains('/')
        || entry.contains('\\')
        || CONFIG_EXTENSIONS
            .iter()
            .any(|ext| entry.ends_with(&format!(".{}", ext)))
}

/// Read and parse a config file, returning the tree and the digest of its
/// raw bytes
pub fn load_config_file(path: &Path) -> Result<(Value, String), ConfigError> {
    let bytes = fs::read(path)
        .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
    let digest = sha256_hex(&bytes);

    let contents = String::from_utf8(bytes)
        .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8 in {}: {}", path.display(), e)))?;

    let value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents).map_err(|e| {
            ConfigError::ParseError(format!("JSON parse error in {}: {}", path.display(), e))
        })?,
        _ => {
            let table: toml::Value = toml::from_str(&contents).map_err(|e| {
                ConfigError::ParseError(format!("TOML parse error in {}: {}", path.display(), e))
            })?;
            toml_to_json(table)
        }
    };

    if !value.is_object() {
        return Err(ConfigError::ParseError(format!(
            "{}: config must be a table/object",
            path.display()
        )));
    }
    Ok((value, digest))
}

/// Convert a TOML value to a JSON value
fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
