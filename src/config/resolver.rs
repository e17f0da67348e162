//! Layered options resolution
//!
//! Precedence (lowest to highest):
//! 1. Built-in defaults
//! 2. Active preset
//! 3. User config and its `extends` chain (base-most first)
//! 4. Programmatic overrides

use nimbus_merge::{deep_merge, merge_layers, set_path};
use nimbus_routes::normalize_routes;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::defaults::BuiltinDefaults;
use super::env::EnvSignals;
use super::error::{ConfigError, Diagnostic};
use super::resolved::{ConfigOrigin, ConfigSource, ResolvedOptions};
use crate::imports::finalize_imports;
use crate::loader::{FileLayerLoader, LayerLoader};
use crate::paths::{
    apply_aliases, apply_module_aliases, apply_storage_mounts, default_scan_dirs, finalize_dirs,
    finalize_node_modules_dirs, finalize_public_assets, resolve, with_leading_slash,
    with_trailing_slash, ModuleResolver, NodeModulesResolver, ToolkitDirs,
};
use crate::preset::{explicit_preset, select_preset, PresetRegistry, DEFAULT_PRESET};
use crate::template::{resolve_field, FieldError};

/// Options holding paths resolved against `root_dir` after the merge
pub const PATH_FIELDS: &[&str] = &["entry", "output.dir", "output.server_dir", "output.public_dir"];

/// Resolves the final options from defaults, preset, user layers and
/// overrides.
pub struct OptionsResolver<'a> {
    presets: &'a PresetRegistry,
    loader: &'a dyn LayerLoader,
    modules: &'a dyn ModuleResolver,
    env: EnvSignals,
    toolkit: ToolkitDirs,
    cwd: Option<PathBuf>,
}

impl<'a> OptionsResolver<'a> {
    pub fn new(
        presets: &'a PresetRegistry,
        loader: &'a dyn LayerLoader,
        modules: &'a dyn ModuleResolver,
    ) -> Self {
        Self {
            presets,
            loader,
            modules,
            env: EnvSignals::default(),
            toolkit: ToolkitDirs::default(),
            cwd: None,
        }
    }

    pub fn with_env(mut self, env: EnvSignals) -> Self {
        self.env = env;
        self
    }

    pub fn with_toolkit_dirs(mut self, toolkit: ToolkitDirs) -> Self {
        self.toolkit = toolkit;
        self
    }

    /// Directory relative `root_dir` values resolve against (default: the
    /// process working directory)
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Resolve options for one build.
    pub fn resolve(&self, overrides: &Value) -> Result<ResolvedOptions, ConfigError> {
        let raw_overrides = overrides.clone();
        let overrides = if overrides.is_object() {
            overrides.clone()
        } else {
            if !overrides.is_null() {
                warn!("overrides are not an object; ignoring them");
            }
            json!({})
        };

        let dev = overrides.get("dev").and_then(Value::as_bool).unwrap_or(false);
        let explicit = explicit_preset(
            overrides.get("preset").and_then(Value::as_str),
            self.env.preset.as_deref(),
            dev,
        );

        let cwd = match &self.cwd {
            Some(cwd) => cwd.clone(),
            None => std::env::current_dir().map_err(|e| ConfigError::IoError(e.to_string()))?,
        };
        let root = resolve(&cwd, overrides.get("root_dir").and_then(Value::as_str).unwrap_or("."));

        let loaded = self.loader.load(&root, self.presets)?;
        let mut diagnostics = loaded.diagnostics;

        // The highest-precedence layer naming a preset wins over detection.
        let layer_preset = loaded
            .layers
            .iter()
            .rev()
            .find_map(|layer| layer.config.get("preset").and_then(Value::as_str));
        let preset = match explicit {
            Some(preset) => preset,
            None => select_preset(
                layer_preset,
                None,
                false,
                self.env.detected_target.as_deref(),
                DEFAULT_PRESET,
            ),
        };

        let preset_config = match self.presets.get(&preset) {
            Some(config) => config,
            None => {
                diagnostics.push(Diagnostic::PresetNotFound {
                    id: preset.clone(),
                    requested_by: "preset selection".to_string(),
                });
                json!({})
            }
        };

        let mut layers = Vec::with_capacity(loaded.layers.len() + 3);
        let mut sources = Vec::with_capacity(loaded.layers.len() + 3);

        layers.push(BuiltinDefaults::new(&self.env, &self.toolkit).to_value());
        sources.push(ConfigSource::new(ConfigOrigin::Defaults));

        layers.push(preset_config);
        sources.push(ConfigSource::preset(ConfigOrigin::Preset, &preset));

        for layer in loaded.layers {
            debug!(origin = ?layer.source.origin, path = ?layer.source.path, "merging config layer");
            layers.push(layer.config);
            sources.push(layer.source);
        }

        layers.push(overrides);
        sources.push(ConfigSource::new(ConfigOrigin::Overrides));

        let mut options = merge_layers(layers);
        set_path(&mut options, "preset", json!(preset));

        self.finalize(&mut options, &preset, &cwd)?;

        for diagnostic in &diagnostics {
            warn!(%diagnostic, "config diagnostic");
        }

        ResolvedOptions::new(preset, options, raw_overrides, sources, diagnostics)
    }

    fn finalize(&self, options: &mut Value, preset: &str, cwd: &Path) -> Result<(), ConfigError> {
        let template_error = |e: FieldError| ConfigError::Template {
            field: e.field,
            preset: preset.to_string(),
            source: e.source,
        };

        let dirs = finalize_dirs(options, cwd, self.modules).map_err(template_error)?;
        apply_aliases(options, &dirs);

        if options
            .get("entry")
            .and_then(Value::as_str)
            .map_or(true, str::is_empty)
        {
            return Err(ConfigError::MissingField {
                field: "entry",
                preset: preset.to_string(),
            });
        }
        for field in PATH_FIELDS {
            resolve_field(options, field, &dirs.root_dir).map_err(template_error)?;
        }

        finalize_node_modules_dirs(options, &dirs, &self.toolkit);
        default_scan_dirs(options, &dirs);
        finalize_imports(options, &dirs.build_dir, self.modules);

        if let Some(Value::Object(routes)) = options.get("routes") {
            let routes = normalize_routes(routes);
            set_path(options, "routes", Value::Object(routes));
        }

        let base_url = options
            .get("base_url")
            .and_then(Value::as_str)
            .unwrap_or("/");
        let base_url = with_trailing_slash(&with_leading_slash(base_url));
        set_path(options, "base_url", json!(base_url));

        let routes = options.get("routes").cloned().unwrap_or_else(|| json!({}));
        let runtime_config = options.get("runtime_config").cloned().unwrap_or(Value::Null);
        let runtime_config = deep_merge(
            json!({"app": {"base_url": base_url}, "nimbus": {"routes": routes}}),
            runtime_config,
        );
        set_path(options, "runtime_config", runtime_config);

        finalize_public_assets(options, &dirs);
        apply_module_aliases(options, self.modules);
        apply_storage_mounts(options, &dirs);

        let plugin_count = options
            .get("plugins")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        for index in 0..plugin_count {
            resolve_field(options, &format!("plugins.{}", index), &dirs.src_dir)
                .map_err(template_error)?;
        }

        Ok(())
    }
}

/// Resolve options with the built-in presets, the on-disk config loader and
/// the process environment.
pub fn load_options(overrides: &Value) -> Result<ResolvedOptions, ConfigError> {
    let presets = PresetRegistry::with_builtins();
    let loader = FileLayerLoader::default();
    let toolkit = ToolkitDirs::default();
    let cwd = std::env::current_dir().map_err(|e| ConfigError::IoError(e.to_string()))?;
    let modules = NodeModulesResolver::new(vec![
        cwd.join("node_modules"),
        toolkit.pkg_dir.join("node_modules"),
    ]);

    OptionsResolver::new(&presets, &loader, &modules)
        .with_env(EnvSignals::from_env())
        .with_toolkit_dirs(toolkit)
        .with_cwd(cwd)
        .resolve(overrides)
}
