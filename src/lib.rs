//! nimbus options resolution
//!
//! Resolves the final runtime options of the nimbus server toolkit from
//! built-in defaults, a deployment preset, user configuration layers and
//! programmatic overrides.

pub mod config;
pub mod imports;
pub mod loader;
pub mod logging;
pub mod paths;
pub mod preset;
pub mod template;

pub use config::{
    load_options, BuiltinDefaults, ConfigError, ConfigOrigin, ConfigSource, Diagnostic,
    EnvSignals, OptionsResolver, ResolvedOptions,
};
pub use loader::{ConfigLayer, FileLayerLoader, LayerLoader, LoadedLayers, StaticLayers};
pub use paths::{ModuleResolver, NodeModulesResolver, ToolkitDirs};
pub use preset::{select_preset, PresetProvider, PresetRegistry, DEFAULT_PRESET, DEV_PRESET};
pub use template::{resolve_path, resolve_template, TemplateError};
