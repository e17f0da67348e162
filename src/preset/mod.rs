//! Deployment presets
//!
//! A preset is a named bundle of option values for one deployment target.
//! Presets live in an explicit [`PresetRegistry`]; [`select_preset`] picks
//! the active one.

mod builtin;
mod registry;
mod select;

pub use registry::{normalize_id, PresetProvider, PresetRegistry};
pub use select::{detect_target, explicit_preset, select_preset};

/// Preset forced whenever the caller asks for a development build.
pub const DEV_PRESET: &str = "nimbus-dev";

/// Preset used when nothing else names one.
pub const DEFAULT_PRESET: &str = "node-server";

/// Environment variable that may name the preset.
pub const PRESET_ENV: &str = "NIMBUS_PRESET";
