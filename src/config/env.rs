//! Environment signals read once per resolution

use crate::preset::{detect_target, PRESET_ENV};

/// Environment variable holding the app base URL
pub const BASE_URL_ENV: &str = "NIMBUS_APP_BASE_URL";

/// Values taken from the process environment.
///
/// The development flag is deliberately absent: callers pass it through the
/// `dev` override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSignals {
    /// Preset requested via `NIMBUS_PRESET`
    pub preset: Option<String>,
    /// Base URL from `NIMBUS_APP_BASE_URL`
    pub app_base_url: Option<String>,
    /// `DEBUG` is set to a truthy value
    pub debug: bool,
    /// `TEST` is set to a truthy value
    pub test: bool,
    /// Auto-detected deployment target
    pub detected_target: Option<String>,
}

fn truthy(value: Option<String>) -> bool {
    value.is_some_and(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "" | "0" | "false"))
}

impl EnvSignals {
    /// Read the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read signals through `lookup` (variable name -> value)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            preset: lookup(PRESET_ENV).filter(|v| !v.is_empty()),
            app_base_url: lookup(BASE_URL_ENV).filter(|v| !v.is_empty()),
            debug: truthy(lookup("DEBUG")),
            test: truthy(lookup("TEST")),
            detected_target: detect_target(&lookup),
        }
    }
}
