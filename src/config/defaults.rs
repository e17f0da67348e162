//! Built-in defaults (lowest-precedence layer)
//!
//! Hardcoded defaults for every option section. A few values depend on the
//! environment (debug flag, test runs, app base URL) and on where the toolkit
//! is installed.

use serde_json::{json, Value};
use std::path::PathBuf;

use super::env::EnvSignals;
use crate::paths::{display, ToolkitDirs};

/// Default build directory, relative to the project root
pub const DEFAULT_BUILD_DIR: &str = ".nimbus";

/// Alias of the toolkit's runtime sources
pub const RUNTIME_ALIAS: &str = "#internal/nimbus";

/// Default error handler module
pub const DEFAULT_ERROR_HANDLER: &str = "#internal/nimbus/error";

/// Built-in default configuration values
#[derive(Debug, Clone)]
pub struct BuiltinDefaults {
    /// Debug mode (default: `DEBUG` env signal)
    pub debug: bool,

    /// Log level, 0 (silent) to 5 (trace); 1 under test, 3 otherwise
    pub log_level: u8,

    /// App base URL (default: `NIMBUS_APP_BASE_URL` or "/")
    pub base_url: String,

    /// Build directory (default: ".nimbus")
    pub build_dir: String,

    /// Output directory template (default: "{{ root_dir }}/.output")
    pub output_dir: String,

    /// Runtime sources, aliased as `#internal/nimbus`
    pub runtime_dir: PathBuf,

    /// Modules that must never be tree-shaken
    pub module_side_effects: Vec<String>,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self::new(&EnvSignals::default(), &ToolkitDirs::default())
    }
}

impl BuiltinDefaults {
    pub fn new(env: &EnvSignals, toolkit: &ToolkitDirs) -> Self {
        Self {
            debug: env.debug,
            log_level: if env.test { 1 } else { 3 },
            base_url: env
                .app_base_url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| "/".to_string()),
            build_dir: DEFAULT_BUILD_DIR.to_string(),
            output_dir: "{{ root_dir }}/.output".to_string(),
            runtime_dir: toolkit.runtime_dir.clone(),
            module_side_effects: vec![
                "unenv/runtime/polyfill/".to_string(),
                "node-fetch-native/polyfill".to_string(),
            ],
        }
    }

    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> Value {
        json!({
            // General
            "debug": self.debug,
            "log_level": self.log_level,
            "runtime_config": {"app": {}, "nimbus": {}},

            // Dirs
            "scan_dirs": [],
            "build_dir": self.build_dir,
            "output": {
                "dir": self.output_dir,
                "server_dir": "{{ output.dir }}/server",
                "public_dir": "{{ output.dir }}/public"
            },

            // Features
            "experimental": {},
            "storage": {},
            "dev_storage": {},
            "bundled_storage": [],
            "public_assets": [],
            "server_assets": [],
            "plugins": [],
            "imports": {
                "exclude": ["[\\\\/]node_modules[\\\\/]", "[\\\\/]\\.git[\\\\/]"],
                "presets": []
            },
            "virtual": {},

            // Dev
            "dev": false,
            "dev_server": {"watch": []},
            "watch_options": {"ignore_initial": true},

            // Routing
            "base_url": self.base_url,
            "handlers": [],
            "dev_handlers": [],
            "error_handler": DEFAULT_ERROR_HANDLER,
            "routes": {},
            "prerender": {
                "crawl_links": false,
                "ignore": [],
                "routes": []
            },

            // Bundling
            "alias": {
                RUNTIME_ALIAS: display(&self.runtime_dir)
            },
            "module_side_effects": self.module_side_effects,
            "replace": {},
            "node": true,
            "source_map": true,

            // Advanced
            "typescript": {
                "generate_tsconfig": true,
                "internal_paths": false
            },
            "node_modules_dirs": [],
            "commands": {}
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let defaults = BuiltinDefaults::new(&EnvSignals::default(), &ToolkitDirs::new("/opt/nimbus"));
        assert!(!defaults.debug);
        assert_eq!(defaults.log_level, 3);
        assert_eq!(defaults.base_url, "/");
        assert_eq!(defaults.build_dir, ".nimbus");
        assert_eq!(defaults.runtime_dir, PathBuf::from("/opt/nimbus/runtime"));
    }

    #[test]
    fn test_env_dependent_defaults() {
        let env = EnvSignals {
            debug: true,
            test: true,
            app_base_url: Some("/app".to_string()),
            ..EnvSignals::default()
        };
        let defaults = BuiltinDefaults::new(&env, &ToolkitDirs::new("/opt/nimbus"));
        assert!(defaults.debug);
        assert_eq!(defaults.log_level, 1);
        assert_eq!(defaults.base_url, "/app");
    }

    #[test]
    fn test_to_value() {
        let value = BuiltinDefaults::new(&EnvSignals::default(), &ToolkitDirs::new("/opt/nimbus")).to_value();

        assert_eq!(value["build_dir"], ".nimbus");
        assert_eq!(value["output"]["dir"], "{{ root_dir }}/.output");
        assert_eq!(value["output"]["server_dir"], "{{ output.dir }}/server");
        assert_eq!(value["alias"]["#internal/nimbus"], "/opt/nimbus/runtime");
        assert_eq!(value["error_handler"], DEFAULT_ERROR_HANDLER);
        assert_eq!(value["routes"], json!({}));
        assert!(value.get("entry").is_none());
        // Optional features are off by being absent, so an object can enable them.
        assert!(value.get("analyze").is_none());
        assert!(value.get("compress_public_assets").is_none());
    }
}
