//! Layered options resolution
//!
//! Merges, in increasing precedence:
//! 1. Built-in defaults
//! 2. Preset body (the active deployment preset)
//! 3. User config layers (`nimbus.config.toml` and its `extends` chain)
//! 4. Programmatic overrides
//!
//! then finalizes directories, path templates, routes, imports, aliases and
//! storage mounts.

mod defaults;
mod env;
mod error;
mod resolved;
mod resolver;

pub use defaults::{BuiltinDefaults, DEFAULT_BUILD_DIR, DEFAULT_ERROR_HANDLER, RUNTIME_ALIAS};
pub use env::EnvSignals;
pub use error::{ConfigError, Diagnostic};
pub use resolved::{ConfigOrigin, ConfigSource, ResolvedOptions, SCHEMA_ID, SCHEMA_VERSION};
pub use resolver::{load_options, OptionsResolver, PATH_FIELDS};

pub(crate) use resolved::sha256_hex;
