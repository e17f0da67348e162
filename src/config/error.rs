//! Error taxonomy
//!
//! [`ConfigError`] aborts resolution; no partial options are returned.
//! [`Diagnostic`]s are collected on the result and resolution carries on.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::template::TemplateError;

/// Fatal configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("nimbus {field} is missing! Is the \"{preset}\" preset correct?")]
    MissingField { field: &'static str, preset: String },

    #[error("cannot resolve option '{field}' (preset \"{preset}\"): {source}")]
    Template {
        field: String,
        preset: String,
        #[source]
        source: TemplateError,
    },

    #[error("config extends cycle: {0}")]
    ExtendsCycle(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Canonical JSON error: {0}")]
    CanonicalJson(String),

    #[error("Logging error: {0}")]
    Logging(String),
}

/// Non-fatal findings surfaced alongside the resolved options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A preset identifier matched nothing in the registry; it contributed
    /// nothing to the merge.
    PresetNotFound { id: String, requested_by: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::PresetNotFound { id, requested_by } => {
                write!(f, "preset '{}' (requested by {}) not found", id, requested_by)
            }
        }
    }
}
