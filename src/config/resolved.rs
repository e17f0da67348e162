//! Resolved options with full provenance
//!
//! Captures the final option tree plus where its layers came from, the raw
//! overrides it was resolved with, and a digest of the canonical tree.

use chrono::{DateTime, Utc};
use nimbus_merge::get_path;
use nimbus_routes::RouteOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

use super::error::{ConfigError, Diagnostic};

/// Schema version for resolved options
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "nimbus/options@1";

/// Origin of a configuration layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Defaults,
    Preset,
    Extends,
    User,
    Overrides,
}

/// A contributing layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigSource {
    /// Origin of this layer
    pub origin: ConfigOrigin,

    /// Preset identifier (preset layers only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// File path (file layers only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (file layers only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl ConfigSource {
    pub fn new(origin: ConfigOrigin) -> Self {
        Self {
            origin,
            name: None,
            path: None,
            digest: None,
        }
    }

    pub fn preset(origin: ConfigOrigin, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::new(origin)
        }
    }

    pub fn file(origin: ConfigOrigin, path: &Path, digest: String) -> Self {
        Self {
            path: Some(path.to_string_lossy().to_string()),
            digest: Some(digest),
            ..Self::new(origin)
        }
    }
}

/// SHA-256 hex digest of `bytes`
pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Final options of one resolution run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedOptions {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When these options were resolved
    pub created_at: DateTime<Utc>,

    /// Active preset identifier
    pub preset: String,

    /// The final option tree
    pub options: Value,

    /// Overrides exactly as the caller passed them
    pub overrides: Value,

    /// Contributing layers in merge order (lowest precedence first)
    pub sources: Vec<ConfigSource>,

    /// Non-fatal findings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,

    /// SHA-256 of the RFC 8785 canonical form of `options`
    pub digest: String,
}

impl ResolvedOptions {
    pub fn new(
        preset: String,
        options: Value,
        overrides: Value,
        sources: Vec<ConfigSource>,
        diagnostics: Vec<Diagnostic>,
    ) -> Result<Self, ConfigError> {
        let digest = Self::compute_digest(&options)?;
        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            preset,
            options,
            overrides,
            sources,
            diagnostics,
            digest,
        })
    }

    /// Digest of an option tree using JSON Canonicalization Scheme (RFC 8785)
    pub fn compute_digest(options: &Value) -> Result<String, ConfigError> {
        let jcs_bytes = serde_json_canonicalizer::to_vec(options)
            .map_err(|e| ConfigError::CanonicalJson(e.to_string()))?;
        Ok(sha256_hex(&jcs_bytes))
    }

    /// Serialize to JSON (pretty printed)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }

    /// Get an option by path (dot-separated)
    pub fn get(&self, path: &str) -> Option<&Value> {
        get_path(&self.options, path)
    }

    /// Get an option as string
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    /// Get an option as bool
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.as_bool())
    }

    /// Get an option as u64
    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path).and_then(|v| v.as_u64())
    }

    /// Normalized options of one route pattern
    pub fn route(&self, pattern: &str) -> Option<RouteOptions> {
        let rule = self.options.get("routes")?.get(pattern)?;
        serde_json::from_value(rule.clone()).ok()
    }
}
