//! Directory, alias and storage-mount finalization
//!
//! Also hosts the module-resolution collaborator used while finalizing:
//! [`ModuleResolver`] answers "where is package X" and "what does it
//! export", and locates the workspace root.

mod finalize;
mod normalize;
mod url;
mod workspace;

pub use finalize::{
    apply_aliases, apply_module_aliases, apply_storage_mounts, default_scan_dirs, finalize_dirs,
    finalize_node_modules_dirs, finalize_public_assets, BaseDir, MountSpec, ResolvedDirs,
    DEFAULT_MOUNTS, DIR_ALIASES, RUNTIME_PACKAGES,
};
pub use normalize::{display, normalize, resolve, with_trailing_separator};
pub use url::{with_leading_slash, with_trailing_slash, without_trailing_slash};
pub use workspace::{find_workspace_dir, WORKSPACE_MARKERS};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Install locations of the toolkit itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolkitDirs {
    /// Package root of the toolkit (its `node_modules` is searched last)
    pub pkg_dir: PathBuf,
    /// Runtime sources, aliased as `#internal/nimbus`
    pub runtime_dir: PathBuf,
}

impl ToolkitDirs {
    /// Layout rooted at `pkg_dir` (`<pkg_dir>/runtime`)
    pub fn new(pkg_dir: impl Into<PathBuf>) -> Self {
        let pkg_dir = pkg_dir.into();
        let runtime_dir = pkg_dir.join("runtime");
        Self {
            pkg_dir,
            runtime_dir,
        }
    }
}

impl Default for ToolkitDirs {
    fn default() -> Self {
        Self::new(env!("CARGO_MANIFEST_DIR"))
    }
}

/// Module and workspace lookups needed during finalization
pub trait ModuleResolver {
    /// Absolute location of a package, if it can be found
    fn resolve_specifier(&self, name: &str) -> Option<PathBuf>;

    /// Names exported by a package, in declaration order
    fn module_exports(&self, name: &str) -> Vec<String>;

    /// Workspace root containing `root_dir`
    fn workspace_dir(&self, root_dir: &Path) -> PathBuf {
        find_workspace_dir(root_dir)
    }
}

/// Resolves packages from a list of `node_modules` directories.
///
/// Export lists cannot be read from disk without evaluating the package, so
/// they are only known when registered with [`NodeModulesResolver::with_exports`].
#[derive(Debug, Clone, Default)]
pub struct NodeModulesResolver {
    search_dirs: Vec<PathBuf>,
    exports: BTreeMap<String, Vec<String>>,
}

impl NodeModulesResolver {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self {
            search_dirs,
            exports: BTreeMap::new(),
        }
    }

    /// Register the export list of a package
    pub fn with_exports(mut self, name: &str, exports: Vec<String>) -> Self {
        self.exports.insert(name.to_string(), exports);
        self
    }
}

impl ModuleResolver for NodeModulesResolver {
    fn resolve_specifier(&self, name: &str) -> Option<PathBuf> {
        self.search_dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_dir())
    }

    fn module_exports(&self, name: &str) -> Vec<String> {
        self.exports.get(name).cloned().unwrap_or_default()
    }
}
