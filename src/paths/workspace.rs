//! Workspace root detection

use std::path::{Path, PathBuf};
use tracing::debug;

/// Files or directories marking the root of a (mono)repo workspace
pub const WORKSPACE_MARKERS: &[&str] = &["pnpm-workspace.yaml", "lerna.json", "turbo.json", ".git"];

/// Nearest ancestor of `root_dir` (inclusive) holding a workspace marker,
/// or `root_dir` itself when none does.
pub fn find_workspace_dir(root_dir: &Path) -> PathBuf {
    for dir in root_dir.ancestors() {
        if let Some(marker) = WORKSPACE_MARKERS.iter().find(|m| dir.join(m).exists()) {
            debug!(workspace_dir = %dir.display(), marker, "found workspace root");
            return dir.to_path_buf();
        }
    }
    root_dir.to_path_buf()
}
