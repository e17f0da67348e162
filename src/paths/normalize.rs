//! Lexical path normalization.
//!
//! Paths are resolved without touching the filesystem: configured directories
//! need not exist yet when options are resolved.

use std::path::{Component, Path, PathBuf};

/// Remove `.` segments and fold `..` into its parent.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Resolve `path` against `base` (an absolute `path` ignores `base`).
pub fn resolve(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&base.join(path))
    }
}

/// Path as a string for the option tree
pub fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// `dir` rendered with exactly one trailing separator
pub fn with_trailing_separator(dir: &Path) -> String {
    let rendered = display(dir);
    if rendered.ends_with(std::path::MAIN_SEPARATOR) {
        rendered
    } else {
        format!("{}{}", rendered, std::path::MAIN_SEPARATOR)
    }
}
