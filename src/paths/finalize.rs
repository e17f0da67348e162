//! Derive directories, aliases, module directories and storage mounts from
//! the merged option tree.

use nimbus_merge::{dedupe, set_path};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::normalize::{display, resolve, with_trailing_separator};
use super::url::{with_leading_slash, without_trailing_slash};
use super::{ModuleResolver, ToolkitDirs};
use crate::config::DEFAULT_BUILD_DIR;
use crate::template::{resolve_field, FieldError};

/// A resolved project directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseDir {
    Root,
    Src,
    Build,
}

/// A storage mount created unless the user declared one with the same name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountSpec {
    pub name: &'static str,
    pub base: BaseDir,
    pub subdir: Option<&'static str>,
}

/// Aliases pointing into project directories
pub const DIR_ALIASES: &[(&str, BaseDir)] = &[
    ("~/", BaseDir::Src),
    ("@/", BaseDir::Src),
    ("~~/", BaseDir::Root),
    ("@@/", BaseDir::Root),
];

/// Build-time filesystem mounts
pub const DEFAULT_MOUNTS: &[MountSpec] = &[
    MountSpec { name: "root", base: BaseDir::Root, subdir: None },
    MountSpec { name: "src", base: BaseDir::Src, subdir: None },
    MountSpec { name: "build", base: BaseDir::Build, subdir: None },
    MountSpec { name: "cache", base: BaseDir::Build, subdir: Some("cache") },
];

/// Packages the runtime imports directly; aliased to their install location
pub const RUNTIME_PACKAGES: &[&str] = &["defu", "h3"];

/// Absolute project directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDirs {
    pub root_dir: PathBuf,
    pub workspace_dir: PathBuf,
    pub src_dir: PathBuf,
    pub build_dir: PathBuf,
}

impl ResolvedDirs {
    pub fn get(&self, base: BaseDir) -> &Path {
        match base {
            BaseDir::Root => &self.root_dir,
            BaseDir::Src => &self.src_dir,
            BaseDir::Build => &self.build_dir,
        }
    }
}

// `tree[key]` as an object, replacing any non-object value.
fn section<'a>(tree: &'a mut Value, key: &str) -> Option<&'a mut Map<String, Value>> {
    if !matches!(tree.get(key), Some(Value::Object(_))) {
        set_path(tree, key, Value::Object(Map::new()));
    }
    tree.get_mut(key)?.as_object_mut()
}

fn string_list(tree: &Value, key: &str) -> Vec<String> {
    match tree.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Make `root_dir`, `src_dir`, `build_dir` (and `public_dir` when set)
/// absolute and record `workspace_dir`.
///
/// `root_dir` resolves against `cwd`; the others against `root_dir`, after
/// template expansion. `src_dir` defaults to `root_dir`.
pub fn finalize_dirs(
    tree: &mut Value,
    cwd: &Path,
    modules: &dyn ModuleResolver,
) -> Result<ResolvedDirs, FieldError> {
    let root_raw = tree
        .get("root_dir")
        .and_then(Value::as_str)
        .unwrap_or(".")
        .to_string();
    let root_dir = resolve(cwd, &root_raw);
    set_path(tree, "root_dir", json!(display(&root_dir)));

    let workspace_dir = modules.workspace_dir(&root_dir);
    set_path(tree, "workspace_dir", json!(display(&workspace_dir)));

    if tree.get("src_dir").and_then(Value::as_str).is_none() {
        set_path(tree, "src_dir", json!(display(&root_dir)));
    }
    if tree.get("build_dir").and_then(Value::as_str).is_none() {
        set_path(tree, "build_dir", json!(DEFAULT_BUILD_DIR));
    }

    let src_dir = PathBuf::from(resolve_field(tree, "src_dir", &root_dir)?.unwrap_or_default());
    let build_dir = PathBuf::from(resolve_field(tree, "build_dir", &root_dir)?.unwrap_or_default());
    resolve_field(tree, "public_dir", &root_dir)?;

    debug!(
        root_dir = %root_dir.display(),
        src_dir = %src_dir.display(),
        build_dir = %build_dir.display(),
        "resolved project directories"
    );

    Ok(ResolvedDirs {
        root_dir,
        workspace_dir,
        src_dir,
        build_dir,
    })
}

/// Add the directory aliases beneath user-declared ones.
pub fn apply_aliases(tree: &mut Value, dirs: &ResolvedDirs) {
    let Some(aliases) = section(tree, "alias") else {
        return;
    };
    for (alias, base) in DIR_ALIASES {
        aliases
            .entry(alias.to_string())
            .or_insert_with(|| json!(with_trailing_separator(dirs.get(*base))));
    }
}

/// Alias runtime packages to their resolved location when the user did not.
pub fn apply_module_aliases(tree: &mut Value, modules: &dyn ModuleResolver) {
    let Some(aliases) = section(tree, "alias") else {
        return;
    };
    for package in RUNTIME_PACKAGES {
        if aliases.get(*package).is_some_and(|target| !target.is_null()) {
            continue;
        }
        match modules.resolve_specifier(package) {
            Some(location) => {
                aliases.insert(package.to_string(), json!(display(&location)));
            }
            None => debug!(package, "runtime package not resolvable; no alias added"),
        }
    }
}

/// Append the workspace, project and toolkit `node_modules` directories,
/// resolve every entry against `root_dir` and drop duplicates.
pub fn finalize_node_modules_dirs(tree: &mut Value, dirs: &ResolvedDirs, toolkit: &ToolkitDirs) {
    let mut entries = string_list(tree, "node_modules_dirs");
    for base in [&dirs.workspace_dir, &dirs.root_dir, &toolkit.pkg_dir] {
        entries.push(display(&base.join("node_modules")));
    }
    let resolved = entries
        .iter()
        .map(|dir| json!(display(&resolve(&dirs.root_dir, dir))))
        .collect();
    set_path(tree, "node_modules_dirs", Value::Array(dedupe(resolved)));
}

/// Scan the source directory when no scan directories are configured.
pub fn default_scan_dirs(tree: &mut Value, dirs: &ResolvedDirs) {
    if string_list(tree, "scan_dirs").is_empty() {
        set_path(tree, "scan_dirs", json!([display(&dirs.src_dir)]));
    }
}

/// Resolve each public asset directory against `src_dir` and normalize its
/// base URL (leading slash, no trailing slash, default `/`).
pub fn finalize_public_assets(tree: &mut Value, dirs: &ResolvedDirs) {
    let Some(Value::Array(assets)) = tree.get_mut("public_assets") else {
        return;
    };
    for asset in assets.iter_mut().filter_map(Value::as_object_mut) {
        if let Some(dir) = asset.get("dir").and_then(Value::as_str) {
            let dir = display(&resolve(&dirs.src_dir, dir));
            asset.insert("dir".to_string(), json!(dir));
        }
        let base_url = asset
            .get("base_url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .unwrap_or("/");
        let base_url = with_leading_slash(&without_trailing_slash(base_url));
        asset.insert("base_url".to_string(), json!(base_url));
    }
}

/// Add the default filesystem mounts to `dev_storage`, never replacing a
/// declared mount.
pub fn apply_storage_mounts(tree: &mut Value, dirs: &ResolvedDirs) {
    let Some(storage) = section(tree, "dev_storage") else {
        return;
    };
    for mount in DEFAULT_MOUNTS {
        if storage.get(mount.name).is_some_and(|declared| !declared.is_null()) {
            continue;
        }
        let mut base = dirs.get(mount.base).to_path_buf();
        if let Some(subdir) = mount.subdir {
            base = base.join(subdir);
        }
        storage.insert(
            mount.name.to_string(),
            json!({"driver": "fs", "base": display(&base)}),
        );
    }
}
