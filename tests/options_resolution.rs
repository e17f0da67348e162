//! End-to-end options resolution against on-disk config layers.

use std::fs;
use std::path::PathBuf;

use serde_json::{json, Value};
use tempfile::TempDir;

use nimbus_options::paths::display;
use nimbus_options::{
    ConfigError, ConfigOrigin, Diagnostic, EnvSignals, FileLayerLoader, NodeModulesResolver,
    OptionsResolver, PresetRegistry, ResolvedOptions, ToolkitDirs, DEV_PRESET,
};

struct Project {
    _temp: TempDir,
    workspace: PathBuf,
    root: PathBuf,
    toolkit: ToolkitDirs,
}

impl Project {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let workspace = temp.path().join("repo");
        let root = workspace.join("app");
        fs::create_dir_all(root.join("node_modules/h3")).unwrap();
        fs::write(workspace.join("pnpm-workspace.yaml"), "packages: [app]\n").unwrap();
        let toolkit = ToolkitDirs::new(temp.path().join("toolkit"));
        Self {
            _temp: temp,
            workspace,
            root,
            toolkit,
        }
    }

    fn write(&self, name: &str, contents: &str) {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn path(&self, rel: &str) -> String {
        display(&self.root.join(rel))
    }

    fn resolve_with_env(&self, env: EnvSignals, overrides: Value) -> Result<ResolvedOptions, ConfigError> {
        let presets = PresetRegistry::with_builtins();
        let loader = FileLayerLoader::default();
        let modules = NodeModulesResolver::new(vec![self.root.join("node_modules")]).with_exports(
            "h3",
            vec![
                "defineEventHandler".to_string(),
                "H3Event".to_string(),
                "use".to_string(),
                "readBody".to_string(),
            ],
        );
        OptionsResolver::new(&presets, &loader, &modules)
            .with_env(env)
            .with_toolkit_dirs(self.toolkit.clone())
            .with_cwd(&self.workspace)
            .resolve(&overrides)
    }

    fn resolve(&self, overrides: Value) -> Result<ResolvedOptions, ConfigError> {
        self.resolve_with_env(EnvSignals::default(), overrides)
    }
}

fn runtime_path(project: &Project, rel: &str) -> String {
    display(&project.toolkit.runtime_dir.join(rel))
}

// =============================================================================
// Layer precedence
// =============================================================================

#[test]
fn test_default_preset_without_config() {
    let project = Project::new();
    let resolved = project.resolve(json!({"root_dir": "app"})).unwrap();

    assert_eq!(resolved.preset, "node-server");
    assert_eq!(
        resolved.get_str("root_dir").map(str::to_string),
        Some(display(&project.root))
    );
    assert_eq!(
        resolved.get_str("entry").map(str::to_string),
        Some(runtime_path(&project, "entries/node-server"))
    );
    assert_eq!(resolved.get_str("output.dir").map(str::to_string), Some(project.path(".output")));
    assert_eq!(
        resolved.get_str("output.public_dir").map(str::to_string),
        Some(project.path(".output/public"))
    );
    assert_eq!(resolved.get_u64("log_level"), Some(3));
    assert_eq!(resolved.get_str("base_url"), Some("/"));
}

#[test]
fn test_user_config_and_extends_chain() {
    let project = Project::new();
    project.write(
        "nimbus.config.toml",
        r#"
extends = "./config/base"
preset = "vercel"
log_level = 4

[routes."/api/**"]
cors = true
"#,
    );
    project.write(
        "config/base.toml",
        r#"
log_level = 2
plugins = ["~/plugins/base"]

[routes."/old"]
redirect = "/new"
"#,
    );

    let resolved = project.resolve(json!({"root_dir": "app"})).unwrap();

    assert_eq!(resolved.preset, "vercel");
    assert_eq!(resolved.get_u64("log_level"), Some(4));
    assert_eq!(
        resolved.get_str("output.server_dir").map(str::to_string),
        Some(project.path(".vercel/output/functions/__nimbus.func"))
    );
    assert_eq!(resolved.options["plugins"], json!([project.path("plugins/base")]));
    assert_eq!(
        resolved.options["routes"]["/old"]["redirect"],
        json!({"to": "/new", "status_code": 307})
    );
    assert_eq!(
        resolved.options["routes"]["/api/**"]["headers"]["access-control-allow-origin"],
        "*"
    );
    assert_eq!(
        resolved.options["runtime_config"]["nimbus"]["routes"],
        resolved.options["routes"]
    );

    let origins: Vec<ConfigOrigin> = resolved.sources.iter().map(|s| s.origin).collect();
    assert_eq!(
        origins,
        vec![
            ConfigOrigin::Defaults,
            ConfigOrigin::Preset,
            ConfigOrigin::Extends,
            ConfigOrigin::User,
            ConfigOrigin::Overrides
        ]
    );
    assert!(resolved.sources[2].digest.is_some());
}

#[test]
fn test_overrides_win_over_user_config() {
    let project = Project::new();
    project.write("nimbus.config.json", r#"{"log_level": 4, "base_url": "/docs"}"#);

    let resolved = project
        .resolve(json!({"root_dir": "app", "log_level": 1, "base_url": "app"}))
        .unwrap();
    assert_eq!(resolved.get_u64("log_level"), Some(1));
    assert_eq!(resolved.get_str("base_url"), Some("/app/"));
    assert_eq!(resolved.get_str("runtime_config.app.base_url"), Some("/app/"));
}

#[test]
fn test_dev_flag_forces_dev_preset() {
    let project = Project::new();
    project.write("nimbus.config.toml", "preset = \"netlify\"");

    let resolved = project
        .resolve(json!({"root_dir": "app", "dev": true, "preset": "vercel"}))
        .unwrap();
    assert_eq!(resolved.preset, DEV_PRESET);
    assert_eq!(resolved.get_str("preset"), Some(DEV_PRESET));
    assert_eq!(
        resolved.get_str("output.server_dir").map(str::to_string),
        Some(project.path(".nimbus/dev"))
    );
}

#[test]
fn test_environment_preset_and_detection() {
    let project = Project::new();

    let env = EnvSignals::from_lookup(|name| (name == "VERCEL").then(|| "1".to_string()));
    let resolved = project.resolve_with_env(env, json!({"root_dir": "app"})).unwrap();
    assert_eq!(resolved.preset, "vercel");

    let env = EnvSignals::from_lookup(|name| match name {
        "NIMBUS_PRESET" => Some("netlify".to_string()),
        "VERCEL" => Some("1".to_string()),
        _ => None,
    });
    let resolved = project.resolve_with_env(env, json!({"root_dir": "app"})).unwrap();
    assert_eq!(resolved.preset, "netlify");
    assert_eq!(
        resolved.get_str("output.public_dir").map(str::to_string),
        Some(project.path("dist"))
    );
}

// =============================================================================
// Finalization
// =============================================================================

#[test]
fn test_directories_and_aliases() {
    let project = Project::new();
    project.write(
        "nimbus.config.toml",
        r#"
src_dir = "server"

[alias]
"~/" = "/custom/"
"#,
    );

    let resolved = project.resolve(json!({"root_dir": "app"})).unwrap();
    assert_eq!(resolved.get_str("src_dir").map(str::to_string), Some(project.path("server")));
    assert_eq!(
        resolved.get_str("workspace_dir").map(str::to_string),
        Some(display(&project.workspace))
    );
    assert_eq!(resolved.options["alias"]["~/"], "/custom/");
    assert_eq!(resolved.options["alias"]["@/"], json!(project.path("server/")));
    assert_eq!(resolved.options["alias"]["~~/"], json!(project.path("")));
    assert_eq!(
        resolved.options["alias"]["h3"],
        json!(project.path("node_modules/h3"))
    );
    assert!(resolved.options["alias"].get("defu").is_none());
    assert_eq!(resolved.options["scan_dirs"], json!([project.path("server")]));
}

#[test]
fn test_node_modules_dirs_and_storage_mounts() {
    let project = Project::new();
    project.write(
        "nimbus.config.toml",
        r#"
node_modules_dirs = ["node_modules", "../node_modules"]

[dev_storage.cache]
driver = "memory"
"#,
    );

    let resolved = project.resolve(json!({"root_dir": "app"})).unwrap();
    assert_eq!(
        resolved.options["node_modules_dirs"],
        json!([
            project.path("node_modules"),
            display(&project.workspace.join("node_modules")),
            display(&project.toolkit.pkg_dir.join("node_modules")),
        ])
    );

    let storage = &resolved.options["dev_storage"];
    assert_eq!(storage["cache"], json!({"driver": "memory"}));
    assert_eq!(storage["root"], json!({"driver": "fs", "base": display(&project.root)}));
    assert_eq!(storage["build"]["base"], json!(project.path(".nimbus")));
}

#[test]
fn test_imports_finalization() {
    let project = Project::new();
    project.write(
        "nimbus.config.toml",
        r#"
[auto_import]
dirs = ["./utils"]
"#,
    );

    let resolved = project.resolve(json!({"root_dir": "app"})).unwrap();
    let imports = &resolved.options["imports"];
    assert!(resolved.options.get("auto_import").is_none());
    assert_eq!(imports["dirs"], json!(["./utils"]));
    assert_eq!(
        imports["exclude"].as_array().and_then(|e| e.last()),
        Some(&json!(project.path(".nimbus")))
    );
    assert_eq!(
        imports["presets"],
        json!([{"from": "h3", "imports": ["defineEventHandler", "readBody"]}])
    );

    let disabled = project
        .resolve(json!({"root_dir": "app", "imports": false}))
        .unwrap();
    assert_eq!(disabled.options["imports"], json!(false));
}

// =============================================================================
// Diagnostics and errors
// =============================================================================

#[test]
fn test_unknown_extends_preset_is_diagnosed() {
    let project = Project::new();
    project.write("nimbus.config.toml", "extends = [\"no-such-layer\"]");

    let resolved = project.resolve(json!({"root_dir": "app"})).unwrap();
    assert_eq!(resolved.diagnostics.len(), 1);
    assert!(matches!(
        &resolved.diagnostics[0],
        Diagnostic::PresetNotFound { id, .. } if id == "no-such-layer"
    ));
}

#[test]
fn test_missing_entry_is_fatal() {
    let project = Project::new();
    let err = project
        .resolve(json!({"root_dir": "app", "preset": "does-not-exist"}))
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingField { field: "entry", .. }));
    assert_eq!(
        err.to_string(),
        "nimbus entry is missing! Is the \"does-not-exist\" preset correct?"
    );
}

#[test]
fn test_extends_cycle_is_fatal() {
    let project = Project::new();
    project.write("nimbus.config.toml", "extends = \"./loop.toml\"");
    project.write("loop.toml", "extends = \"./nimbus.config.toml\"");

    let err = project.resolve(json!({"root_dir": "app"})).unwrap_err();
    assert!(matches!(err, ConfigError::ExtendsCycle(_)));
}

#[test]
fn test_digest_is_deterministic() {
    let project = Project::new();
    project.write("nimbus.config.toml", "log_level = 2");

    let first = project.resolve(json!({"root_dir": "app"})).unwrap();
    let second = project.resolve(json!({"root_dir": "app"})).unwrap();
    assert_eq!(first.digest, second.digest);

    let other = project.resolve(json!({"root_dir": "app", "log_level": 5})).unwrap();
    assert_ne!(first.digest, other.digest);
}

#[test]
fn test_resolved_options_written_to_disk() {
    let project = Project::new();
    let resolved = project.resolve(json!({"root_dir": "app"})).unwrap();
    let out = project.root.join("options.json");
    resolved.write_to_file(&out).unwrap();

    let written: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["preset"], "node-server");
    assert_eq!(written["digest"], json!(resolved.digest));
}
