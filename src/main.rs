//! nimbus-options CLI
//!
//! Entry point for the `nimbus-options` command-line tool.

use clap::{Parser, Subcommand};
use nimbus_merge::set_path;
use nimbus_options::logging::{init_logging, LoggingConfig};
use nimbus_options::{load_options, resolve_template, PresetRegistry, ResolvedOptions};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "nimbus-options")]
#[command(about = "Resolve layered nimbus server options", version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the options and print them as JSON
    Resolve {
        /// Project root (default: current directory)
        #[arg(long, short = 'r')]
        root: Option<PathBuf>,

        /// Preset to use instead of the configured or detected one
        #[arg(long, short = 'p')]
        preset: Option<String>,

        /// Resolve for a development build
        #[arg(long)]
        dev: bool,

        /// Override an option (`key.path=value`, value parsed as JSON)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Write the result to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Print only the option tree, on one line
        #[arg(long)]
        compact: bool,
    },

    /// List registered presets
    Presets {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Expand a `{{ path }}` template against the resolved options
    Template {
        /// The template to expand
        template: String,

        /// Project root (default: current directory)
        #[arg(long, short = 'r')]
        root: Option<PathBuf>,

        /// Resolve for a development build
        #[arg(long)]
        dev: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: cli.log_level,
        format: cli.log_format,
    };
    if let Err(e) = init_logging(&logging) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    match cli.command {
        Commands::Resolve {
            root,
            preset,
            dev,
            set,
            output,
            compact,
        } => {
            run_resolve(root, preset, dev, &set, output, compact);
        }
        Commands::Presets { json } => {
            run_presets(json);
        }
        Commands::Template {
            template,
            root,
            dev,
        } => {
            run_template(&template, root, dev);
        }
    }
}

fn run_resolve(
    root: Option<PathBuf>,
    preset: Option<String>,
    dev: bool,
    set: &[String],
    output: Option<PathBuf>,
    compact: bool,
) {
    let mut overrides = build_overrides(root, preset, dev);
    for assignment in set {
        if let Err(e) = apply_assignment(&mut overrides, assignment) {
            eprintln!("Invalid --set value: {}", e);
            process::exit(1);
        }
    }

    let resolved = resolve_or_exit(&overrides);

    if let Some(path) = output {
        if let Err(e) = resolved.write_to_file(&path) {
            eprintln!("Error writing {}: {}", path.display(), e);
            process::exit(1);
        }
        println!("Options written to {}", path.display());
        return;
    }

    let serialized = if compact {
        serde_json::to_string(&resolved.options)
    } else {
        resolved.to_json()
    };
    match serialized {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_presets(json_output: bool) {
    let registry = PresetRegistry::with_builtins();
    let ids = registry.ids();

    if json_output {
        match serde_json::to_string_pretty(&ids) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("Registered presets ({}):", ids.len());
        for id in ids {
            println!("  {}", id);
        }
    }
}

fn run_template(template: &str, root: Option<PathBuf>, dev: bool) {
    let resolved = resolve_or_exit(&build_overrides(root, None, dev));
    match resolve_template(&resolved.options, template) {
        Ok(expanded) => println!("{}", expanded),
        Err(e) => {
            eprintln!("Template error: {}", e);
            process::exit(1);
        }
    }
}

fn resolve_or_exit(overrides: &Value) -> ResolvedOptions {
    match load_options(overrides) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn build_overrides(root: Option<PathBuf>, preset: Option<String>, dev: bool) -> Value {
    let mut overrides = json!({});
    if let Some(root) = root {
        set_path(&mut overrides, "root_dir", json!(root.to_string_lossy()));
    }
    if let Some(preset) = preset {
        set_path(&mut overrides, "preset", json!(preset));
    }
    if dev {
        set_path(&mut overrides, "dev", json!(true));
    }
    overrides
}

/// Apply `key.path=value`; values that are not valid JSON are taken as strings
fn apply_assignment(overrides: &mut Value, assignment: &str) -> Result<(), String> {
    let (key, raw) = assignment
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not KEY=VALUE", assignment))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("'{}' has an empty key", assignment));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    set_path(overrides, key, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_assignment_parses_json() {
        let mut overrides = json!({});
        apply_assignment(&mut overrides, "log_level=4").unwrap();
        apply_assignment(&mut overrides, "output.dir=dist").unwrap();
        apply_assignment(&mut overrides, "imports=false").unwrap();
        assert_eq!(
            overrides,
            json!({"log_level": 4, "output": {"dir": "dist"}, "imports": false})
        );
    }

    #[test]
    fn test_apply_assignment_rejects_malformed() {
        let mut overrides = json!({});
        assert!(apply_assignment(&mut overrides, "no-equals").is_err());
        assert!(apply_assignment(&mut overrides, "=1").is_err());
    }

    #[test]
    fn test_build_overrides() {
        let overrides = build_overrides(Some(PathBuf::from("/app")), Some("vercel".into()), true);
        assert_eq!(overrides, json!({"root_dir": "/app", "preset": "vercel", "dev": true}));
    }
}
