//! Built-in presets

use serde_json::{json, Value};

use super::registry::{PresetProvider, PresetRegistry};
use super::{DEFAULT_PRESET, DEV_PRESET};

pub(super) fn register_all(registry: &mut PresetRegistry) {
    registry.register(DEFAULT_PRESET, PresetProvider::Factory(node_server));
    registry.register(DEV_PRESET, PresetProvider::Factory(dev));
    registry.register("static", PresetProvider::Factory(static_site));
    registry.register("netlify", PresetProvider::Factory(netlify));
    registry.register("vercel", PresetProvider::Factory(vercel));
}

fn node_server() -> Value {
    json!({
        "entry": "#internal/nimbus/entries/node-server",
        "node": true,
        "server_assets": []
    })
}

fn dev() -> Value {
    json!({
        "entry": "#internal/nimbus/entries/nimbus-dev",
        "output": {
            "server_dir": "{{ build_dir }}/dev"
        },
        "source_map": true
    })
}

fn static_site() -> Value {
    json!({
        "entry": "#internal/nimbus/entries/static",
        "output": {
            "public_dir": "{{ output.dir }}"
        },
        "prerender": {
            "crawl_links": true
        }
    })
}

fn netlify() -> Value {
    json!({
        "entry": "#internal/nimbus/entries/netlify",
        "output": {
            "dir": "{{ root_dir }}/.netlify/functions-internal",
            "public_dir": "{{ root_dir }}/dist"
        }
    })
}

fn vercel() -> Value {
    json!({
        "entry": "#internal/nimbus/entries/vercel",
        "output": {
            "dir": "{{ root_dir }}/.vercel/output",
            "server_dir": "{{ output.dir }}/functions/__nimbus.func",
            "public_dir": "{{ output.dir }}/static"
        }
    })
}
