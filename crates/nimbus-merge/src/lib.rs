//! Deep merge combinator for nimbus option trees.
//!
//! An option tree is a plain `serde_json::Value`. Layers are combined with
//! [`deep_merge`] / [`merge_layers`]; values inside a tree are addressed by
//! dotted paths (`output.server_dir`) through [`get_path`] and [`set_path`].

mod merge;
mod path;

pub use merge::{dedupe, deep_merge, merge_layers};
pub use path::{get_path, set_path};
