//! Configuration trees for declarative resource composition.
//!
//! A [`ConfigNode`] is any parsed document or partial override: a scalar,
//! an ordered list, or a mapping with unique keys in insertion order. This
//! crate owns the operations that do not care what the tree describes:
//! path access, immutable updates, the deterministic merge engine, document
//! parsing and canonical serialization.

mod canonical;
mod error;
mod merge;
mod parse;
mod path;

pub use canonical::{digest, to_canonical_json, to_pretty_json, to_yaml};
pub use error::{Location, TreeError};
pub use merge::{deep_merge, merge, merge_layers};
pub use parse::{parse, parse_file, parse_scalar, toml_to_node, DocumentFormat, RootShape};
pub use path::{get, is_present, kind_name, with_value, without_value, TreePath};

/// The recursive configuration value.
///
/// Backed by `serde_json::Value` built with `preserve_order`, so mapping
/// keys keep their insertion order for stable output.
pub type ConfigNode = serde_json::Value;

/// Mapping type used inside a [`ConfigNode`].
pub type ConfigMap = serde_json::Map<String, ConfigNode>;

/// An empty mapping node.
pub fn empty_mapping() -> ConfigNode {
    ConfigNode::Object(ConfigMap::new())
}
