//! Merge engine
//!
//! Combines ordered partial trees with:
//! - Mappings: deep-merge by key
//! - Lists: REPLACE (last wins)
//! - Scalars: override (last wins)
//! - Type mismatch: the later value wins entirely

use crate::{empty_mapping, ConfigNode};

/// Deep merge two trees.
///
/// Merge semantics:
/// - Mappings: deep-merge by key (recursive); base key order is kept and
///   keys only the overlay has are appended
/// - Lists: REPLACE (overlay wins entirely, no positional merge, no union)
/// - Scalars: override (overlay wins)
/// - Null: override (null can override any value)
pub fn deep_merge(base: ConfigNode, overlay: ConfigNode) -> ConfigNode {
    match (base, overlay) {
        (ConfigNode::Object(mut base_map), ConfigNode::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => {
                        let taken = std::mem::take(base_value);
                        *base_value = deep_merge(taken, overlay_value);
                    }
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
            ConfigNode::Object(base_map)
        }

        // Lists: REPLACE (no concatenation)
        (ConfigNode::Array(_), overlay @ ConfigNode::Array(_)) => overlay,

        // Scalars and any other case: overlay wins
        (_, overlay) => overlay,
    }
}

/// Merge owned layers in order (first is base, last has highest precedence).
///
/// Zero layers merge to an empty mapping.
pub fn merge_layers(layers: Vec<ConfigNode>) -> ConfigNode {
    let mut layers = layers.into_iter();
    match layers.next() {
        Some(first) => layers.fold(first, deep_merge),
        None => empty_mapping(),
    }
}

/// Merge borrowed sources into a new tree; the inputs are not modified.
pub fn merge(sources: &[ConfigNode]) -> ConfigNode {
    merge_layers(sources.to_vec())
}
