//! Resource assembler
//!
//! Puts derived entries under the filled tree (derived values have the
//! lowest precedence), then lets the output schema shape and validate the
//! document. Assembly is all-or-nothing: on any missing required field no
//! document is returned.

mod chart;
mod ingress;
mod metadata;
mod policy;
mod service;

pub use chart::{ChartSchema, Requirement};
pub use ingress::IngressSchema;
pub use metadata::{is_qualified_name, validate_metadata};
pub use policy::PolicySchema;
pub use service::ServiceSchema;

use serde::Serialize;

use compose_tree::{digest, merge, ConfigNode};

use crate::derive::DerivedEntries;
use crate::error::ComposeError;

/// The minimal shape contract of an output document
pub trait OutputSchema: Send + Sync {
    fn name(&self) -> &'static str;

    /// Build the output document from the merged tree, or describe the
    /// structural problem.
    fn shape(&self, tree: &ConfigNode) -> Result<ConfigNode, String>;
}

/// A complete document ready for the provisioning collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledOutput {
    pub schema: &'static str,
    pub document: ConfigNode,
    /// SHA-256 of the canonical document
    pub digest: String,
}

/// Merge `derived` under `filled` and shape the result with `schema`.
///
/// `origin` labels errors (usually the composition or component name).
pub fn assemble(
    filled: &ConfigNode,
    derived: &DerivedEntries,
    schema: &dyn OutputSchema,
    origin: &str,
) -> Result<AssembledOutput, ComposeError> {
    let derived_tree = derived
        .to_tree()
        .map_err(|conflict| ComposeError::assembly(origin, conflict.to_string()))?;

    let tree = merge(&[derived_tree, filled.clone()]);
    let document = schema
        .shape(&tree)
        .map_err(|reason| ComposeError::assembly(origin, format!("{}: {}", schema.name(), reason)))?;
    let digest = digest(&document).map_err(|e| ComposeError::from_tree(e, origin))?;

    Ok(AssembledOutput {
        schema: schema.name(),
        document,
        digest,
    })
}

/// Require a mapping at `key`, treating absence as an empty mapping.
pub(crate) fn mapping_or_empty(tree: &ConfigNode, key: &str) -> Result<ConfigNode, String> {
    match tree.get(key) {
        None | Some(ConfigNode::Null) => Ok(compose_tree::empty_mapping()),
        Some(node @ ConfigNode::Object(_)) => Ok(node.clone()),
        Some(other) => Err(format!(
            "'{}' must be a mapping, found {}",
            key,
            compose_tree::kind_name(other)
        )),
    }
}

/// A non-empty string, or a non-empty list of non-empty strings
pub(crate) fn is_string_or_string_list(node: Option<&ConfigNode>) -> bool {
    match node {
        Some(ConfigNode::String(s)) => !s.is_empty(),
        Some(ConfigNode::Array(items)) => {
            !items.is_empty() && items.iter().all(|i| i.as_str().map_or(false, |s| !s.is_empty()))
        }
        _ => false,
    }
}
