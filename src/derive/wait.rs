//! Wait policy
//!
//! `skipAwait` tells the provisioning collaborator not to block on resource
//! readiness. It defaults to true and only a literal `false` turns it off.
//! The effective value is always written out so the output never relies on
//! implicit absence.

use compose_tree::{get, ConfigNode, TreePath};

use super::{Derivation, DerivedEntry};

pub const SKIP_AWAIT_ANNOTATION: &str = "pulumi.com/skipAwait";

/// Effective wait flag of a filled tree
pub fn skip_await(tree: &ConfigNode) -> bool {
    get(tree, &TreePath::new(["skipAwait"])) != Some(&ConfigNode::Bool(false))
}

/// Emits the explicit `skipAwait` flag, and optionally the matching
/// annotation for Kubernetes objects
pub struct WaitPolicy {
    pub annotate: bool,
}

impl WaitPolicy {
    /// Flag plus `pulumi.com/skipAwait` annotation
    pub fn annotated() -> Self {
        Self { annotate: true }
    }

    /// Flag only (Helm charts)
    pub fn flag_only() -> Self {
        Self { annotate: false }
    }
}

impl Derivation for WaitPolicy {
    fn name(&self) -> &'static str {
        "wait-policy"
    }

    fn derive(&self, filled: &ConfigNode) -> Vec<DerivedEntry> {
        let skip = skip_await(filled);
        let mut entries = vec![DerivedEntry::new(
            self.name(),
            TreePath::new(["skipAwait"]),
            ConfigNode::Bool(skip),
        )];
        if self.annotate {
            entries.push(DerivedEntry::annotation(
                self.name(),
                SKIP_AWAIT_ANNOTATION,
                skip.to_string(),
            ));
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_defaults_true() {
        let entries = WaitPolicy::annotated().derive(&json!({}));
        assert_eq!(entries[0].value, json!(true));
        assert_eq!(entries[1].value, json!("true"));
    }

    #[test]
    fn test_explicit_false() {
        let entries = WaitPolicy::annotated().derive(&json!({"skipAwait": false}));
        assert_eq!(entries[0].value, json!(false));
        assert_eq!(entries[1].value, json!("false"));
    }

    #[test]
    fn test_only_literal_false_disables() {
        assert!(skip_await(&json!({"skipAwait": "false"})));
        assert!(skip_await(&json!({"skipAwait": null})));
        assert!(!skip_await(&json!({"skipAwait": false})));
    }

    #[test]
    fn test_flag_only() {
        let entries = WaitPolicy::flag_only().derive(&json!({}));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, TreePath::new(["skipAwait"]));
    }
}
