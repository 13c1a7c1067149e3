//! Annotation and policy derivation
//!
//! A derivation is a pure function of the filled tree. Derivations never
//! read each other's output, so a [`DerivationSet`] is unordered: entries are
//! sorted by path before use and two derivations writing the same path with
//! different values is a conflict.

mod alb;
mod https;
mod iam;
mod nlb;
mod wait;

pub use alb::{
    Healthcheck, IngressClass, LoadBalancerScheme, HEALTHCHECK_PATH_ANNOTATION,
    HEALTHCHECK_PORT_ANNOTATION, INGRESS_CLASS_ANNOTATION, SCHEME_ANNOTATION,
};
pub use https::{
    https_enabled, IngressPaths, ListenerPorts, SslRedirect, CERTIFICATE_ARN_ANNOTATION,
    FORCE_SSL_REDIRECT_ANNOTATION, LISTEN_PORTS_ANNOTATION, REDIRECT_SERVICE,
    SSL_REDIRECT_ACTION_ANNOTATION,
};
pub use iam::HostedZoneStatements;
pub use nlb::{
    NlbAnnotations, EXTERNAL_DNS_HOSTNAME_ANNOTATION, NLB_SCHEME_ANNOTATION, NLB_TYPE_ANNOTATION,
};
pub use wait::{skip_await, WaitPolicy, SKIP_AWAIT_ANNOTATION};

use std::fmt;

use compose_tree::{with_value, ConfigNode, TreePath};

/// A value computed from the filled tree
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedEntry {
    pub path: TreePath,
    pub value: ConfigNode,
    /// Name of the derivation that produced it
    pub derivation: &'static str,
}

impl DerivedEntry {
    pub fn new(derivation: &'static str, path: TreePath, value: ConfigNode) -> Self {
        Self {
            path,
            value,
            derivation,
        }
    }

    /// An entry under `metadata.annotations`
    pub fn annotation(derivation: &'static str, key: &str, value: impl Into<String>) -> Self {
        Self::new(derivation, annotation_path(key), ConfigNode::String(value.into()))
    }
}

/// Path of an annotation key
pub fn annotation_path(key: &str) -> TreePath {
    TreePath::new(["metadata", "annotations", key])
}

/// A pure predicate-driven derivation
pub trait Derivation: Send + Sync {
    fn name(&self) -> &'static str;

    fn derive(&self, filled: &ConfigNode) -> Vec<DerivedEntry>;
}

/// Two derivations disagree about a path
#[derive(Debug, Clone, PartialEq)]
pub struct DerivationConflict {
    pub path: TreePath,
    pub first: &'static str,
    pub second: &'static str,
}

impl fmt::Display for DerivationConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "derivations '{}' and '{}' both write {}",
            self.first, self.second, self.path
        )
    }
}

/// The unordered derivations of one component
#[derive(Default)]
pub struct DerivationSet {
    derivations: Vec<Box<dyn Derivation>>,
}

impl DerivationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, derivation: impl Derivation + 'static) -> Self {
        self.derivations.push(Box::new(derivation));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.derivations.iter().map(|d| d.name()).collect()
    }

    /// Run every derivation against the same filled tree.
    pub fn derive(&self, filled: &ConfigNode) -> DerivedEntries {
        let entries = self
            .derivations
            .iter()
            .flat_map(|d| d.derive(filled))
            .collect();
        DerivedEntries::new(entries)
    }
}

impl fmt::Debug for DerivationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Derived entries sorted by path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedEntries {
    entries: Vec<DerivedEntry>,
}

impl DerivedEntries {
    pub fn new(mut entries: Vec<DerivedEntry>) -> Self {
        entries.sort_by(|a, b| a.path.cmp(&b.path).then(a.derivation.cmp(b.derivation)));
        Self { entries }
    }

    pub fn entries(&self) -> &[DerivedEntry] {
        &self.entries
    }

    pub fn get(&self, path: &TreePath) -> Option<&ConfigNode> {
        self.entries.iter().find(|e| e.path == *path).map(|e| &e.value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the lowest-precedence tree from the entries.
    ///
    /// Identical duplicates collapse; differing values at one path, or one
    /// entry nested under another, are conflicts.
    pub fn to_tree(&self) -> Result<ConfigNode, DerivationConflict> {
        let mut tree = compose_tree::empty_mapping();
        let mut written: Vec<&DerivedEntry> = Vec::new();
        for entry in &self.entries {
            if let Some(previous) = written
                .iter()
                .find(|w| entry.path.starts_with(&w.path) || w.path.starts_with(&entry.path))
            {
                if previous.path == entry.path && previous.value == entry.value {
                    continue;
                }
                return Err(DerivationConflict {
                    path: entry.path.clone(),
                    first: previous.derivation,
                    second: entry.derivation,
                });
            }
            tree = with_value(&tree, &entry.path, entry.value.clone());
            written.push(entry);
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Fixed(&'static str, TreePath, ConfigNode);

    impl Derivation for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn derive(&self, _filled: &ConfigNode) -> Vec<DerivedEntry> {
            vec![DerivedEntry::new(self.0, self.1.clone(), self.2.clone())]
        }
    }

    #[test]
    fn test_order_does_not_matter() {
        let a = Fixed("a", TreePath::new(["x"]), json!(1));
        let b = Fixed("b", TreePath::new(["y", "z"]), json!(2));
        let forward = DerivationSet::new()
            .with(Fixed("a", TreePath::new(["x"]), json!(1)))
            .with(Fixed("b", TreePath::new(["y", "z"]), json!(2)));
        let backward = DerivationSet::new().with(b).with(a);

        let tree = json!({});
        assert_eq!(forward.derive(&tree), backward.derive(&tree));
        assert_eq!(
            forward.derive(&tree).to_tree().unwrap(),
            json!({"x": 1, "y": {"z": 2}})
        );
    }

    #[test]
    fn test_conflicting_values_rejected() {
        let set = DerivationSet::new()
            .with(Fixed("a", TreePath::new(["x"]), json!(1)))
            .with(Fixed("b", TreePath::new(["x"]), json!(2)));
        let conflict = set.derive(&json!({})).to_tree().unwrap_err();
        assert_eq!(conflict.path, TreePath::new(["x"]));
        assert_eq!((conflict.first, conflict.second), ("a", "b"));
    }

    #[test]
    fn test_nested_write_is_conflict() {
        let set = DerivationSet::new()
            .with(Fixed("a", TreePath::new(["x"]), json!({"y": 1})))
            .with(Fixed("b", TreePath::new(["x", "z"]), json!(2)));
        assert!(set.derive(&json!({})).to_tree().is_err());
    }

    #[test]
    fn test_identical_duplicates_collapse() {
        let set = DerivationSet::new()
            .with(Fixed("a", TreePath::new(["x"]), json!(1)))
            .with(Fixed("b", TreePath::new(["x"]), json!(1)));
        assert_eq!(set.derive(&json!({})).to_tree().unwrap(), json!({"x": 1}));
    }

    #[test]
    fn test_annotation_entry() {
        let entry = DerivedEntry::annotation("class", "kubernetes.io/ingress.class", "alb");
        assert_eq!(
            entry.path.segments(),
            &["metadata", "annotations", "kubernetes.io/ingress.class"]
        );
        assert_eq!(entry.value, json!("alb"));
    }
}
