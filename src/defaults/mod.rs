//! Default resolver
//!
//! Fills a merged user tree from a component's internal defaults:
//! 1. General merge, user wins: `merge([internal, user])`
//! 2. Field rules (fill-if-absent, copy, flag coercion, reserved paths)
//! 3. Owned fields written back from the internal tree, so no user value at
//!    any depth can shadow them

mod policy;

pub use policy::{FieldPolicy, OwnedFieldPolicy};

use compose_tree::{get, merge, with_value, without_value, ConfigNode, TreePath};

/// A field-specific fallback applied after the general merge
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// Set `value` when the path is missing, null, or an empty string
    FillIfAbsent { path: TreePath, value: ConfigNode },
    /// Copy the value at `from` when `path` is missing
    CopyIfAbsent { path: TreePath, from: TreePath },
    /// Only a literal `false` stays false; any other present value becomes
    /// `true`. Absent stays absent.
    CoerceFlag { path: TreePath },
    /// Like `FillIfAbsent`, with the release name as the value
    FillWithRelease { path: TreePath },
    /// Computed by a derivation; any user value is dropped
    Reserved { path: TreePath },
}

fn is_absent(tree: &ConfigNode, path: &TreePath) -> bool {
    match get(tree, path) {
        Some(ConfigNode::String(s)) => s.is_empty(),
        other => other.map_or(true, ConfigNode::is_null),
    }
}

impl FieldRule {
    fn apply(&self, tree: ConfigNode, release: &str) -> ConfigNode {
        match self {
            FieldRule::FillIfAbsent { path, value } => {
                if is_absent(&tree, path) {
                    with_value(&tree, path, value.clone())
                } else {
                    tree
                }
            }
            FieldRule::FillWithRelease { path } => {
                if is_absent(&tree, path) {
                    with_value(&tree, path, ConfigNode::String(release.to_string()))
                } else {
                    tree
                }
            }
            FieldRule::Reserved { path } => {
                if get(&tree, path).is_none() {
                    return tree;
                }
                tracing::warn!(path = %path, "ignoring user value at a component-computed path");
                without_value(&tree, path)
            }
            FieldRule::CopyIfAbsent { path, from } => {
                if get(&tree, path).is_some() {
                    return tree;
                }
                match get(&tree, from).cloned() {
                    Some(value) => with_value(&tree, path, value),
                    None => tree,
                }
            }
            FieldRule::CoerceFlag { path } => match get(&tree, path) {
                None => tree,
                Some(ConfigNode::Bool(_)) => tree,
                Some(_) => with_value(&tree, path, ConfigNode::Bool(true)),
            },
        }
    }
}

/// Non-user-configurable wiring supplied by a component
#[derive(Debug, Clone)]
pub struct InternalDefaults {
    /// Component identifier, used as the origin label
    pub component: String,
    pub tree: ConfigNode,
    pub policy: OwnedFieldPolicy,
    pub rules: Vec<FieldRule>,
}

impl InternalDefaults {
    pub fn new(component: impl Into<String>, tree: ConfigNode) -> Self {
        Self {
            component: component.into(),
            tree,
            policy: OwnedFieldPolicy::new(),
            rules: Vec::new(),
        }
    }

    /// Mark `path` as owned: the internal value always wins.
    pub fn owned(mut self, path: TreePath) -> Self {
        self.policy = self.policy.internal_wins(path);
        self
    }

    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Resolve a merged user tree, using the component id as release name.
    pub fn resolve(&self, user: &ConfigNode) -> ConfigNode {
        self.resolve_release(&self.component, user)
    }

    /// Resolve a merged user tree for the release `release`.
    pub fn resolve_release(&self, release: &str, user: &ConfigNode) -> ConfigNode {
        let filled = self
            .rules
            .iter()
            .fold(resolve(user, &self.tree, &self.policy), |tree, rule| {
                rule.apply(tree, release)
            });
        // Rules must not shadow owned fields either
        apply_owned(filled, &self.tree, &self.policy)
    }
}

/// Merge `internal` under `user`, then write owned fields back from
/// `internal`. The inputs are left untouched.
pub fn resolve(user: &ConfigNode, internal: &ConfigNode, policy: &OwnedFieldPolicy) -> ConfigNode {
    let merged = merge(&[internal.clone(), user.clone()]);
    apply_owned(merged, internal, policy)
}

fn apply_owned(tree: ConfigNode, internal: &ConfigNode, policy: &OwnedFieldPolicy) -> ConfigNode {
    policy.owned_paths().fold(tree, |tree, path| match get(internal, path) {
        Some(value) => {
            if get(&tree, path) != Some(value) {
                tracing::debug!(path = %path, "owned field restored from internal defaults");
            }
            with_value(&tree, path, value.clone())
        }
        // Nothing to enforce; absence is reported at assembly
        None => tree,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(segments: &[&str]) -> TreePath {
        TreePath::new(segments.iter().copied())
    }

    #[test]
    fn test_internal_wins_over_user() {
        let policy = OwnedFieldPolicy::new().internal_wins(path(&["backend"]));
        let resolved = resolve(&json!({"backend": "user"}), &json!({"backend": "system"}), &policy);
        assert_eq!(resolved["backend"], "system");
    }

    #[test]
    fn test_user_wins_elsewhere() {
        let policy = OwnedFieldPolicy::new().internal_wins(path(&["backend"]));
        let resolved = resolve(
            &json!({"replicas": 5, "metadata": {"annotations": {"custom": "x"}}}),
            &json!({"backend": "system", "replicas": 2}),
            &policy,
        );
        assert_eq!(resolved["replicas"], 5);
        assert_eq!(resolved["backend"], "system");
        assert_eq!(resolved["metadata"]["annotations"]["custom"], "x");
    }

    #[test]
    fn test_owned_subtree_replaced_at_depth() {
        let policy = OwnedFieldPolicy::new().internal_wins(path(&["ingressServiceBackend"]));
        let internal = json!({
            "ingressServiceBackend": {"name": "tezos-node-rpc", "port": {"number": 8732}}
        });
        let user = json!({
            "ingressServiceBackend": {"port": {"number": 1}, "extra": true}
        });
        let resolved = resolve(&user, &internal, &policy);
        assert_eq!(
            resolved["ingressServiceBackend"],
            json!({"name": "tezos-node-rpc", "port": {"number": 8732}})
        );
    }

    #[test]
    fn test_owned_path_under_user_scalar() {
        let policy = OwnedFieldPolicy::new().internal_wins(path(&["fetchOpts", "repo"]));
        let internal = json!({"fetchOpts": {"repo": "https://charts.example"}});
        let resolved = resolve(&json!({"fetchOpts": "nope"}), &internal, &policy);
        assert_eq!(resolved["fetchOpts"]["repo"], "https://charts.example");
    }

    #[test]
    fn test_missing_internal_value_is_tolerated() {
        let policy = OwnedFieldPolicy::new().internal_wins(path(&["backend"]));
        let resolved = resolve(&json!({"backend": "user"}), &json!({}), &policy);
        assert_eq!(resolved["backend"], "user");
    }

    #[test]
    fn test_resolve_does_not_mutate_inputs() {
        let user = json!({"a": {"b": 1}});
        let internal = json!({"a": {"c": 2}});
        let policy = OwnedFieldPolicy::new();
        let _ = resolve(&user, &internal, &policy);
        assert_eq!(user, json!({"a": {"b": 1}}));
        assert_eq!(internal, json!({"a": {"c": 2}}));
    }

    #[test]
    fn test_fill_if_absent() {
        let defaults = InternalDefaults::new("test", json!({})).rule(FieldRule::FillIfAbsent {
            path: path(&["loadBalancerScheme"]),
            value: json!("internet-facing"),
        });
        assert_eq!(defaults.resolve(&json!({}))["loadBalancerScheme"], "internet-facing");
        assert_eq!(
            defaults.resolve(&json!({"loadBalancerScheme": ""}))["loadBalancerScheme"],
            "internet-facing"
        );
        assert_eq!(
            defaults.resolve(&json!({"loadBalancerScheme": "internal"}))["loadBalancerScheme"],
            "internal"
        );
    }

    #[test]
    fn test_copy_if_absent() {
        let defaults = InternalDefaults::new("test", json!({"values": {"replicaCount": 2}})).rule(
            FieldRule::CopyIfAbsent {
                path: path(&["values", "clusterName"]),
                from: path(&["clusterName"]),
            },
        );
        let resolved = defaults.resolve(&json!({"clusterName": "mainnet"}));
        assert_eq!(resolved["values"]["clusterName"], "mainnet");
        assert_eq!(resolved["values"]["replicaCount"], 2);

        let resolved = defaults.resolve(&json!({
            "clusterName": "mainnet",
            "values": {"clusterName": "explicit"}
        }));
        assert_eq!(resolved["values"]["clusterName"], "explicit");
    }

    #[test]
    fn test_coerce_flag() {
        let defaults = InternalDefaults::new("test", json!({}))
            .rule(FieldRule::CoerceFlag { path: path(&["skipAwait"]) });
        assert_eq!(defaults.resolve(&json!({"skipAwait": false}))["skipAwait"], false);
        assert_eq!(defaults.resolve(&json!({"skipAwait": "false"}))["skipAwait"], true);
        assert_eq!(defaults.resolve(&json!({"skipAwait": 0}))["skipAwait"], true);
        assert!(defaults.resolve(&json!({})).get("skipAwait").is_none());
    }

    #[test]
    fn test_fill_with_release() {
        let defaults = InternalDefaults::new("tezos-chart", json!({}))
            .rule(FieldRule::FillWithRelease { path: path(&["namespace"]) });
        assert_eq!(defaults.resolve_release("mainnet", &json!({}))["namespace"], "mainnet");
        assert_eq!(defaults.resolve(&json!({"namespace": ""}))["namespace"], "tezos-chart");
        assert_eq!(
            defaults.resolve_release("mainnet", &json!({"namespace": "tezos"}))["namespace"],
            "tezos"
        );
    }

    #[test]
    fn test_reserved_path_drops_user_value() {
        let defaults = InternalDefaults::new("test", json!({}))
            .rule(FieldRule::Reserved { path: path(&["paths"]) });
        let resolved = defaults.resolve(&json!({"paths": [{"path": "/*"}], "host": "a"}));
        assert_eq!(resolved, json!({"host": "a"}));
        assert_eq!(defaults.resolve(&json!({"host": "a"})), json!({"host": "a"}));
    }

    #[test]
    fn test_rules_cannot_shadow_owned_fields() {
        let defaults = InternalDefaults::new("test", json!({"chart": "tezos-chain"}))
            .owned(path(&["chart"]))
            .rule(FieldRule::CopyIfAbsent {
                path: path(&["chart"]),
                from: path(&["other"]),
            });
        let resolved = defaults.resolve(&json!({"chart": "evil", "other": "x"}));
        assert_eq!(resolved["chart"], "tezos-chain");
    }
}
