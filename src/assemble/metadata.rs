//! Kubernetes object metadata checks

use regex_lite::Regex;
use std::sync::OnceLock;

use compose_tree::{kind_name, ConfigNode};

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?$").expect("valid name pattern")
    })
}

fn prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")
            .expect("valid prefix pattern")
    })
}

/// Kubernetes qualified name: optional DNS subdomain prefix and `/`, then a
/// name of at most 63 characters.
pub fn is_qualified_name(key: &str) -> bool {
    let (prefix, name) = match key.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };
    if let Some(prefix) = prefix {
        if prefix.is_empty() || prefix.len() > 253 || !prefix_pattern().is_match(prefix) {
            return false;
        }
    }
    !name.is_empty() && name.len() <= 63 && name_pattern().is_match(name)
}

/// Annotation and label maps must use qualified keys and string values.
pub fn validate_metadata(metadata: &ConfigNode) -> Result<(), String> {
    for field in ["annotations", "labels"] {
        let entries = match metadata.get(field) {
            None | Some(ConfigNode::Null) => continue,
            Some(ConfigNode::Object(entries)) => entries,
            Some(other) => {
                return Err(format!(
                    "metadata.{} must be a mapping, found {}",
                    field,
                    kind_name(other)
                ))
            }
        };
        for (key, value) in entries {
            if !is_qualified_name(key) {
                return Err(format!("metadata.{} key '{}' is not a qualified name", field, key));
            }
            if !value.is_string() {
                return Err(format!(
                    "metadata.{} '{}' must be a string, found {}",
                    field,
                    key,
                    kind_name(value)
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_qualified_names() {
        assert!(is_qualified_name("kubernetes.io/ingress.class"));
        assert!(is_qualified_name("alb.ingress.kubernetes.io/actions.ssl-redirect"));
        assert!(is_qualified_name("pulumi.com/skipAwait"));
        assert!(is_qualified_name("app"));
        assert!(!is_qualified_name(""));
        assert!(!is_qualified_name("/name"));
        assert!(!is_qualified_name("Upper.Case/name"));
        assert!(!is_qualified_name("bad key"));
        assert!(!is_qualified_name(&"a".repeat(64)));
    }

    #[test]
    fn test_validate_metadata() {
        assert!(validate_metadata(&json!({"annotations": {"a.io/b": "c"}})).is_ok());
        assert!(validate_metadata(&json!({})).is_ok());

        let err = validate_metadata(&json!({"annotations": {"a.io/b": true}})).unwrap_err();
        assert!(err.contains("must be a string"));

        let err = validate_metadata(&json!({"labels": ["x"]})).unwrap_err();
        assert!(err.contains("must be a mapping"));
    }
}
