//! Serialization for handoff and diagnostics
//!
//! The canonical form is RFC 8785 JSON Canonicalization Scheme (JCS), so two
//! trees with the same content serialize to the same bytes regardless of key
//! insertion order.

use sha2::{Digest, Sha256};

use crate::error::TreeError;
use crate::ConfigNode;

/// Serialize to canonical JSON (JCS).
pub fn to_canonical_json(node: &ConfigNode) -> Result<String, TreeError> {
    let jcs_bytes =
        serde_json_canonicalizer::to_vec(node).map_err(|e| TreeError::Serialize(e.to_string()))?;
    String::from_utf8(jcs_bytes).map_err(|e| TreeError::Serialize(e.to_string()))
}

/// SHA-256 hex digest of the canonical form.
pub fn digest(node: &ConfigNode) -> Result<String, TreeError> {
    let jcs_bytes =
        serde_json_canonicalizer::to_vec(node).map_err(|e| TreeError::Serialize(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&jcs_bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Serialize to pretty JSON, keeping insertion order.
pub fn to_pretty_json(node: &ConfigNode) -> Result<String, TreeError> {
    serde_json::to_string_pretty(node).map_err(|e| TreeError::Serialize(e.to_string()))
}

/// Serialize to YAML, keeping insertion order.
pub fn to_yaml(node: &ConfigNode) -> Result<String, TreeError> {
    serde_yaml_ng::to_string(node).map_err(|e| TreeError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_ignores_key_order() {
        let a = json!({"b": 1, "a": {"y": true, "x": null}});
        let b = json!({"a": {"x": null, "y": true}, "b": 1});
        assert_eq!(to_canonical_json(&a).unwrap(), to_canonical_json(&b).unwrap());
        assert_eq!(to_canonical_json(&a).unwrap(), r#"{"a":{"x":null,"y":true},"b":1}"#);
    }

    #[test]
    fn test_canonical_matches_digest_input() {
        let node = json!({"metadata": {"annotations": {"pulumi.com/skipAwait": "true"}}, "a": 1.5});
        let text = to_canonical_json(&node).unwrap();
        assert_eq!(text, r#"{"a":1.5,"metadata":{"annotations":{"pulumi.com/skipAwait":"true"}}}"#);

        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        assert_eq!(digest(&node).unwrap(), hex::encode(hasher.finalize()));
    }

    #[test]
    fn test_digest_stable() {
        let a = json!({"spec": {"rules": [{"host": "a"}]}});
        let d1 = digest(&a).unwrap();
        let d2 = digest(&a.clone()).unwrap();
        assert_eq!(d1, d2);
        assert_eq!(d1.len(), 64);
        assert_ne!(d1, digest(&json!({"spec": {"rules": []}})).unwrap());
    }

    #[test]
    fn test_list_order_is_significant() {
        let a = json!({"paths": ["redirect", "backend"]});
        let b = json!({"paths": ["backend", "redirect"]});
        assert_ne!(digest(&a).unwrap(), digest(&b).unwrap());
    }

    #[test]
    fn test_yaml_output() {
        let node = json!({"replicas": 2, "aws": {"zoneType": "public"}});
        let yaml = to_yaml(&node).unwrap();
        assert_eq!(yaml, "replicas: 2\naws:\n  zoneType: public\n");
    }
}
