use serde_json::json;

use compose_tree::{is_present, kind_name, ConfigMap, ConfigNode};

use super::{mapping_or_empty, validate_metadata, OutputSchema};
use crate::derive::REDIRECT_SERVICE;

/// Kubernetes `networking.k8s.io/v1` Ingress arguments with a single rule
pub struct IngressSchema;

impl IngressSchema {
    fn check_path(index: usize, rule: &ConfigNode) -> Result<bool, String> {
        let service = rule
            .get("backend")
            .and_then(|backend| backend.get("service"))
            .filter(|service| is_present(service.get("name")))
            .ok_or_else(|| format!("path rule {} has no backend service name", index))?;

        let port = service.get("port");
        let has_port = port.and_then(|p| p.get("number")).map_or(false, ConfigNode::is_number)
            || is_present(port.and_then(|p| p.get("name")));
        if !has_port {
            return Err(format!("path rule {} backend service has no port", index));
        }

        Ok(service.get("name").and_then(ConfigNode::as_str) != Some(REDIRECT_SERVICE))
    }
}

impl OutputSchema for IngressSchema {
    fn name(&self) -> &'static str {
        "ingress"
    }

    fn shape(&self, tree: &ConfigNode) -> Result<ConfigNode, String> {
        let metadata = mapping_or_empty(tree, "metadata")?;
        validate_metadata(&metadata)?;

        let paths = match tree.get("paths") {
            Some(ConfigNode::Array(paths)) if !paths.is_empty() => paths,
            Some(ConfigNode::Array(_)) | None | Some(ConfigNode::Null) => {
                return Err("no path rules; an ingress service backend is required".to_string())
            }
            Some(other) => return Err(format!("'paths' must be a list, found {}", kind_name(other))),
        };

        let mut routed = false;
        for (index, rule) in paths.iter().enumerate() {
            routed |= Self::check_path(index, rule)?;
        }
        if !routed {
            return Err("only the ssl redirect rule is present; no backend service to route to"
                .to_string());
        }

        let mut rule = ConfigMap::new();
        if let Some(host) = tree.get("host").filter(|h| is_present(Some(*h))) {
            rule.insert("host".to_string(), host.clone());
        }
        rule.insert("http".to_string(), json!({ "paths": paths }));

        let mut spec = ConfigMap::new();
        if let Some(tls) = tree.get("tls").filter(|t| is_present(Some(*t))) {
            spec.insert("tls".to_string(), tls.clone());
        }
        spec.insert("rules".to_string(), json!([rule]));

        Ok(json!({ "metadata": metadata, "spec": spec }))
    }
}
