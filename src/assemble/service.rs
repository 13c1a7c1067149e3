use serde_json::json;

use compose_tree::{kind_name, ConfigNode};

use super::{mapping_or_empty, validate_metadata, OutputSchema};

/// Kubernetes core/v1 Service arguments
pub struct ServiceSchema;

impl OutputSchema for ServiceSchema {
    fn name(&self) -> &'static str {
        "service"
    }

    fn shape(&self, tree: &ConfigNode) -> Result<ConfigNode, String> {
        let metadata = mapping_or_empty(tree, "metadata")?;
        validate_metadata(&metadata)?;

        let spec = mapping_or_empty(tree, "spec")?;
        match spec.get("selector") {
            Some(ConfigNode::Object(selector)) if !selector.is_empty() => {}
            Some(ConfigNode::Object(_)) | None | Some(ConfigNode::Null) => {
                return Err("spec.selector is required".to_string())
            }
            Some(other) => {
                return Err(format!("spec.selector must be a mapping, found {}", kind_name(other)))
            }
        }

        let ports = match spec.get("ports") {
            Some(ConfigNode::Array(ports)) if !ports.is_empty() => ports,
            _ => return Err("spec.ports must be a non-empty list".to_string()),
        };
        for (index, port) in ports.iter().enumerate() {
            if !port.get("port").map_or(false, ConfigNode::is_number) {
                return Err(format!("spec.ports[{}] has no numeric port", index));
            }
        }

        Ok(json!({ "metadata": metadata, "spec": spec }))
    }
}
