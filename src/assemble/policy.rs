use serde_json::json;

use compose_tree::{is_present, ConfigNode};

use super::{is_string_or_string_list, OutputSchema};

/// AWS IAM policy document
pub struct PolicySchema;

impl OutputSchema for PolicySchema {
    fn name(&self) -> &'static str {
        "iam-policy"
    }

    fn shape(&self, tree: &ConfigNode) -> Result<ConfigNode, String> {
        let version = tree
            .get("Version")
            .filter(|v| is_present(Some(*v)))
            .and_then(ConfigNode::as_str)
            .ok_or_else(|| "Version is required".to_string())?;

        let statements = match tree.get("Statement") {
            Some(ConfigNode::Array(statements)) if !statements.is_empty() => statements,
            _ => return Err("Statement must be a non-empty list".to_string()),
        };

        for (index, statement) in statements.iter().enumerate() {
            match statement.get("Effect").and_then(ConfigNode::as_str) {
                Some("Allow") | Some("Deny") => {}
                _ => return Err(format!("Statement[{}].Effect must be Allow or Deny", index)),
            }
            for field in ["Action", "Resource"] {
                if !is_string_or_string_list(statement.get(field)) {
                    return Err(format!("Statement[{}].{} must not be empty", index, field));
                }
            }
        }

        Ok(json!({ "Version": version, "Statement": statements }))
    }
}
