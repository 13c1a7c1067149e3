//! Output serialization formats

use compose_tree::{to_canonical_json, to_pretty_json, to_yaml, ConfigNode, TreeError};

/// How composed documents are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// RFC 8785 canonical JSON (byte-stable)
    Json,
    /// Indented JSON
    #[default]
    Pretty,
    Yaml,
}

impl OutputFormat {
    pub fn render(self, node: &ConfigNode) -> Result<String, TreeError> {
        match self {
            OutputFormat::Json => to_canonical_json(node),
            OutputFormat::Pretty => to_pretty_json(node),
            OutputFormat::Yaml => to_yaml(node),
        }
    }

    /// File extension for written documents
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json | OutputFormat::Pretty => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_formats() {
        let node = json!({"b": 1, "a": [true]});
        assert_eq!(OutputFormat::Json.render(&node).unwrap(), r#"{"a":[true],"b":1}"#);
        assert!(OutputFormat::Pretty.render(&node).unwrap().contains("\n  \"b\": 1"));
        assert_eq!(OutputFormat::Yaml.render(&node).unwrap(), "b: 1\na:\n- true\n");
        assert_eq!(OutputFormat::Yaml.extension(), "yaml");
    }
}
