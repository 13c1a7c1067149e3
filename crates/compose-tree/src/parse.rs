//! Document parser
//!
//! Reads YAML, JSON or TOML text into a [`ConfigNode`] and checks the root
//! shape the caller asked for.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::error::{Location, TreeError};
use crate::path::kind_name;
use crate::{ConfigMap, ConfigNode};

/// Source document syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
    Toml,
}

impl DocumentFormat {
    /// Detect the format from a file extension. Unknown extensions are read
    /// as YAML, which also accepts JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => DocumentFormat::Json,
            Some("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Root shape required by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootShape {
    /// The root must be a mapping
    Mapping,
    /// Any root is accepted
    Any,
}

/// Parse `text` and validate its root shape.
pub fn parse(text: &str, format: DocumentFormat, shape: RootShape) -> Result<ConfigNode, TreeError> {
    let node = match format {
        DocumentFormat::Yaml => parse_yaml(text)?,
        DocumentFormat::Json => parse_json(text)?,
        DocumentFormat::Toml => parse_toml(text)?,
    };

    if shape == RootShape::Mapping && !node.is_object() {
        return Err(TreeError::Schema {
            expected: "mapping",
            found: kind_name(&node),
        });
    }

    Ok(node)
}

/// Read and parse a file, returning the tree and the SHA-256 hex digest of
/// the raw bytes.
pub fn parse_file(path: &Path, shape: RootShape) -> Result<(ConfigNode, String), TreeError> {
    let bytes = fs::read(path)?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents = String::from_utf8(bytes).map_err(|e| TreeError::Parse {
        location: None,
        cause: format!("invalid UTF-8: {}", e),
    })?;

    let node = parse(&contents, DocumentFormat::from_path(path), shape)?;
    Ok((node, digest))
}

/// Parse a single scalar the way a YAML document would type it
/// (`true`, `8732`, `null`, `"quoted"`). Anything that is not a scalar is
/// kept as the literal string.
pub fn parse_scalar(s: &str) -> ConfigNode {
    if s.is_empty() {
        return ConfigNode::String(String::new());
    }
    match serde_yaml_ng::from_str::<ConfigNode>(s) {
        Ok(ConfigNode::Array(_)) | Ok(ConfigNode::Object(_)) | Err(_) => {
            ConfigNode::String(s.to_string())
        }
        Ok(node) => node,
    }
}

fn is_blank_yaml(text: &str) -> bool {
    text.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "---" || trimmed == "..."
    })
}

fn parse_yaml(text: &str) -> Result<ConfigNode, TreeError> {
    if is_blank_yaml(text) {
        return Ok(ConfigNode::Null);
    }
    serde_yaml_ng::from_str::<ConfigNode>(text).map_err(|e| TreeError::Parse {
        location: e.location().map(|l| Location {
            line: l.line(),
            column: l.column(),
        }),
        cause: e.to_string(),
    })
}

fn parse_json(text: &str) -> Result<ConfigNode, TreeError> {
    if text.trim().is_empty() {
        return Ok(ConfigNode::Null);
    }
    serde_json::from_str::<ConfigNode>(text).map_err(|e| TreeError::Parse {
        location: Some(Location {
            line: e.line(),
            column: e.column(),
        }),
        cause: e.to_string(),
    })
}

fn parse_toml(text: &str) -> Result<ConfigNode, TreeError> {
    let table: toml::Table = toml::from_str(text).map_err(|e| TreeError::Parse {
        location: e.span().map(|span| Location::from_offset(text, span.start)),
        cause: e.message().to_string(),
    })?;
    Ok(toml_to_node(toml::Value::Table(table)))
}

/// Convert a TOML value to a tree node
pub fn toml_to_node(toml: toml::Value) -> ConfigNode {
    match toml {
        toml::Value::String(s) => ConfigNode::String(s),
        toml::Value::Integer(i) => ConfigNode::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(ConfigNode::Number)
            .unwrap_or(ConfigNode::Null),
        toml::Value::Boolean(b) => ConfigNode::Bool(b),
        toml::Value::Datetime(dt) => ConfigNode::String(dt.to_string()),
        toml::Value::Array(arr) => ConfigNode::Array(arr.into_iter().map(toml_to_node).collect()),
        toml::Value::Table(table) => {
            let map: ConfigMap = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_node(v)))
                .collect();
            ConfigNode::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_yaml_mapping() {
        let text = "host: rpc.example.com\ntls:\n  - hosts: [rpc.example.com]\nskipAwait: false\n";
        let node = parse(text, DocumentFormat::Yaml, RootShape::Mapping).unwrap();
        assert_eq!(node["host"], "rpc.example.com");
        assert_eq!(node["tls"][0]["hosts"][0], "rpc.example.com");
        assert_eq!(node["skipAwait"], false);
    }

    #[test]
    fn test_parse_yaml_preserves_key_order() {
        let text = "zeta: 1\nalpha: 2\nmid: 3\n";
        let node = parse(text, DocumentFormat::Yaml, RootShape::Mapping).unwrap();
        let keys: Vec<_> = node.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_parse_json() {
        let node = parse(r#"{"a": [1, 2]}"#, DocumentFormat::Json, RootShape::Mapping).unwrap();
        assert_eq!(node, json!({"a": [1, 2]}));
    }

    #[test]
    fn test_parse_toml() {
        let text = "replicas = 2\n[aws]\nzoneType = \"public\"\n";
        let node = parse(text, DocumentFormat::Toml, RootShape::Mapping).unwrap();
        assert_eq!(node, json!({"replicas": 2, "aws": {"zoneType": "public"}}));
    }

    #[test]
    fn test_yaml_syntax_error_has_location() {
        let text = "a: 1\nb: [unclosed\n";
        let err = parse(text, DocumentFormat::Yaml, RootShape::Any).unwrap_err();
        match err {
            TreeError::Parse { location, .. } => assert!(location.is_some()),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_json_syntax_error_has_location() {
        let err = parse("{\n  \"a\": \n}", DocumentFormat::Json, RootShape::Any).unwrap_err();
        match err {
            TreeError::Parse { location, .. } => {
                assert_eq!(location.map(|l| l.line), Some(3));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_toml_syntax_error_has_location() {
        let err = parse("a = 1\nb = \n", DocumentFormat::Toml, RootShape::Any).unwrap_err();
        match err {
            TreeError::Parse { location, .. } => {
                assert_eq!(location.map(|l| l.line), Some(2));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_scalar_root_is_schema_error() {
        let err = parse("just text", DocumentFormat::Yaml, RootShape::Mapping).unwrap_err();
        assert!(matches!(
            err,
            TreeError::Schema {
                expected: "mapping",
                found: "string"
            }
        ));
    }

    #[test]
    fn test_list_root_is_schema_error() {
        let err = parse("- a\n- b\n", DocumentFormat::Yaml, RootShape::Mapping).unwrap_err();
        assert!(matches!(err, TreeError::Schema { found: "list", .. }));
    }

    #[test]
    fn test_list_root_accepted_when_any() {
        let node = parse("- a\n- b\n", DocumentFormat::Yaml, RootShape::Any).unwrap();
        assert_eq!(node, json!(["a", "b"]));
    }

    #[test]
    fn test_empty_document_is_null() {
        let node = parse("# nothing here\n---\n", DocumentFormat::Yaml, RootShape::Any).unwrap();
        assert!(node.is_null());

        let err = parse("", DocumentFormat::Yaml, RootShape::Mapping).unwrap_err();
        assert!(matches!(err, TreeError::Schema { found: "null", .. }));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("v.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("v.YML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("v.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("v.toml")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("values")), DocumentFormat::Yaml);
    }

    #[test]
    fn test_parse_file_returns_digest() {
        let mut temp = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(temp, "replicas: 2").unwrap();

        let (node, digest) = parse_file(temp.path(), RootShape::Mapping).unwrap();
        assert_eq!(node["replicas"], 2);
        assert_eq!(digest.len(), 64);

        let (_, again) = parse_file(temp.path(), RootShape::Mapping).unwrap();
        assert_eq!(digest, again);
    }

    #[test]
    fn test_parse_file_missing_is_io_error() {
        let err = parse_file(Path::new("/nonexistent/values.yaml"), RootShape::Mapping).unwrap_err();
        assert!(matches!(err, TreeError::Io(_)));
    }

    #[test]
    fn test_parse_scalar() {
        assert_eq!(parse_scalar("true"), json!(true));
        assert_eq!(parse_scalar("8732"), json!(8732));
        assert_eq!(parse_scalar("null"), json!(null));
        assert_eq!(parse_scalar("internal"), json!("internal"));
        assert_eq!(parse_scalar("\"8732\""), json!("8732"));
        assert_eq!(parse_scalar("[a, b]"), json!("[a, b]"));
        assert_eq!(parse_scalar(""), json!(""));
    }
}
