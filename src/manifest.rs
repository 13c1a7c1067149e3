//! Composition manifest (tezos-compose.toml)
//!
//! Lists the compositions to run, each naming a component, its values files
//! (relative to the manifest) and inline overrides.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use compose_tree::toml_to_node;

use crate::components::COMPONENT_IDS;
use crate::error::ComposeError;
use crate::source::{MergeSource, SourceStack};

/// Default manifest file name
pub const MANIFEST_FILE: &str = "tezos-compose.toml";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Error types for manifest operations
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// `[logging]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

/// One `[[composition]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionEntry {
    /// Unique name, also the output file stem
    pub name: String,

    /// Component identifier
    pub component: String,

    /// Values files in precedence order, relative to the manifest
    #[serde(default)]
    pub values_files: Vec<PathBuf>,

    /// Inline overrides, applied after every values file
    #[serde(default)]
    pub overrides: Option<toml::Table>,
}

/// Parsed manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default, rename = "composition")]
    pub compositions: Vec<CompositionEntry>,

    /// Directory values files are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Manifest {
    /// Load and parse a manifest from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let contents = fs::read_to_string(path)?;
        let mut manifest = Self::from_str(&contents)?;
        manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(manifest)
    }

    /// Parse a manifest from a TOML string
    pub fn from_str(s: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = toml::from_str(s)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<(), ManifestError> {
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ManifestError::ValidationError(format!(
                "Invalid log level '{}': must be one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        if self.compositions.is_empty() {
            return Err(ManifestError::ValidationError(
                "At least one [[composition]] must be defined".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for entry in &self.compositions {
            if entry.name.trim().is_empty() {
                return Err(ManifestError::ValidationError(
                    "Composition name cannot be empty".to_string(),
                ));
            }
            if entry.name.contains(['/', '\\']) || entry.name.contains("..") {
                return Err(ManifestError::ValidationError(format!(
                    "Composition name '{}' must not contain path separators or '..'",
                    entry.name
                )));
            }
            if !names.insert(entry.name.as_str()) {
                return Err(ManifestError::ValidationError(format!(
                    "Duplicate composition name '{}'",
                    entry.name
                )));
            }
            if !COMPONENT_IDS.contains(&entry.component.as_str()) {
                return Err(ManifestError::ValidationError(format!(
                    "Unknown component '{}' in composition '{}'",
                    entry.component, entry.name
                )));
            }
        }

        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&CompositionEntry> {
        self.compositions.iter().find(|e| e.name == name)
    }

    /// Load the sources of one entry: values files in order, then the
    /// inline overrides.
    pub fn source_stack(&self, entry: &CompositionEntry) -> Result<SourceStack, ComposeError> {
        let mut stack = SourceStack::new();

        let files: Vec<PathBuf> = entry
            .values_files
            .iter()
            .filter(|path| {
                let empty = path.as_os_str().is_empty();
                if empty {
                    tracing::warn!(composition = %entry.name, "ignoring empty values file entry");
                }
                !empty
            })
            .map(|path| self.base_dir.join(path))
            .collect();
        stack.push_files(&files)?;

        if let Some(overrides) = &entry.overrides {
            let tree = toml_to_node(toml::Value::Table(overrides.clone()));
            stack.push(MergeSource::from_tree(
                format!("{}.overrides", entry.name),
                tree,
            )?);
        }

        Ok(stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceOrigin;
    use std::io::Write;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
[logging]
level = "debug"
format = "json"

[[composition]]
name = "rpc"
component = "rpc-ingress"
values_files = ["rpc.yaml"]

[composition.overrides]
host = "rpc.example.com"

[[composition]]
name = "dns-policy"
component = "external-dns-policy"
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_str(MANIFEST).unwrap();
        assert_eq!(manifest.logging.level, "debug");
        assert_eq!(manifest.logging.format, LogFormat::Json);
        assert_eq!(manifest.compositions.len(), 2);

        let rpc = manifest.find("rpc").unwrap();
        assert_eq!(rpc.values_files, vec![PathBuf::from("rpc.yaml")]);
        assert_eq!(
            rpc.overrides.as_ref().unwrap().get("host").unwrap().as_str(),
            Some("rpc.example.com")
        );
        assert!(manifest.find("dns-policy").unwrap().overrides.is_none());
    }

    #[test]
    fn test_logging_defaults() {
        let manifest = Manifest::from_str(
            r#"
[[composition]]
name = "p2p"
component = "p2p-service"
"#,
        )
        .unwrap();
        assert_eq!(manifest.logging, LoggingConfig::default());
    }

    #[test]
    fn test_validation_errors() {
        let err = Manifest::from_str("").unwrap_err();
        assert!(err.to_string().contains("At least one"));

        let err = Manifest::from_str(
            r#"
[[composition]]
name = "a"
component = "faucet"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unknown component 'faucet'"));

        let err = Manifest::from_str(
            r#"
[[composition]]
name = "a"
component = "rpc-ingress"

[[composition]]
name = "a"
component = "tzkt-ingress"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate"));

        let err = Manifest::from_str(
            r#"
[logging]
level = "loud"

[[composition]]
name = "a"
component = "rpc-ingress"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_name_used_as_file_stem() {
        for name in ["../escape", "nested/chain", r"nested\\chain", ".."] {
            let err = Manifest::from_str(&format!(
                "[[composition]]\nname = '{}'\ncomponent = \"rpc-ingress\"\n",
                name
            ))
            .unwrap_err();
            assert!(err.to_string().contains("must not contain path separators"), "{}", name);
        }

        let manifest = Manifest::from_str(
            "[[composition]]\nname = \"rpc.mainnet\"\ncomponent = \"rpc-ingress\"\n",
        )
        .unwrap();
        assert_eq!(manifest.compositions[0].name, "rpc.mainnet");
    }

    #[test]
    fn test_parse_error() {
        let err = Manifest::from_str("[[composition]\n").unwrap_err();
        assert!(matches!(err, ManifestError::ParseError(_)));
    }

    #[test]
    fn test_source_stack_relative_to_manifest() {
        let dir = TempDir::new().unwrap();
        let manifest_path = dir.path().join(MANIFEST_FILE);
        fs::write(&manifest_path, MANIFEST).unwrap();
        let mut values = fs::File::create(dir.path().join("rpc.yaml")).unwrap();
        writeln!(values, "loadBalancerScheme: internal").unwrap();

        let manifest = Manifest::from_file(&manifest_path).unwrap();
        let stack = manifest.source_stack(manifest.find("rpc").unwrap()).unwrap();

        assert_eq!(stack.sources().len(), 2);
        assert!(matches!(
            stack.sources()[0].origin,
            SourceOrigin::ValuesFile { index: 1, .. }
        ));
        assert_eq!(
            stack.sources()[1].origin,
            SourceOrigin::Override {
                label: "rpc.overrides".to_string()
            }
        );
        let merged = stack.merged();
        assert_eq!(merged["loadBalancerScheme"], "internal");
        assert_eq!(merged["host"], "rpc.example.com");
    }
}
