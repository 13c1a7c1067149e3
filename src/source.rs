//! Merge sources with provenance
//!
//! A source stack holds the user-supplied trees for one composition in
//! precedence order (first is base, last wins) and remembers where each one
//! came from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use compose_tree::{
    empty_mapping, merge, parse, parse_file, parse_scalar, with_value, ConfigNode, DocumentFormat, RootShape,
    TreePath,
};

use crate::error::ComposeError;

/// Origin of a configuration source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceOrigin {
    /// A values document read from disk (1-based position in the stack)
    ValuesFile { index: usize, path: String },
    /// A programmatic or command-line override
    Override { label: String },
    /// A component's internal defaults
    InternalDefault { component: String },
    /// Entries computed by derivations
    Derived { component: String },
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOrigin::ValuesFile { index, path } => write!(f, "values file {} ({})", index, path),
            SourceOrigin::Override { label } => write!(f, "override {}", label),
            SourceOrigin::InternalDefault { component } => {
                write!(f, "internal defaults of {}", component)
            }
            SourceOrigin::Derived { component } => write!(f, "derived entries of {}", component),
        }
    }
}

/// A tree tagged with its origin
#[derive(Debug, Clone)]
pub struct MergeSource {
    pub origin: SourceOrigin,
    pub tree: ConfigNode,
    /// SHA-256 of the raw file bytes (files only)
    pub digest: Option<String>,
}

impl MergeSource {
    /// Load a values document. The root must be a mapping.
    pub fn from_file(path: &Path, index: usize) -> Result<Self, ComposeError> {
        let origin = SourceOrigin::ValuesFile {
            index,
            path: path.display().to_string(),
        };
        let (tree, digest) = parse_file(path, RootShape::Mapping)
            .map_err(|e| ComposeError::from_tree(e, origin.to_string()))?;
        Ok(Self {
            origin,
            tree,
            digest: Some(digest),
        })
    }

    /// Parse an in-memory document as an override.
    pub fn from_text(
        label: impl Into<String>,
        text: &str,
        format: DocumentFormat,
    ) -> Result<Self, ComposeError> {
        let origin = SourceOrigin::Override {
            label: label.into(),
        };
        let tree = parse(text, format, RootShape::Mapping)
            .map_err(|e| ComposeError::from_tree(e, origin.to_string()))?;
        Ok(Self {
            origin,
            tree,
            digest: None,
        })
    }

    /// Wrap an in-memory tree as an override. The root must be a mapping.
    pub fn from_tree(label: impl Into<String>, tree: ConfigNode) -> Result<Self, ComposeError> {
        let origin = SourceOrigin::Override {
            label: label.into(),
        };
        if !tree.is_object() {
            return Err(ComposeError::schema(
                origin.to_string(),
                format!(
                    "expected a mapping at the document root, found {}",
                    compose_tree::kind_name(&tree)
                ),
            ));
        }
        Ok(Self {
            origin,
            tree,
            digest: None,
        })
    }

    /// Build an override from `path=value` assignments. Dots separate path
    /// segments, `\.` is a literal dot, and values are typed like YAML
    /// scalars.
    pub fn from_assignments(label: impl Into<String>, assignments: &[String]) -> Result<Self, ComposeError> {
        let label = label.into();
        let mut tree = compose_tree::empty_mapping();
        for assignment in assignments {
            let (key, value) = assignment.split_once('=').ok_or_else(|| {
                ComposeError::Parse {
                    origin: format!("override {}", label),
                    location: None,
                    cause: format!("expected path=value, got '{}'", assignment),
                }
            })?;
            let path = TreePath::parse_dotted(key.trim());
            if path.is_root() {
                return Err(ComposeError::Parse {
                    origin: format!("override {}", label),
                    location: None,
                    cause: format!("empty path in '{}'", assignment),
                });
            }
            tree = with_value(&tree, &path, parse_scalar(value));
        }
        Self::from_tree(label, tree)
    }
}

/// A provenance record for one contributing source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub origin: SourceOrigin,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Ordered user sources for one composition
#[derive(Debug, Clone, Default)]
pub struct SourceStack {
    sources: Vec<MergeSource>,
}

impl SourceStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source with higher precedence than everything before it.
    pub fn push(&mut self, source: MergeSource) {
        tracing::debug!(origin = %source.origin, "adding merge source");
        self.sources.push(source);
    }

    pub fn with(mut self, source: MergeSource) -> Self {
        self.push(source);
        self
    }

    /// Load values files in order. Positions continue after any values files
    /// already on the stack.
    pub fn push_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<(), ComposeError> {
        for path in paths {
            let index = self
                .sources
                .iter()
                .filter(|s| matches!(s.origin, SourceOrigin::ValuesFile { .. }))
                .count()
                + 1;
            self.push(MergeSource::from_file(path.as_ref(), index)?);
        }
        Ok(())
    }

    pub fn sources(&self) -> &[MergeSource] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Merge every source into a new user tree.
    pub fn merged(&self) -> ConfigNode {
        let trees: Vec<ConfigNode> = self.sources.iter().map(|s| s.tree.clone()).collect();
        merge(&trees)
    }

    /// Merge every source, nesting values-file trees under `root` first.
    /// Overrides keep their own shape and still win over earlier files.
    pub fn merged_with_files_under(&self, root: &TreePath) -> ConfigNode {
        let trees: Vec<ConfigNode> = self
            .sources
            .iter()
            .map(|s| match s.origin {
                SourceOrigin::ValuesFile { .. } => {
                    with_value(&empty_mapping(), root, s.tree.clone())
                }
                _ => s.tree.clone(),
            })
            .collect();
        merge(&trees)
    }

    /// Provenance of the contributing sources, in precedence order
    pub fn records(&self) -> Vec<SourceRecord> {
        self.sources
            .iter()
            .map(|s| SourceRecord {
                origin: s.origin.clone(),
                digest: s.digest.clone(),
            })
            .collect()
    }
}
