//! Composition errors
//!
//! Every error names the source or component it came from. Nothing here is
//! retried: the same input always fails the same way.

use compose_tree::{Location, TreeError};

/// Errors raised while composing a document
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("{origin}: parse error{}: {cause}", location.map(|l| format!(" at {}", l)).unwrap_or_default())]
    Parse {
        origin: String,
        location: Option<Location>,
        cause: String,
    },

    #[error("{origin}: schema error: {reason}")]
    Schema { origin: String, reason: String },

    #[error("{origin}: assembly error: {reason}")]
    Assembly { origin: String, reason: String },

    #[error("{origin}: IO error: {cause}")]
    Io { origin: String, cause: String },
}

impl ComposeError {
    /// Attach an origin label to a tree-level error.
    pub fn from_tree(err: TreeError, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        match err {
            TreeError::Parse { location, cause } => ComposeError::Parse {
                origin,
                location,
                cause,
            },
            TreeError::Schema { expected, found } => ComposeError::Schema {
                origin,
                reason: format!("expected a {} at the document root, found {}", expected, found),
            },
            TreeError::Io(e) => ComposeError::Io {
                origin,
                cause: e.to_string(),
            },
            TreeError::Serialize(cause) => ComposeError::Io { origin, cause },
        }
    }

    pub fn assembly(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        ComposeError::Assembly {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    pub fn schema(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        ComposeError::Schema {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// The source or component label this error is attributed to
    pub fn origin(&self) -> &str {
        match self {
            ComposeError::Parse { origin, .. }
            | ComposeError::Schema { origin, .. }
            | ComposeError::Assembly { origin, .. }
            | ComposeError::Io { origin, .. } => origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_carries_origin_and_location() {
        let err = ComposeError::from_tree(
            TreeError::Parse {
                location: Some(Location { line: 2, column: 4 }),
                cause: "did not find expected node content".to_string(),
            },
            "values file 1 (rpc.yaml)",
        );
        assert_eq!(err.origin(), "values file 1 (rpc.yaml)");
        assert_eq!(
            err.to_string(),
            "values file 1 (rpc.yaml): parse error at line 2, column 4: did not find expected node content"
        );
    }

    #[test]
    fn test_schema_error_message() {
        let err = ComposeError::from_tree(
            TreeError::Schema {
                expected: "mapping",
                found: "list",
            },
            "override cli",
        );
        assert!(matches!(err, ComposeError::Schema { .. }));
        assert!(err.to_string().contains("found list"));
    }
}
