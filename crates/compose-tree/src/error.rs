//! Tree-level errors

use std::fmt;

/// Line/column position inside a source document (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Compute a location from a byte offset into `text`.
    pub fn from_offset(text: &str, offset: usize) -> Self {
        let offset = offset.min(text.len());
        let before = text.get(..offset).unwrap_or(text);
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => offset - newline,
            None => offset + 1,
        };
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors raised while reading or parsing a document.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("{}{cause}", location.map(|l| format!("{}: ", l)).unwrap_or_default())]
    Parse {
        location: Option<Location>,
        cause: String,
    },

    #[error("expected a {expected} at the document root, found {found}")]
    Schema {
        expected: &'static str,
        found: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_offset() {
        let text = "a: 1\nb: [\nc: 3\n";
        assert_eq!(Location::from_offset(text, 0), Location { line: 1, column: 1 });
        assert_eq!(Location::from_offset(text, 5), Location { line: 2, column: 1 });
        assert_eq!(Location::from_offset(text, 8), Location { line: 2, column: 4 });
    }

    #[test]
    fn test_parse_error_display() {
        let err = TreeError::Parse {
            location: Some(Location { line: 3, column: 7 }),
            cause: "unexpected end of input".to_string(),
        };
        assert_eq!(err.to_string(), "line 3, column 7: unexpected end of input");

        let err = TreeError::Parse {
            location: None,
            cause: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "bad");
    }
}
