//! Addressing nodes inside a tree
//!
//! Paths are key segments, never dotted strings: Kubernetes annotation keys
//! such as `alb.ingress.kubernetes.io/scheme` contain dots of their own.

use std::fmt;

use crate::{ConfigMap, ConfigNode};

/// A sequence of mapping keys from the root to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreePath(Vec<String>);

impl TreePath {
    /// The empty path, addressing the root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from key segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a dotted path. `\.` escapes a literal dot inside a segment.
    pub fn parse_dotted(s: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' if chars.peek() == Some(&'.') => {
                    current.push('.');
                    chars.next();
                }
                '.' => segments.push(std::mem::take(&mut current)),
                other => current.push(other),
            }
        }
        segments.push(current);
        Self(segments.into_iter().filter(|s| !s.is_empty()).collect())
    }

    /// Return a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `self` equals `other` or lies underneath it.
    pub fn starts_with(&self, other: &TreePath) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            if segment.contains('.') || segment.contains('/') {
                write!(f, "[\"{}\"]", segment)?;
            } else {
                if i > 0 {
                    write!(f, ".")?;
                }
                write!(f, "{}", segment)?;
            }
        }
        Ok(())
    }
}

/// Look up the node at `path`. Non-mapping intermediates yield `None`.
pub fn get<'a>(tree: &'a ConfigNode, path: &TreePath) -> Option<&'a ConfigNode> {
    let mut current = tree;
    for segment in path.segments() {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Return a copy of `tree` with `value` written at `path`.
///
/// Missing or non-mapping intermediates are replaced by mappings; the input
/// tree is left untouched.
pub fn with_value(tree: &ConfigNode, path: &TreePath, value: ConfigNode) -> ConfigNode {
    match path.segments().split_first() {
        None => value,
        Some((head, rest)) => {
            let mut map = tree.as_object().cloned().unwrap_or_else(ConfigMap::new);
            let child = map.get(head).cloned().unwrap_or(ConfigNode::Null);
            let updated = with_value(&child, &TreePath::new(rest.iter().cloned()), value);
            map.insert(head.clone(), updated);
            ConfigNode::Object(map)
        }
    }
}

/// Return a copy of `tree` with the node at `path` removed. Missing paths
/// leave the tree unchanged.
pub fn without_value(tree: &ConfigNode, path: &TreePath) -> ConfigNode {
    let Some((head, rest)) = path.segments().split_first() else {
        return tree.clone();
    };
    let Some(map) = tree.as_object() else {
        return tree.clone();
    };
    let mut map = map.clone();
    if rest.is_empty() {
        map.shift_remove(head);
    } else if let Some(child) = map.get(head) {
        let updated = without_value(child, &TreePath::new(rest.iter().cloned()));
        map.insert(head.clone(), updated);
    }
    ConfigNode::Object(map)
}

/// A value counts as present unless it is null, an empty string, or an
/// empty list.
pub fn is_present(node: Option<&ConfigNode>) -> bool {
    match node {
        None | Some(ConfigNode::Null) => false,
        Some(ConfigNode::String(s)) => !s.is_empty(),
        Some(ConfigNode::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// Short name of a node's kind, for error messages.
pub fn kind_name(node: &ConfigNode) -> &'static str {
    match node {
        ConfigNode::Null => "null",
        ConfigNode::Bool(_) => "boolean",
        ConfigNode::Number(_) => "number",
        ConfigNode::String(_) => "string",
        ConfigNode::Array(_) => "list",
        ConfigNode::Object(_) => "mapping",
    }
}
