//! Owned-field precedence policy

use compose_tree::TreePath;

/// Which side wins at a path when both the component and the user set it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// The user value overrides the internal default (the general rule)
    UserWins,
    /// The internal default is written back after the merge
    InternalWins,
}

/// Per-path precedence exceptions for one component.
///
/// Paths not listed are [`FieldPolicy::UserWins`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedFieldPolicy {
    rules: Vec<(TreePath, FieldPolicy)>,
}

impl OwnedFieldPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `path` as owned by the component.
    pub fn internal_wins(mut self, path: TreePath) -> Self {
        self.set(path, FieldPolicy::InternalWins);
        self
    }

    /// Record an explicit policy for `path`, replacing any earlier entry.
    pub fn set(&mut self, path: TreePath, policy: FieldPolicy) {
        match self.rules.iter_mut().find(|(p, _)| *p == path) {
            Some(entry) => entry.1 = policy,
            None => self.rules.push((path, policy)),
        }
    }

    /// The policy for an exact path
    pub fn policy_for(&self, path: &TreePath) -> FieldPolicy {
        self.rules
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, policy)| *policy)
            .unwrap_or(FieldPolicy::UserWins)
    }

    /// Owned paths in declaration order
    pub fn owned_paths(&self) -> impl Iterator<Item = &TreePath> {
        self.rules
            .iter()
            .filter(|(_, policy)| *policy == FieldPolicy::InternalWins)
            .map(|(path, _)| path)
    }
}
