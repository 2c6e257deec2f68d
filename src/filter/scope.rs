//! Tracking of paths rewritten while descending into relations.

use std::collections::BTreeSet;

/// Paths the exact filter produced itself while opening relation scopes.
///
/// A path in the scope is always treated as a direct attribute of the
/// current record, so relation detection never re-triggers on it. The scope
/// is a value: descending into a relation yields a new scope and leaves the
/// caller's untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationScope {
    rewritten: BTreeSet<String>,
}

impl RelationScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.rewritten.contains(path)
    }

    /// A copy of this scope that also contains `path`.
    #[must_use]
    pub fn with(&self, path: &str) -> Self {
        let mut rewritten = self.rewritten.clone();
        rewritten.insert(path.to_string());
        Self { rewritten }
    }

    pub fn len(&self) -> usize {
        self.rewritten.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewritten.is_empty()
    }
}
