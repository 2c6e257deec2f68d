//! Dotted property paths.
//!
//! A path such as `related-models.nested-related-models.name` is split into
//! relation segments (`relatedModels`, `nestedRelatedModels`) and a leaf
//! attribute (`name`). Relation segments are converted from the external
//! kebab/snake convention to the camel-case accessor convention; the leaf is
//! kept verbatim.

use inflector::Inflector;

/// Separator between relation segments and the leaf attribute.
pub const SEPARATOR: char = '.';

/// A property path split into relation accessors and a leaf attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    /// Relation accessors, outermost first, already in accessor casing.
    pub relations: Vec<String>,
    /// Terminal attribute name.
    pub leaf: String,
}

impl PropertyPath {
    /// True when the path traverses at least one relation.
    pub fn is_relation(&self) -> bool {
        !self.relations.is_empty()
    }

    /// The dotted relation-accessor chain, e.g. `relatedModels.nestedRelatedModels`.
    pub fn relation_accessor(&self) -> String {
        self.relations.join(".")
    }

    pub fn first_relation(&self) -> Option<&str> {
        self.relations.first().map(|s| s.as_str())
    }

    /// The path below the first relation: remaining relations plus the leaf.
    ///
    /// For `a.b.c` this is `b.c`; for `a.c` it is `c`.
    pub fn remainder(&self) -> String {
        let mut parts: Vec<&str> = self.relations.iter().skip(1).map(|s| s.as_str()).collect();
        parts.push(&self.leaf);
        parts.join(".")
    }
}

/// Split a dotted path into relation segments and a leaf.
///
/// Never fails: validity of the individual names is checked elsewhere.
pub fn resolve(path: &str) -> PropertyPath {
    let mut segments: Vec<&str> = path.split(SEPARATOR).collect();
    // split always yields at least one element
    let leaf = segments.pop().unwrap_or_default().to_string();
    PropertyPath {
        relations: segments.into_iter().map(accessor_case).collect(),
        leaf,
    }
}

/// Convert one external segment (`related-models`, `related_models`) to
/// accessor casing (`relatedModels`).
pub fn accessor_case(segment: &str) -> String {
    segment.to_camel_case()
}

/// Convert every segment of a relation path to accessor casing.
///
/// Used for include paths, which name relations all the way down.
pub fn accessor_path(path: &str) -> String {
    path.split(SEPARATOR)
        .map(accessor_case)
        .collect::<Vec<_>>()
        .join(".")
}

/// Conventional table name for a relation accessor: `relatedModels` -> `related_models`.
pub fn table_case(relation: &str) -> String {
    relation.to_table_case()
}

/// Conventional foreign key column pointing at `table`: `test_models` -> `test_model_id`.
pub fn foreign_key_for(table: &str) -> String {
    format!("{}_id", table.to_singular())
}

/// Every dotted prefix of a path, shortest first: `a.b.c` -> `a`, `a.b`, `a.b.c`.
pub fn prefixes(path: &str) -> Vec<String> {
    let segments: Vec<&str> = path.split(SEPARATOR).collect();
    (1..=segments.len())
        .map(|n| segments[..n].join("."))
        .collect()
}
