//! The directive sink: the only surface the resolvers call into.
//!
//! A sink is implemented by whatever actually builds queries. The resolvers
//! never look at storage; they hand equality, membership, existence, order
//! and eager-load directives to a sink scoped to the current record.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::trace;

use crate::error::ResolveResult;
use crate::path;
use crate::value::Value;

/// Callback that fills a sink scoped to a related record.
pub type ScopeBuilder<'a> = dyn FnMut(&mut dyn QueryDirectiveSink) -> ResolveResult<()> + 'a;

/// Receiver of resolved query directives.
pub trait QueryDirectiveSink {
    /// Table of the record this sink constrains. Paths qualified with this
    /// table (`table.column`) are direct attributes.
    fn table(&self) -> &str;

    /// `path = value`; a null value means `path IS NULL`.
    fn add_equality_constraint(&mut self, path: &str, value: &Value);

    /// `path IN (values)`; an empty list matches nothing.
    fn add_membership_constraint(&mut self, path: &str, values: &[Value]);

    /// Require at least one record in `relation` satisfying whatever `inner`
    /// adds to the related-record sink it receives.
    fn add_relation_existence_constraint(
        &mut self,
        relation: &str,
        inner: &mut ScopeBuilder<'_>,
    ) -> ResolveResult<()>;

    fn add_order(&mut self, column: &str, descending: bool);

    /// Eager-load a relation accessor path, optionally exposed under an alias.
    fn add_eager_load(&mut self, relation: &str, alias: Option<&str>);
}

// =============================================================================
// Recording sink
// =============================================================================

/// A directive captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Directive {
    Equality {
        path: String,
        value: Value,
    },
    Membership {
        path: String,
        values: Vec<Value>,
    },
    Exists {
        relation: String,
        table: String,
        directives: Vec<Directive>,
    },
    Order {
        column: String,
        descending: bool,
    },
    EagerLoad {
        relation: String,
        alias: Option<String>,
    },
}

/// In-memory sink that records directives as a tree.
///
/// Related tables come from [`RecordingSink::with_relation`]; unregistered
/// relations fall back to the table-cased accessor (`relatedModels` ->
/// `related_models`).
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    table: String,
    relations: BTreeMap<String, String>,
    directives: Vec<Directive>,
}

impl RecordingSink {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            relations: BTreeMap::new(),
            directives: Vec::new(),
        }
    }

    /// Map a relation accessor to its table.
    pub fn with_relation(mut self, relation: &str, table: &str) -> Self {
        self.relations.insert(relation.into(), table.into());
        self
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn into_directives(self) -> Vec<Directive> {
        self.directives
    }

    fn related_table(&self, relation: &str) -> String {
        self.relations
            .get(relation)
            .cloned()
            .unwrap_or_else(|| path::table_case(relation))
    }
}

impl QueryDirectiveSink for RecordingSink {
    fn table(&self) -> &str {
        &self.table
    }

    fn add_equality_constraint(&mut self, path: &str, value: &Value) {
        trace!(table = %self.table, path, %value, "equality");
        self.directives.push(Directive::Equality {
            path: path.into(),
            value: value.clone(),
        });
    }

    fn add_membership_constraint(&mut self, path: &str, values: &[Value]) {
        trace!(table = %self.table, path, count = values.len(), "membership");
        self.directives.push(Directive::Membership {
            path: path.into(),
            values: values.to_vec(),
        });
    }

    fn add_relation_existence_constraint(
        &mut self,
        relation: &str,
        inner: &mut ScopeBuilder<'_>,
    ) -> ResolveResult<()> {
        let mut scoped = RecordingSink {
            table: self.related_table(relation),
            relations: self.relations.clone(),
            directives: Vec::new(),
        };
        inner(&mut scoped)?;
        self.directives.push(Directive::Exists {
            relation: relation.into(),
            table: scoped.table,
            directives: scoped.directives,
        });
        Ok(())
    }

    fn add_order(&mut self, column: &str, descending: bool) {
        self.directives.push(Directive::Order {
            column: column.into(),
            descending,
        });
    }

    fn add_eager_load(&mut self, relation: &str, alias: Option<&str>) {
        self.directives.push(Directive::EagerLoad {
            relation: relation.into(),
            alias: alias.map(Into::into),
        });
    }
}
