//! Table and relation metadata for SQL rendering.
//!
//! A relation accessor maps to the related table plus the key pair that
//! correlates it with its parent: `related.foreign_key = parent.local_key`.
//! Belongs-to relations are expressed by swapping the keys, e.g.
//! `foreign_key = "id"`, `local_key = "author_id"`.

use std::collections::BTreeMap;

/// A relation from one table to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub table: String,
    /// Column on the related table.
    pub foreign_key: String,
    /// Column on the parent table.
    pub local_key: String,
}

/// One table and its relation accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "builders have no effect until used"]
pub struct TableSchema {
    pub name: String,
    pub primary_key: String,
    pub relations: BTreeMap<String, Relation>,
}

impl TableSchema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            primary_key: "id".into(),
            relations: BTreeMap::new(),
        }
    }

    pub fn with_primary_key(mut self, primary_key: &str) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    pub fn with_relation(mut self, accessor: &str, relation: Relation) -> Self {
        self.relations.insert(accessor.into(), relation);
        self
    }
}

/// All known tables, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "builders have no effect until used"]
pub struct Schema {
    tables: BTreeMap<String, TableSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    /// The relation behind `accessor` on `table`.
    pub fn relation(&self, table: &str, accessor: &str) -> Option<&Relation> {
        self.tables.get(table)?.relations.get(accessor)
    }
}
