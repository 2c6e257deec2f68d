//! TOML-based configuration for Sifter.
//!
//! Example configuration:
//! ```toml
//! dialect = "postgres"
//!
//! [parameters]
//! filter = "filter"
//! sort = "sort"
//! include = "include"
//!
//! [resources.test_models]
//! filters = ["name", { internal = "related-models.name", external = "related-name" }]
//! sorts = ["name", { internal = "full_name", external = "full-name" }]
//! includes = ["related-models.nested-related-models"]
//! default_sort = "-name"
//!
//! [resources.test_models.defaults]
//! name = "Test"
//!
//! [tables.test_models]
//! primary_key = "id"
//!
//! [tables.test_models.relations.relatedModels]
//! table = "related_models"
//! foreign_key = "test_model_id"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::allow_list::{names_match, AllowEntry, AllowList, FilterSpec, IncludeSpec, SortSpec};
use crate::path;
use crate::sql::{Dialect, Relation, Schema, TableSchema};
use crate::value::FilterValue;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// SQL dialect for the SQL sink (duckdb, postgres, mysql, tsql).
    pub dialect: Option<String>,

    /// Request parameter names.
    pub parameters: ParameterNames,

    /// Allow-lists keyed by base table.
    pub resources: BTreeMap<String, ResourceSettings>,

    /// Tables and their relations.
    pub tables: BTreeMap<String, TableSettings>,
}

/// Names of the request parameters carrying filters, sorts and includes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParameterNames {
    pub filter: String,
    pub sort: String,
    pub include: String,
}

impl Default for ParameterNames {
    fn default() -> Self {
        Self {
            filter: "filter".to_string(),
            sort: "sort".to_string(),
            include: "include".to_string(),
        }
    }
}

/// Allow-list declaration for one resource.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourceSettings {
    pub filters: Vec<AllowEntry>,

    /// For the alias form, `internal` is the column to order by.
    pub sorts: Vec<AllowEntry>,

    pub includes: Vec<AllowEntry>,

    /// Sort applied when a request has none.
    pub default_sort: Option<String>,

    /// Filter values applied when a request does not name the filter.
    pub defaults: BTreeMap<String, FilterValue>,
}

/// One table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TableSettings {
    pub primary_key: String,

    /// Relations keyed by accessor name.
    pub relations: BTreeMap<String, RelationSettings>,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            primary_key: "id".to_string(),
            relations: BTreeMap::new(),
        }
    }
}

/// One relation. `related.foreign_key = parent.local_key`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelationSettings {
    /// Related table; defaults to the table-cased accessor name.
    #[serde(default)]
    pub table: Option<String>,

    /// Column on the related table; defaults to `<singular parent table>_id`.
    #[serde(default)]
    pub foreign_key: Option<String>,

    /// Column on the parent table; defaults to its primary key.
    #[serde(default)]
    pub local_key: Option<String>,
}

impl Settings {
    /// Parse settings from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SIFTER_CONFIG`
    /// 2. `./sifter.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("SIFTER_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("sifter.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        Ok(Settings::default())
    }

    /// The configured dialect, DuckDB when unset.
    pub fn dialect(&self) -> Result<Dialect, SettingsError> {
        match &self.dialect {
            Some(name) => name
                .parse()
                .map_err(|_| SettingsError::UnsupportedDialect(name.clone())),
            None => Ok(Dialect::default()),
        }
    }

    pub fn resource(&self, name: &str) -> Result<&ResourceSettings, SettingsError> {
        self.resources
            .get(name)
            .ok_or_else(|| SettingsError::ResourceNotFound(name.to_string()))
    }

    /// Build the allow-list declared for `resource`.
    pub fn allow_list(&self, resource: &str) -> Result<AllowList, SettingsError> {
        self.resource(resource)?.allow_list()
    }

    /// Build the table schema with relation defaults filled in.
    pub fn schema(&self) -> Schema {
        let mut schema = Schema::new();
        for (name, table) in &self.tables {
            let mut table_schema = TableSchema::new(name).with_primary_key(&table.primary_key);
            for (accessor, relation) in &table.relations {
                let related = relation
                    .table
                    .clone()
                    .unwrap_or_else(|| path::table_case(accessor));
                let foreign_key = relation
                    .foreign_key
                    .clone()
                    .unwrap_or_else(|| path::foreign_key_for(name));
                let local_key = relation
                    .local_key
                    .clone()
                    .unwrap_or_else(|| table.primary_key.clone());
                table_schema = table_schema.with_relation(
                    accessor,
                    Relation {
                        table: related,
                        foreign_key,
                        local_key,
                    },
                );
            }
            schema = schema.with_table(table_schema);
        }
        schema
    }

    /// Check that every resource builds and every dialect name is known.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.dialect()?;
        for name in self.resources.keys() {
            self.allow_list(name)?;
        }
        Ok(())
    }
}

impl ResourceSettings {
    /// Build the allow-list, attaching default values and checking the default sort.
    pub fn allow_list(&self) -> Result<AllowList, SettingsError> {
        let mut filters: Vec<FilterSpec> = self.filters.iter().cloned().map(Into::into).collect();
        for (name, value) in &self.defaults {
            let spec = filters
                .iter_mut()
                .find(|f| names_match(&f.external_name, name))
                .ok_or_else(|| {
                    SettingsError::InvalidConfig(format!(
                        "default value for undeclared filter '{}'",
                        name
                    ))
                })?;
            spec.default_value = Some(value.clone());
        }

        let allow_list = AllowList::new()
            .filters(filters)
            .sorts(self.sorts.iter().cloned().map(SortSpec::from))
            .includes(self.includes.iter().cloned().map(IncludeSpec::from));

        if let Some(default_sort) = &self.default_sort {
            for directive in crate::sort::SortDirective::parse_list(default_sort) {
                if allow_list.resolve_sort(&directive.name).is_none() {
                    return Err(SettingsError::InvalidConfig(format!(
                        "default sort '{}' is not an allowed sort",
                        directive.name
                    )));
                }
            }
        }

        Ok(allow_list)
    }
}
