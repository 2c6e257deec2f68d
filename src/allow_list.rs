//! Allow-list registry for filters, sorts and includes.
//!
//! An allow-list is declared once per request by the application. Each entry
//! is either a bare name (external name equals internal path) or an alias
//! (`internal => external`). Lookups by external name are case-insensitive.
//!
//! Registration rules:
//! - re-declaring an external name replaces the earlier entry;
//! - an alias supersedes any bare entry for the same internal path, whatever
//!   the declaration order, so the bare name is neither advertised nor
//!   resolvable;
//! - several aliases may target the same internal path;
//! - a bare nested include (`a.b`) also allows its parent (`a`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::filter::{CustomFilter, FilterStrategy};
use crate::path;
use crate::sort::{CustomSort, SortStrategy};
use crate::value::FilterValue;

// =============================================================================
// Declarations
// =============================================================================

/// One allow-list declaration as written by the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowEntry {
    /// External name equals internal path.
    Name(String),
    /// Internal path exposed under a different external name.
    Alias { internal: String, external: String },
}

impl AllowEntry {
    pub fn alias(internal: &str, external: &str) -> Self {
        AllowEntry::Alias {
            internal: internal.into(),
            external: external.into(),
        }
    }
}

impl From<&str> for AllowEntry {
    fn from(name: &str) -> Self {
        AllowEntry::Name(name.into())
    }
}

impl From<&str> for FilterSpec {
    fn from(name: &str) -> Self {
        FilterSpec::exact(name)
    }
}

impl From<&str> for SortSpec {
    fn from(name: &str) -> Self {
        SortSpec::field(name)
    }
}

impl From<&str> for IncludeSpec {
    fn from(name: &str) -> Self {
        IncludeSpec::relation(name)
    }
}

impl From<AllowEntry> for FilterSpec {
    fn from(entry: AllowEntry) -> Self {
        match entry {
            AllowEntry::Name(name) => FilterSpec::exact(&name),
            AllowEntry::Alias { internal, external } => FilterSpec::exact_as(&internal, &external),
        }
    }
}

impl From<AllowEntry> for SortSpec {
    fn from(entry: AllowEntry) -> Self {
        match entry {
            AllowEntry::Name(name) => SortSpec::field(&name),
            AllowEntry::Alias { internal, external } => SortSpec::field_as(&internal, &external),
        }
    }
}

impl From<AllowEntry> for IncludeSpec {
    fn from(entry: AllowEntry) -> Self {
        match entry {
            AllowEntry::Name(name) => IncludeSpec::relation(&name),
            AllowEntry::Alias { internal, external } => IncludeSpec::alias(&internal, &external),
        }
    }
}

/// The three kinds of request directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Filter,
    Sort,
    Include,
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectiveKind::Filter => write!(f, "filter"),
            DirectiveKind::Sort => write!(f, "sort"),
            DirectiveKind::Include => write!(f, "include"),
        }
    }
}

// =============================================================================
// Specs
// =============================================================================

/// Shared view over the three spec types, used by the registry.
trait Declared {
    fn external_name(&self) -> &str;
    fn internal_path(&self) -> &str;
    fn is_alias(&self) -> bool;
}

/// An allowed filter.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    pub external_name: String,
    /// Attribute path, possibly dotted through relations.
    pub internal_path: String,
    pub strategy: FilterStrategy,
    /// Applied when the request does not name this filter.
    pub default_value: Option<FilterValue>,
    aliased: bool,
}

impl FilterSpec {
    /// Exact-match filter exposed under its own name.
    pub fn exact(name: &str) -> Self {
        Self {
            external_name: name.into(),
            internal_path: name.into(),
            strategy: FilterStrategy::Exact,
            default_value: None,
            aliased: false,
        }
    }

    /// Exact-match filter on `internal`, exposed as `external`.
    pub fn exact_as(internal: &str, external: &str) -> Self {
        Self {
            external_name: external.into(),
            internal_path: internal.into(),
            strategy: FilterStrategy::Exact,
            default_value: None,
            aliased: true,
        }
    }

    /// Filter applied by an application-supplied strategy.
    pub fn custom(name: &str, filter: Arc<dyn CustomFilter>) -> Self {
        Self {
            external_name: name.into(),
            internal_path: name.into(),
            strategy: FilterStrategy::Custom(filter),
            default_value: None,
            aliased: false,
        }
    }

    /// Point the filter at a different internal path. The external name is kept.
    pub fn with_internal_path(mut self, internal: &str) -> Self {
        self.aliased = internal != self.external_name;
        self.internal_path = internal.into();
        self
    }

    pub fn with_default(mut self, value: impl Into<FilterValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

impl Declared for FilterSpec {
    fn external_name(&self) -> &str {
        &self.external_name
    }
    fn internal_path(&self) -> &str {
        &self.internal_path
    }
    fn is_alias(&self) -> bool {
        self.aliased
    }
}

/// An allowed sort.
#[derive(Debug, Clone)]
pub struct SortSpec {
    pub external_name: String,
    /// Column to order by; defaults to the external name.
    pub column_name: String,
    pub strategy: SortStrategy,
    aliased: bool,
}

impl SortSpec {
    /// Order by the column of the same name.
    pub fn field(name: &str) -> Self {
        Self {
            external_name: name.into(),
            column_name: name.into(),
            strategy: SortStrategy::Field,
            aliased: false,
        }
    }

    /// Order by `column`, exposed as `external`.
    pub fn field_as(column: &str, external: &str) -> Self {
        Self {
            external_name: external.into(),
            column_name: column.into(),
            strategy: SortStrategy::Field,
            aliased: true,
        }
    }

    /// Sort applied by an application-supplied strategy.
    pub fn custom(name: &str, sort: Arc<dyn CustomSort>) -> Self {
        Self {
            external_name: name.into(),
            column_name: name.into(),
            strategy: SortStrategy::Custom(sort),
            aliased: false,
        }
    }

    pub fn with_column(mut self, column: &str) -> Self {
        self.aliased = column != self.external_name;
        self.column_name = column.into();
        self
    }

    /// Compares external names only; the column is irrelevant.
    pub fn is_for_property(&self, property: &str) -> bool {
        self.external_name == property
    }
}

impl Declared for SortSpec {
    fn external_name(&self) -> &str {
        &self.external_name
    }
    fn internal_path(&self) -> &str {
        &self.column_name
    }
    fn is_alias(&self) -> bool {
        self.aliased
    }
}

/// An allowed include.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeSpec {
    pub external_name: String,
    /// Relation accessor path to eager-load, e.g. `relatedModels.nestedRelatedModels`.
    pub internal_relation_path: String,
    aliased: bool,
}

impl IncludeSpec {
    /// Include exposed under its own (possibly dotted) name.
    pub fn relation(name: &str) -> Self {
        Self {
            external_name: name.into(),
            internal_relation_path: path::accessor_path(name),
            aliased: false,
        }
    }

    /// Include of `internal`, exposed as `external`.
    pub fn alias(internal: &str, external: &str) -> Self {
        Self {
            external_name: external.into(),
            internal_relation_path: path::accessor_path(internal),
            aliased: true,
        }
    }

    /// Name the loaded relation is exposed under, when it differs from the accessor path.
    pub fn exposed_as(&self) -> Option<&str> {
        self.aliased.then_some(self.external_name.as_str())
    }
}

impl Declared for IncludeSpec {
    fn external_name(&self) -> &str {
        &self.external_name
    }
    fn internal_path(&self) -> &str {
        &self.internal_relation_path
    }
    fn is_alias(&self) -> bool {
        self.aliased
    }
}

/// External names compare case-insensitively, including non-ASCII letters.
pub fn names_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Debug, Clone)]
struct Registry<S> {
    specs: Vec<S>,
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self { specs: Vec::new() }
    }
}

impl<S: Declared> Registry<S> {
    fn register(&mut self, spec: S) {
        if spec.is_alias() {
            self.specs
                .retain(|s| s.is_alias() || s.internal_path() != spec.internal_path());
        } else if self
            .specs
            .iter()
            .any(|s| s.is_alias() && s.internal_path() == spec.internal_path())
        {
            debug!(
                name = spec.external_name(),
                "bare allow-list entry superseded by alias"
            );
            return;
        }

        match self
            .specs
            .iter_mut()
            .find(|s| names_match(s.external_name(), spec.external_name()))
        {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
    }

    fn get(&self, external_name: &str) -> Option<&S> {
        self.specs
            .iter()
            .find(|s| names_match(s.external_name(), external_name))
    }

    fn names(&self) -> Vec<String> {
        self.specs
            .iter()
            .map(|s| s.external_name().to_string())
            .collect()
    }
}

/// Declared filters, sorts and includes for one request.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    filters: Registry<FilterSpec>,
    sorts: Registry<SortSpec>,
    includes: Registry<IncludeSpec>,
}

impl AllowList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare allowed filters.
    pub fn filters<I>(mut self, specs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<FilterSpec>,
    {
        for spec in specs {
            self.register_filter(spec.into());
        }
        self
    }

    /// Declare allowed sorts.
    pub fn sorts<I>(mut self, specs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SortSpec>,
    {
        for spec in specs {
            self.register_sort(spec.into());
        }
        self
    }

    /// Declare allowed includes.
    pub fn includes<I>(mut self, specs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<IncludeSpec>,
    {
        for spec in specs {
            self.register_include(spec.into());
        }
        self
    }

    pub fn register_filter(&mut self, spec: FilterSpec) {
        self.filters.register(spec);
    }

    pub fn register_sort(&mut self, spec: SortSpec) {
        self.sorts.register(spec);
    }

    /// Register an include. Bare nested includes also register their parents.
    pub fn register_include(&mut self, spec: IncludeSpec) {
        if spec.is_alias() {
            self.includes.register(spec);
            return;
        }
        for prefix in path::prefixes(&spec.external_name) {
            self.includes.register(IncludeSpec::relation(&prefix));
        }
    }

    pub fn resolve_filter(&self, external_name: &str) -> Option<&FilterSpec> {
        self.filters.get(external_name)
    }

    pub fn resolve_sort(&self, external_name: &str) -> Option<&SortSpec> {
        self.sorts.get(external_name)
    }

    pub fn resolve_include(&self, external_name: &str) -> Option<&IncludeSpec> {
        self.includes.get(external_name)
    }

    /// Whether some declared include, aliased or not, loads `internal_relation_path`.
    pub fn covers_include_path(&self, internal_relation_path: &str) -> bool {
        self.includes
            .specs
            .iter()
            .any(|s| s.internal_relation_path == internal_relation_path)
    }

    /// All filters, in declaration order.
    pub fn filter_specs(&self) -> impl Iterator<Item = &FilterSpec> {
        self.filters.specs.iter()
    }

    /// Advertised external names of one kind, in declaration order.
    pub fn allowed_external_names(&self, kind: DirectiveKind) -> Vec<String> {
        match kind {
            DirectiveKind::Filter => self.filters.names(),
            DirectiveKind::Sort => self.sorts.names(),
            DirectiveKind::Include => self.includes.names(),
        }
    }

    pub fn allowed_filters(&self) -> Vec<String> {
        self.allowed_external_names(DirectiveKind::Filter)
    }

    pub fn allowed_sorts(&self) -> Vec<String> {
        self.allowed_external_names(DirectiveKind::Sort)
    }

    pub fn allowed_includes(&self) -> Vec<String> {
        self.allowed_external_names(DirectiveKind::Include)
    }
}
