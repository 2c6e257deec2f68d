//! Sort resolution.
//!
//! The sort parameter is a comma-separated list of external names, each
//! optionally prefixed with `-` for descending order.

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::allow_list::{AllowList, SortSpec};
use crate::error::{ResolveError, ResolveResult};
use crate::sink::QueryDirectiveSink;

/// Application-supplied ordering logic, invoked as `(sink, descending, column)`.
pub trait CustomSort: fmt::Debug + Send + Sync {
    fn apply(
        &self,
        sink: &mut dyn QueryDirectiveSink,
        descending: bool,
        column: &str,
    ) -> ResolveResult<()>;
}

/// How a sort orders the query. Fixed when the spec is declared.
#[derive(Debug, Clone)]
pub enum SortStrategy {
    /// Order by the sort's column.
    Field,
    Custom(Arc<dyn CustomSort>),
}

/// One requested sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDirective {
    pub name: String,
    pub descending: bool,
}

impl SortDirective {
    /// Parse one entry: `name` or `-name`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.strip_prefix('-') {
            Some(name) => Self {
                name: name.to_string(),
                descending: true,
            },
            None => Self {
                name: raw.to_string(),
                descending: false,
            },
        }
    }

    /// Parse a comma-separated sort parameter, skipping empty entries.
    pub fn parse_list(raw: &str) -> Vec<Self> {
        raw.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Self::parse)
            .collect()
    }
}

/// Applies allowed sorts to a sink.
#[derive(Debug, Clone, Copy)]
pub struct SortResolver<'a> {
    allow_list: &'a AllowList,
}

impl<'a> SortResolver<'a> {
    pub fn new(allow_list: &'a AllowList) -> Self {
        Self { allow_list }
    }

    pub fn resolve(&self, external_name: &str) -> ResolveResult<&'a SortSpec> {
        self.allow_list
            .resolve_sort(external_name)
            .ok_or_else(|| ResolveError::UnknownSort {
                unknown: vec![external_name.to_string()],
                allowed: self.allow_list.allowed_sorts(),
            })
    }

    /// Apply the sort named `external_name`.
    pub fn apply(
        &self,
        sink: &mut dyn QueryDirectiveSink,
        external_name: &str,
        descending: bool,
    ) -> ResolveResult<()> {
        let spec = self.resolve(external_name)?;
        apply_spec(sink, spec, descending)
    }
}

/// Apply an already-resolved sort spec.
pub fn apply_spec(
    sink: &mut dyn QueryDirectiveSink,
    spec: &SortSpec,
    descending: bool,
) -> ResolveResult<()> {
    debug!(
        sort = %spec.external_name,
        column = %spec.column_name,
        descending,
        "applying sort"
    );
    match &spec.strategy {
        SortStrategy::Field => {
            sink.add_order(&spec.column_name, descending);
            Ok(())
        }
        SortStrategy::Custom(sort) => sort.apply(sink, descending, &spec.column_name),
    }
}
