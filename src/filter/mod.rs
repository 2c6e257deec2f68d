//! Filter resolution.
//!
//! A requested filter name is looked up in the allow-list and its value is
//! handed to the filter's strategy: the built-in exact matcher, or a custom
//! strategy supplied by the application.

pub mod exact;
mod scope;

pub use scope::RelationScope;

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::allow_list::{AllowList, FilterSpec};
use crate::error::{ResolveError, ResolveResult};
use crate::sink::QueryDirectiveSink;
use crate::value::FilterValue;

/// Application-supplied filtering logic.
///
/// Invoked with the sink for the base record, the requested value and the
/// filter's internal path.
pub trait CustomFilter: fmt::Debug + Send + Sync {
    fn apply(
        &self,
        sink: &mut dyn QueryDirectiveSink,
        value: &FilterValue,
        property: &str,
    ) -> ResolveResult<()>;
}

/// How a filter constrains the query. Fixed when the spec is declared.
#[derive(Debug, Clone)]
pub enum FilterStrategy {
    /// Equality for scalars, membership for sequences, relation-aware.
    Exact,
    Custom(Arc<dyn CustomFilter>),
}

/// Applies allowed filters to a sink.
#[derive(Debug, Clone, Copy)]
pub struct FilterResolver<'a> {
    allow_list: &'a AllowList,
}

impl<'a> FilterResolver<'a> {
    pub fn new(allow_list: &'a AllowList) -> Self {
        Self { allow_list }
    }

    /// Look up a filter by external name.
    pub fn resolve(&self, external_name: &str) -> ResolveResult<&'a FilterSpec> {
        self.allow_list
            .resolve_filter(external_name)
            .ok_or_else(|| ResolveError::UnknownFilter {
                unknown: vec![external_name.to_string()],
                allowed: self.allow_list.allowed_filters(),
            })
    }

    /// Apply the filter named `external_name` with `value`.
    pub fn apply(
        &self,
        sink: &mut dyn QueryDirectiveSink,
        scope: &RelationScope,
        external_name: &str,
        value: &FilterValue,
    ) -> ResolveResult<()> {
        let spec = self.resolve(external_name)?;
        apply_spec(sink, scope, spec, value)
    }
}

/// Apply an already-resolved filter spec.
pub fn apply_spec(
    sink: &mut dyn QueryDirectiveSink,
    scope: &RelationScope,
    spec: &FilterSpec,
    value: &FilterValue,
) -> ResolveResult<()> {
    debug!(
        filter = %spec.external_name,
        path = %spec.internal_path,
        "applying filter"
    );
    match &spec.strategy {
        FilterStrategy::Exact => exact::apply(sink, scope, value, &spec.internal_path),
        FilterStrategy::Custom(filter) => filter.apply(sink, value, &spec.internal_path),
    }
}
