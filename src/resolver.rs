//! Top-level request resolution.
//!
//! Validates every requested name up front, then runs the include, filter
//! and sort resolvers against one sink. Nothing is emitted when any name is
//! rejected.

use tracing::debug;

use crate::allow_list::{names_match, AllowList, FilterSpec, SortSpec};
use crate::error::{ResolveError, ResolveResult};
use crate::filter::{self, RelationScope};
use crate::include::IncludeResolver;
use crate::request::RequestParams;
use crate::sink::QueryDirectiveSink;
use crate::sort::{self, SortDirective};
use crate::value::FilterValue;

/// Resolves one request against one allow-list.
#[derive(Debug, Clone)]
pub struct QueryResolver<'a> {
    allow_list: &'a AllowList,
    default_sort: Option<String>,
}

impl<'a> QueryResolver<'a> {
    pub fn new(allow_list: &'a AllowList) -> Self {
        Self {
            allow_list,
            default_sort: None,
        }
    }

    /// Sort applied when the request carries none, e.g. `-created_at`.
    pub fn with_default_sort(mut self, sort: &str) -> Self {
        self.default_sort = Some(sort.into());
        self
    }

    /// Emit the directives for `request` into `sink`.
    pub fn resolve(
        &self,
        request: &RequestParams,
        sink: &mut dyn QueryDirectiveSink,
    ) -> ResolveResult<()> {
        let includes = request.includes();
        let include_resolver = IncludeResolver::new(self.allow_list);
        include_resolver.validate(&includes)?;
        let filters = self.filters(request)?;
        let sorts = self.sorts(request)?;

        include_resolver.apply(sink, &includes)?;

        for (spec, value) in filters {
            filter::apply_spec(sink, &RelationScope::new(), spec, value)?;
        }

        for (spec, descending) in sorts {
            sort::apply_spec(sink, spec, descending)?;
        }

        Ok(())
    }

    /// Requested filters plus defaults for the ones not requested.
    fn filters<'r>(
        &self,
        request: &'r RequestParams,
    ) -> ResolveResult<Vec<(&'a FilterSpec, &'r FilterValue)>>
    where
        'a: 'r,
    {
        let mut resolved: Vec<(&'a FilterSpec, &'r FilterValue)> = Vec::new();
        let mut unknown = Vec::new();

        // Keys differing only in case name the same filter; the first one wins.
        for (name, value) in &request.filters {
            match self.allow_list.resolve_filter(name) {
                Some(spec)
                    if resolved
                        .iter()
                        .any(|(seen, _)| seen.external_name == spec.external_name) =>
                {
                    debug!(filter = %name, "ignoring repeated filter");
                }
                Some(spec) => resolved.push((spec, value)),
                None => unknown.push(name.clone()),
            }
        }

        if !unknown.is_empty() {
            debug!(?unknown, "rejecting filters");
            return Err(ResolveError::UnknownFilter {
                unknown,
                allowed: self.allow_list.allowed_filters(),
            });
        }

        for spec in self.allow_list.filter_specs() {
            let Some(default) = &spec.default_value else {
                continue;
            };
            let requested = request
                .filters
                .keys()
                .any(|name| names_match(name, &spec.external_name));
            if !requested {
                resolved.push((spec, default));
            }
        }

        Ok(resolved)
    }

    /// Requested sorts, or the default sort; one entry per external name.
    fn sorts(&self, request: &RequestParams) -> ResolveResult<Vec<(&'a SortSpec, bool)>> {
        let directives = match (request.sorts(), &self.default_sort) {
            (requested, Some(default)) if requested.is_empty() => {
                SortDirective::parse_list(default)
            }
            (requested, _) => requested,
        };

        let mut resolved: Vec<(&'a SortSpec, bool)> = Vec::new();
        let mut unknown = Vec::new();

        for directive in directives {
            match self.allow_list.resolve_sort(&directive.name) {
                Some(spec) => {
                    if !resolved
                        .iter()
                        .any(|(seen, _)| seen.is_for_property(&spec.external_name))
                    {
                        resolved.push((spec, directive.descending));
                    }
                }
                None if !unknown.contains(&directive.name) => unknown.push(directive.name),
                None => {}
            }
        }

        if !unknown.is_empty() {
            debug!(?unknown, "rejecting sorts");
            return Err(ResolveError::UnknownSort {
                unknown,
                allowed: self.allow_list.allowed_sorts(),
            });
        }

        Ok(resolved)
    }
}
