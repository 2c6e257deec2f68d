//! Raw request values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ParameterNames;
use crate::include;
use crate::sort::SortDirective;
use crate::value::FilterValue;

/// Filter, sort and include values as supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestParams {
    /// External filter name -> requested value.
    pub filters: BTreeMap<String, FilterValue>,
    /// Comma-separated sort list, `-` prefix for descending.
    pub sort: Option<String>,
    /// Comma-separated include list.
    pub include: Option<String>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, name: &str, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    pub fn sort(mut self, sort: &str) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn include(mut self, include: &str) -> Self {
        self.include = Some(include.into());
        self
    }

    /// Build from decoded query-string pairs such as `filter[name]=John`,
    /// `sort=-name` and `include=posts`. Unrelated keys are ignored; a
    /// repeated key keeps its last value.
    pub fn from_query_pairs<'p, I>(pairs: I, names: &ParameterNames) -> Self
    where
        I: IntoIterator<Item = (&'p str, &'p str)>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            if key == names.sort {
                params.sort = Some(value.to_string());
            } else if key == names.include {
                params.include = Some(value.to_string());
            } else if let Some(filter) = filter_key(key, &names.filter) {
                params
                    .filters
                    .insert(filter.to_string(), FilterValue::from_raw(value));
            }
        }
        params
    }

    /// Build from a raw, percent-encoded query string such as
    /// `filter%5Bname%5D=a%20b&sort=-name`. A leading `?` is ignored and `+`
    /// decodes to a space.
    pub fn from_query_string(query: &str, names: &ParameterNames) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: Vec<_> = url::form_urlencoded::parse(query.as_bytes()).collect();
        Self::from_query_pairs(
            pairs.iter().map(|(key, value)| (key.as_ref(), value.as_ref())),
            names,
        )
    }

    /// Requested sorts, in request order.
    pub fn sorts(&self) -> Vec<SortDirective> {
        self.sort
            .as_deref()
            .map(SortDirective::parse_list)
            .unwrap_or_default()
    }

    /// Requested include names, in request order.
    pub fn includes(&self) -> Vec<String> {
        self.include
            .as_deref()
            .map(include::parse_list)
            .unwrap_or_default()
    }
}

/// `filter[name]` -> `name`.
fn filter_key<'k>(key: &'k str, parameter: &str) -> Option<&'k str> {
    key.strip_prefix(parameter)?
        .strip_prefix('[')?
        .strip_suffix(']')
        .filter(|name| !name.is_empty())
}
