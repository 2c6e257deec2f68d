//! Include resolution.
//!
//! Requested includes are validated as a whole: every unknown name in one
//! request is reported together. A nested include is allowed only when each
//! of its dotted prefixes is allowed as well, either by name or through an
//! alias of the same relation.

use tracing::debug;

use crate::allow_list::{AllowList, IncludeSpec};
use crate::error::{ResolveError, ResolveResult};
use crate::path;
use crate::sink::QueryDirectiveSink;

/// Split a comma-separated include parameter, skipping empty entries.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Applies allowed includes to a sink.
#[derive(Debug, Clone, Copy)]
pub struct IncludeResolver<'a> {
    allow_list: &'a AllowList,
}

impl<'a> IncludeResolver<'a> {
    pub fn new(allow_list: &'a AllowList) -> Self {
        Self { allow_list }
    }

    /// Resolve every requested name, collecting all unknown ones.
    pub fn validate<S: AsRef<str>>(&self, names: &[S]) -> ResolveResult<Vec<&'a IncludeSpec>> {
        let mut specs = Vec::new();
        let mut unknown: Vec<String> = Vec::new();

        for name in names {
            let name = name.as_ref();
            match self.resolve(name) {
                Some(spec) => specs.push(spec),
                None if !unknown.iter().any(|u| u == name) => unknown.push(name.to_string()),
                None => {}
            }
        }

        if !unknown.is_empty() {
            debug!(?unknown, "rejecting includes");
            return Err(ResolveError::UnknownInclude {
                unknown,
                allowed: self.allow_list.allowed_includes(),
            });
        }
        Ok(specs)
    }

    /// Emit one eager-load directive per distinct requested include.
    pub fn apply<S: AsRef<str>>(
        &self,
        sink: &mut dyn QueryDirectiveSink,
        names: &[S],
    ) -> ResolveResult<()> {
        let specs = self.validate(names)?;
        let mut emitted: Vec<(&str, Option<&str>)> = Vec::new();

        for spec in specs {
            let key = (spec.internal_relation_path.as_str(), spec.exposed_as());
            if emitted.contains(&key) {
                continue;
            }
            debug!(
                include = %spec.external_name,
                relation = %spec.internal_relation_path,
                "applying include"
            );
            sink.add_eager_load(key.0, key.1);
            emitted.push(key);
        }
        Ok(())
    }

    /// The spec for `name`, provided every dotted prefix is allowed too.
    fn resolve(&self, name: &str) -> Option<&'a IncludeSpec> {
        let prefixes = path::prefixes(name);
        let (full, parents) = prefixes.split_last()?;
        if !parents.iter().all(|parent| self.parent_allowed(parent)) {
            return None;
        }
        self.allow_list.resolve_include(full)
    }

    /// A parent superseded by an alias still counts as allowed.
    fn parent_allowed(&self, parent: &str) -> bool {
        self.allow_list.resolve_include(parent).is_some()
            || self
                .allow_list
                .covers_include_path(&path::accessor_path(parent))
    }
}
