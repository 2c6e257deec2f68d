//! Error types for request resolution.
//!
//! The resolution core only ever rejects names that are missing from the
//! allow-list. Each rejection carries every offending name of its kind
//! together with the full set of allowed names, so callers can report the
//! whole problem at once.

/// Result type for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Errors raised while resolving request directives.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error(
        "Requested filter(s) `{}` are not allowed. Allowed filter(s) are `{}`.",
        .unknown.join(", "),
        .allowed.join(", ")
    )]
    UnknownFilter {
        unknown: Vec<String>,
        allowed: Vec<String>,
    },

    #[error(
        "Requested sort(s) `{}` are not allowed. Allowed sort(s) are `{}`.",
        .unknown.join(", "),
        .allowed.join(", ")
    )]
    UnknownSort {
        unknown: Vec<String>,
        allowed: Vec<String>,
    },

    #[error(
        "Requested include(s) `{}` are not allowed. Allowed include(s) are `{}`.",
        .unknown.join(", "),
        .allowed.join(", ")
    )]
    UnknownInclude {
        unknown: Vec<String>,
        allowed: Vec<String>,
    },

    /// Raised by a sink implementation, never by the resolvers themselves.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl ResolveError {
    /// The rejected names carried by this error.
    pub fn unknown(&self) -> &[String] {
        match self {
            ResolveError::UnknownFilter { unknown, .. }
            | ResolveError::UnknownSort { unknown, .. }
            | ResolveError::UnknownInclude { unknown, .. } => unknown,
            ResolveError::Sink(_) => &[],
        }
    }

    /// The allowed names advertised alongside the rejection.
    pub fn allowed(&self) -> &[String] {
        match self {
            ResolveError::UnknownFilter { allowed, .. }
            | ResolveError::UnknownSort { allowed, .. }
            | ResolveError::UnknownInclude { allowed, .. } => allowed,
            ResolveError::Sink(_) => &[],
        }
    }
}

/// Errors raised by a [`QueryDirectiveSink`](crate::sink::QueryDirectiveSink).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SinkError {
    #[error("Unknown relation '{relation}' on table '{table}'")]
    UnknownRelation { table: String, relation: String },

    #[error("Unknown table '{0}'")]
    UnknownTable(String),
}
