//! # Sifter
//!
//! Allow-list driven resolution of request filters, sorts and includes into
//! relational query directives.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        RequestParams (filter[..], sort, include)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [QueryResolver]
//! ┌─────────────────────────────────────────────────────────┐
//! │   AllowList  ──▶  IncludeResolver / FilterResolver /     │
//! │                   SortResolver  (+ path)                 │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [QueryDirectiveSink]
//! ┌─────────────────────────────────────────────────────────┐
//! │   RecordingSink (directive tree) │ SqlSink (SELECT ...)  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Every directive handed to a sink corresponds to a declared allow-list
//! entry. Unknown names fail resolution before anything is emitted.

pub mod allow_list;
pub mod config;
pub mod error;
pub mod filter;
pub mod include;
pub mod path;
pub mod request;
pub mod resolver;
pub mod sink;
pub mod sort;
pub mod sql;
pub mod value;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::allow_list::{AllowEntry, AllowList, FilterSpec, IncludeSpec, SortSpec};
    pub use crate::error::{ResolveError, ResolveResult, SinkError};
    pub use crate::filter::{CustomFilter, FilterResolver, RelationScope};
    pub use crate::include::IncludeResolver;
    pub use crate::request::RequestParams;
    pub use crate::resolver::QueryResolver;
    pub use crate::sink::{Directive, QueryDirectiveSink, RecordingSink};
    pub use crate::sort::{CustomSort, SortDirective, SortResolver};
    pub use crate::sql::{Dialect, Schema, SqlSink};
    pub use crate::value::{FilterValue, Value};
}

pub use allow_list::AllowList;
pub use error::{ResolveError, ResolveResult};
pub use request::RequestParams;
pub use resolver::QueryResolver;
pub use sink::QueryDirectiveSink;
