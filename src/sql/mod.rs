//! SQL rendering of resolved directives.
//!
//! - [`sink`] - [`SqlSink`], the directive sink that builds a query
//! - [`schema`] - tables and relation key pairs
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod query;
pub mod schema;
pub mod sink;
pub mod token;

#[cfg(test)]
pub mod test_utils;

pub use dialect::{Dialect, SqlDialect};
pub use expr::{col, lit_bool, lit_int, lit_str, table_col, BinaryOperator, Expr, ExprExt, Literal};
pub use query::{OrderByExpr, Query, SortDir, TableRef};
pub use schema::{Relation, Schema, TableSchema};
pub use sink::{EagerLoad, SqlSink};
pub use token::{Token, TokenStream};
