//! A directive sink that renders a SQL `SELECT`.
//!
//! Constraints become WHERE predicates, relation existence becomes a
//! correlated `EXISTS` subquery and orders become ORDER BY entries.
//! Eager loads have no SQL form; they are collected for the caller.

use serde::Serialize;
use tracing::{debug, trace};

use super::dialect::Dialect;
use super::expr::{col, table_col, Expr, ExprExt};
use super::query::{OrderByExpr, Query, TableRef};
use super::schema::Schema;
use crate::error::{ResolveResult, SinkError};
use crate::sink::{QueryDirectiveSink, ScopeBuilder};
use crate::value::Value;

/// An eager-load request collected by [`SqlSink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EagerLoad {
    pub relation: String,
    pub alias: Option<String>,
}

/// Builds a query against one table of a [`Schema`].
#[derive(Debug, Clone)]
pub struct SqlSink<'s> {
    schema: &'s Schema,
    table: String,
    conditions: Vec<Expr>,
    order_by: Vec<OrderByExpr>,
    eager_loads: Vec<EagerLoad>,
}

impl<'s> SqlSink<'s> {
    /// Sink for `table`, which must be declared in `schema`.
    pub fn new(schema: &'s Schema, table: &str) -> Result<Self, SinkError> {
        if schema.table(table).is_none() {
            return Err(SinkError::UnknownTable(table.into()));
        }
        Ok(Self::scoped(schema, table))
    }

    fn scoped(schema: &'s Schema, table: &str) -> Self {
        Self {
            schema,
            table: table.into(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            eager_loads: Vec::new(),
        }
    }

    pub fn query(&self) -> Query {
        self.conditions
            .iter()
            .cloned()
            .fold(Query::new().from(TableRef::new(&self.table)), Query::filter)
            .order_by(self.order_by.clone())
    }

    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.query().to_sql(dialect)
    }

    pub fn eager_loads(&self) -> &[EagerLoad] {
        &self.eager_loads
    }
}

impl QueryDirectiveSink for SqlSink<'_> {
    fn table(&self) -> &str {
        &self.table
    }

    fn add_equality_constraint(&mut self, path: &str, value: &Value) {
        trace!(table = %self.table, path, %value, "equality");
        let condition = match value {
            Value::Null => col(path).is_null(),
            value => col(path).eq(value),
        };
        self.conditions.push(condition);
    }

    fn add_membership_constraint(&mut self, path: &str, values: &[Value]) {
        trace!(table = %self.table, path, count = values.len(), "membership");
        let list = values.iter().map(Expr::from).collect();
        self.conditions.push(col(path).in_list(list));
    }

    fn add_relation_existence_constraint(
        &mut self,
        relation: &str,
        inner: &mut ScopeBuilder<'_>,
    ) -> ResolveResult<()> {
        let schema = self.schema;
        let target = schema
            .relation(&self.table, relation)
            .ok_or_else(|| SinkError::UnknownRelation {
                table: self.table.clone(),
                relation: relation.into(),
            })?;
        debug!(table = %self.table, relation, related = %target.table, "exists subquery");

        let mut scoped = SqlSink::scoped(schema, &target.table);
        inner(&mut scoped)?;

        let subquery = scoped.conditions.into_iter().fold(
            Query::new()
                .from(TableRef::new(&target.table))
                .filter(
                    table_col(&target.table, &target.foreign_key)
                        .eq(table_col(&self.table, &target.local_key)),
                ),
            Query::filter,
        );
        self.conditions.push(Expr::Exists(Box::new(subquery)));
        Ok(())
    }

    fn add_order(&mut self, column: &str, descending: bool) {
        self.order_by.push(if descending {
            OrderByExpr::desc(col(column))
        } else {
            OrderByExpr::asc(col(column))
        });
    }

    fn add_eager_load(&mut self, relation: &str, alias: Option<&str>) {
        self.eager_loads.push(EagerLoad {
            relation: relation.into(),
            alias: alias.map(Into::into),
        });
    }
}
