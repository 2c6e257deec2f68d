//! Built-in exact-match filtering.
//!
//! Scalars become equality constraints, sequences become membership
//! constraints. A dotted path that names a relation attribute opens one
//! existence scope per relation level and constrains the leaf inside the
//! innermost scope, qualified with the related table.

use tracing::debug;

use super::scope::RelationScope;
use crate::error::ResolveResult;
use crate::path;
use crate::sink::QueryDirectiveSink;
use crate::value::FilterValue;

/// Constrain `property` to `value` on the record behind `sink`.
pub fn apply(
    sink: &mut dyn QueryDirectiveSink,
    scope: &RelationScope,
    value: &FilterValue,
    property: &str,
) -> ResolveResult<()> {
    if is_relation_property(sink, scope, property) {
        return with_relation_constraint(sink, scope, value, property);
    }

    match value {
        FilterValue::List(values) => sink.add_membership_constraint(property, values),
        FilterValue::Scalar(value) => sink.add_equality_constraint(property, value),
    }
    Ok(())
}

/// A dotted path is a relation traversal unless this filter rewrote it
/// itself or it is already qualified with the current table.
pub fn is_relation_property(
    sink: &dyn QueryDirectiveSink,
    scope: &RelationScope,
    property: &str,
) -> bool {
    property.contains(path::SEPARATOR)
        && !scope.contains(property)
        && !is_qualified_with(property, sink.table())
}

fn is_qualified_with(property: &str, table: &str) -> bool {
    property
        .strip_prefix(table)
        .is_some_and(|rest| rest.starts_with(path::SEPARATOR))
}

fn with_relation_constraint(
    sink: &mut dyn QueryDirectiveSink,
    scope: &RelationScope,
    value: &FilterValue,
    property: &str,
) -> ResolveResult<()> {
    let resolved = path::resolve(property);
    let relation = resolved.relations[0].clone();
    let remainder = resolved.remainder();
    let nested = resolved.relations.len() > 1;

    debug!(
        table = sink.table(),
        relation = %relation,
        remainder = %remainder,
        "opening relation constraint"
    );

    sink.add_relation_existence_constraint(&relation, &mut |related| {
        if nested {
            return apply(related, scope, value, &remainder);
        }
        let qualified = format!("{}.{}", related.table(), remainder);
        let scope = scope.with(&qualified);
        apply(related, &scope, value, &qualified)
    })
}
