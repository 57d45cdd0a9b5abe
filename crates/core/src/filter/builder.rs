//! Composition helpers over [`FilterExpression`]

use serde::Deserialize;
use serde_json::Value;

use super::expression::{Field, FilterExpression, Function, Operator};

/// Validate an untyped description and render it.
///
/// Anything that does not match the expression schema (unknown field,
/// predicate or composition, wrong types, missing keys) yields `None`.
pub fn build_filter(description: &Value) -> Option<String> {
    FilterExpression::deserialize(description).ok().map(|expr| expr.build())
}

/// Render each expression and join them with a single space, in order.
pub fn join_filters<'a, I>(expressions: I) -> String
where
    I: IntoIterator<Item = &'a FilterExpression>,
{
    expressions.into_iter().map(FilterExpression::build).collect::<Vec<_>>().join(" ")
}

/// `not(startswith(<field>, '<prefix>'))`
pub fn exclude_prefix_filter(field: Field, prefix: &str) -> String {
    FilterExpression::new(field, Function::StartsWith, prefix).not().build()
}

/// `<field> eq 'a' or <field> eq 'b' ...`
///
/// Returns `None` for an empty id list: an empty filter would match
/// everything instead of nothing.
pub fn ids_filter<S: AsRef<str>>(field: Field, ids: &[S]) -> Option<String> {
    if ids.is_empty() {
        return None;
    }

    let expressions: Vec<FilterExpression> = ids
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let expr = FilterExpression::new(field, Operator::Eq, id.as_ref());
            if index == 0 {
                expr
            } else {
                expr.or()
            }
        })
        .collect();

    Some(join_filters(&expressions))
}
