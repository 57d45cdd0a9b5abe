//! Filter-expression builder for `$filter` queries

pub mod builder;
pub mod expression;

pub use builder::{build_filter, exclude_prefix_filter, ids_filter, join_filters};
pub use expression::{Composition, Field, FilterExpression, Function, Operator, Predicate};
