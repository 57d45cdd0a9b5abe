//! Typed filter expressions
//!
//! A [`FilterExpression`] renders to one fragment of the remote `$filter`
//! grammar, optionally negated and optionally prefixed with a logical
//! connective so fragments can be concatenated.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical connective placed in front of a fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Composition {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "and ")]
    And,
    #[serde(rename = "or ")]
    Or,
}

impl Composition {
    /// Text placed in front of the fragment, trailing space included.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::And => "and ",
            Self::Or => "or ",
        }
    }
}

/// Fields the remote service accepts in filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    DisplayName,
    OwnerId,
    ProductId,
    Scope,
    StateComment,
    UserId,
}

impl Field {
    /// Name of the field in the remote grammar.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::DisplayName => "displayName",
            Self::OwnerId => "ownerId",
            Self::ProductId => "productId",
            Self::Scope => "scope",
            Self::StateComment => "stateComment",
            Self::UserId => "userId",
        }
    }
}

/// Infix comparison operators: `<field> <op> '<value>'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Operator {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
        }
    }
}

/// String functions: `<fn>(<field>, '<value>')`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Function {
    Contains,
    EndsWith,
    StartsWith,
    SubstringOf,
}

impl Function {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::EndsWith => "endswith",
            Self::StartsWith => "startswith",
            Self::SubstringOf => "substringof",
        }
    }
}

/// Either form a fragment can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Predicate {
    Operator(Operator),
    Function(Function),
}

impl From<Operator> for Predicate {
    fn from(op: Operator) -> Self {
        Self::Operator(op)
    }
}

impl From<Function> for Predicate {
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

/// A single filter fragment.
///
/// `value` is inserted verbatim between single quotes. Callers must make
/// sure it contains nothing that breaks the remote query grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterExpression {
    pub composition: Composition,
    pub field: Field,
    pub predicate: Predicate,
    pub inverse: bool,
    pub value: String,
}

impl FilterExpression {
    /// Un-negated fragment with no leading connective.
    #[must_use]
    pub fn new(field: Field, predicate: impl Into<Predicate>, value: impl Into<String>) -> Self {
        Self {
            composition: Composition::None,
            field,
            predicate: predicate.into(),
            inverse: false,
            value: value.into(),
        }
    }

    /// Prefix the fragment with `and `.
    #[must_use]
    pub fn and(mut self) -> Self {
        self.composition = Composition::And;
        self
    }

    /// Prefix the fragment with `or `.
    #[must_use]
    pub fn or(mut self) -> Self {
        self.composition = Composition::Or;
        self
    }

    /// Toggle negation: `not(<fragment>)`.
    #[must_use]
    pub fn not(mut self) -> Self {
        self.inverse = !self.inverse;
        self
    }

    /// Render the fragment.
    #[must_use]
    pub fn build(&self) -> String {
        let field = self.field.as_str();
        let clause = match self.predicate {
            Predicate::Operator(op) => format!("{field} {} '{}'", op.as_str(), self.value),
            Predicate::Function(function) => {
                format!("{}({field}, '{}')", function.as_str(), self.value)
            }
        };

        let mut out = String::from(self.composition.prefix());
        if self.inverse {
            out.push_str("not(");
        }
        out.push_str(&clause);
        if self.inverse {
            out.push(')');
        }
        out
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}
