//! Filter trees for WHERE, HAVING and JOIN ON clauses.

use crate::error::{CompileError, Result};
use crate::value::SqlValue;

use super::expression::Expr;

/// Comparison operators a predicate leaf may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `LIKE`
    Like,
    /// `IN (...)`
    In,
    /// `BETWEEN ? AND ?`
    Between,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
}

impl Operator {
    /// Returns the SQL keyword or symbol.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Like => "LIKE",
            Self::In => "IN",
            Self::Between => "BETWEEN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }

    /// Returns true for operators that take exactly one right-hand operand,
    /// which may be a bound value or another expression.
    #[must_use]
    pub const fn is_binary(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Gt | Self::Ge | Self::Lt | Self::Le | Self::Like
        )
    }

    fn check_arity(self, actual: usize) -> Result<()> {
        let (ok, expected) = match self {
            Self::IsNull | Self::IsNotNull => (actual == 0, "exactly 0"),
            Self::Between => (actual == 2, "exactly 2"),
            Self::In => (actual >= 1, "at least 1"),
            _ => (actual == 1, "exactly 1"),
        };
        if ok {
            Ok(())
        } else {
            Err(CompileError::MalformedPredicateArity {
                operator: self.as_sql(),
                expected: String::from(expected),
                actual,
            })
        }
    }
}

/// Logical connector of a composite predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Connector {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl Connector {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Right-hand side of a predicate leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// Values bound to `?` placeholders, in order.
    Values(Vec<SqlValue>),
    /// Another expression, rendered inline without parameters.
    Expr(Expr),
}

/// A single comparison. Fields are private so that every leaf has passed
/// the arity check of its operator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "LeafRepr", into = "LeafRepr")
)]
pub struct Leaf {
    expr: Expr,
    operator: Operator,
    bound: Bound,
}

impl Leaf {
    pub(crate) const fn new_unchecked(expr: Expr, operator: Operator, bound: Bound) -> Self {
        Self {
            expr,
            operator,
            bound,
        }
    }

    /// Left-hand expression.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Operator.
    #[must_use]
    pub const fn operator(&self) -> Operator {
        self.operator
    }

    /// Right-hand side.
    #[must_use]
    pub const fn bound(&self) -> &Bound {
        &self.bound
    }
}

/// A boolean filter tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Predicate {
    /// A single comparison.
    Leaf(Leaf),
    /// Two subtrees joined by AND or OR.
    Composite {
        /// Left subtree.
        left: Box<Predicate>,
        /// Connector.
        connector: Connector,
        /// Right subtree.
        right: Box<Predicate>,
    },
}

impl Predicate {
    /// Builds a leaf comparing `expr` against bound values.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::MalformedPredicateArity`] when the number of
    /// values does not fit the operator.
    pub fn leaf(expr: impl Into<Expr>, operator: Operator, values: Vec<SqlValue>) -> Result<Self> {
        operator.check_arity(values.len())?;
        Ok(Self::Leaf(Leaf::new_unchecked(
            expr.into(),
            operator,
            Bound::Values(values),
        )))
    }

    /// Builds a leaf comparing two expressions, e.g. a JOIN ON condition.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::MalformedPredicateArity`] when the operator
    /// does not take a single operand.
    pub fn compare(
        left: impl Into<Expr>,
        operator: Operator,
        right: impl Into<Expr>,
    ) -> Result<Self> {
        if !operator.is_binary() {
            return Err(CompileError::MalformedPredicateArity {
                operator: operator.as_sql(),
                expected: String::from("bound values"),
                actual: 0,
            });
        }
        Ok(Self::Leaf(Leaf::new_unchecked(
            left.into(),
            operator,
            Bound::Expr(right.into()),
        )))
    }

    /// Joins two predicates with AND.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        self.connect(Connector::And, other)
    }

    /// Joins two predicates with OR.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        self.connect(Connector::Or, other)
    }

    /// Joins two predicates with the given connector.
    #[must_use]
    pub fn connect(self, connector: Connector, other: Self) -> Self {
        Self::Composite {
            left: Box::new(self),
            connector,
            right: Box::new(other),
        }
    }

    /// Returns the connector for composites, `None` for leaves.
    #[must_use]
    pub const fn connector(&self) -> Option<Connector> {
        match self {
            Self::Leaf(_) => None,
            Self::Composite { connector, .. } => Some(*connector),
        }
    }
}

#[cfg(feature = "serde")]
#[derive(Clone, serde::Serialize, serde::Deserialize)]
struct LeafRepr {
    expr: Expr,
    operator: Operator,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    values: Vec<SqlValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    other: Option<Expr>,
}

#[cfg(feature = "serde")]
impl TryFrom<LeafRepr> for Leaf {
    type Error = CompileError;

    fn try_from(repr: LeafRepr) -> Result<Self> {
        let bound = match repr.other {
            None => {
                repr.operator.check_arity(repr.values.len())?;
                Bound::Values(repr.values)
            }
            Some(other) if repr.values.is_empty() && repr.operator.is_binary() => {
                Bound::Expr(other)
            }
            Some(_) => {
                return Err(CompileError::MalformedPredicateArity {
                    operator: repr.operator.as_sql(),
                    expected: String::from("exactly 1 operand"),
                    actual: repr.values.len() + 1,
                })
            }
        };
        Ok(Self::new_unchecked(repr.expr, repr.operator, bound))
    }
}

#[cfg(feature = "serde")]
impl From<Leaf> for LeafRepr {
    fn from(leaf: Leaf) -> Self {
        let (values, other) = match leaf.bound {
            Bound::Values(values) => (values, None),
            Bound::Expr(expr) => (vec![], Some(expr)),
        };
        Self {
            expr: leaf.expr,
            operator: leaf.operator,
            values,
            other,
        }
    }
}
