//! Table references, column references and scalar expressions.

use std::hash::{Hash, Hasher};

use crate::value::{SqlValue, ToSqlValue};

use super::predicate::{Bound, Leaf, Operator, Predicate};

/// A table used as a FROM source or JOIN target.
///
/// Equality and hashing consider only the table name and alias.
#[derive(Debug, Clone, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableRef {
    /// Physical table name.
    pub name: String,
    /// Optional schema qualifier.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub schema: Option<String>,
    /// Optional alias.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub alias: Option<String>,
}

impl TableRef {
    /// Creates a table reference without schema or alias.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            alias: None,
        }
    }

    /// Sets the schema qualifier.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets the alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Returns the name columns of this table are qualified with: the alias
    /// when present, the table name otherwise.
    #[must_use]
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Creates a column reference qualified by this table.
    #[must_use]
    pub fn col(&self, name: impl Into<String>) -> ColumnRef {
        ColumnRef {
            table: Some(self.qualifier().to_string()),
            name: name.into(),
        }
    }
}

impl PartialEq for TableRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.alias == other.alias
    }
}

impl Hash for TableRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.alias.hash(state);
    }
}

/// A column reference, optionally qualified by a table name or alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnRef {
    /// Table name or alias used when the column must be qualified.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub table: Option<String>,
    /// Column name.
    pub name: String,
}

impl ColumnRef {
    /// Creates a qualified column reference.
    #[must_use]
    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }
}

/// Creates an unqualified column reference.
#[must_use]
pub fn col(name: impl Into<String>) -> ColumnRef {
    ColumnRef {
        table: None,
        name: name.into(),
    }
}

/// A scalar expression usable in select lists, predicates, GROUP BY and
/// ORDER BY.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Expr {
    /// A column reference.
    Column(ColumnRef),
    /// A function call such as `COUNT(DISTINCT x)`.
    Function {
        /// Function name, rendered verbatim.
        name: String,
        /// Arguments.
        args: Vec<Expr>,
        /// Whether `DISTINCT` prefixes the arguments.
        #[cfg_attr(feature = "serde", serde(default))]
        distinct: bool,
    },
    /// `*`.
    Star,
    /// A raw SQL fragment. Never wrapped, never parameterized.
    Raw(String),
}

impl Expr {
    /// Creates a function call expression.
    #[must_use]
    pub fn function(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Function {
            name: name.into(),
            args,
            distinct: false,
        }
    }

    /// Creates a raw SQL fragment.
    ///
    /// **Warning**: only use this for SQL that does not contain user input.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(sql.into())
    }

    /// Returns true when the expression is an aggregate call or a raw
    /// fragment whose row semantics are unknown.
    #[must_use]
    pub fn is_aggregate_or_opaque(&self) -> bool {
        match self {
            Self::Function { name, args, .. } => {
                AGGREGATES.iter().any(|a| a.eq_ignore_ascii_case(name))
                    || args.iter().any(Self::is_aggregate_or_opaque)
            }
            Self::Raw(_) => true,
            Self::Column(_) | Self::Star => false,
        }
    }
}

const AGGREGATES: &[&str] = &["COUNT", "SUM", "AVG", "MAX", "MIN"];

impl From<ColumnRef> for Expr {
    fn from(col: ColumnRef) -> Self {
        Self::Column(col)
    }
}

/// `COUNT(<expr>)`.
#[must_use]
pub fn count(expr: impl Into<Expr>) -> Expr {
    Expr::function("COUNT", vec![expr.into()])
}

/// `COUNT(*)`.
#[must_use]
pub fn count_all() -> Expr {
    Expr::function("COUNT", vec![Expr::Star])
}

/// `COUNT(DISTINCT <expr>)`.
#[must_use]
pub fn count_distinct(expr: impl Into<Expr>) -> Expr {
    Expr::Function {
        name: String::from("COUNT"),
        args: vec![expr.into()],
        distinct: true,
    }
}

/// `SUM(<expr>)`.
#[must_use]
pub fn sum(expr: impl Into<Expr>) -> Expr {
    Expr::function("SUM", vec![expr.into()])
}

/// `AVG(<expr>)`.
#[must_use]
pub fn avg(expr: impl Into<Expr>) -> Expr {
    Expr::function("AVG", vec![expr.into()])
}

/// `MAX(<expr>)`.
#[must_use]
pub fn max(expr: impl Into<Expr>) -> Expr {
    Expr::function("MAX", vec![expr.into()])
}

/// `MIN(<expr>)`.
#[must_use]
pub fn min(expr: impl Into<Expr>) -> Expr {
    Expr::function("MIN", vec![expr.into()])
}

/// An entry of the select list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectItem {
    /// Selected expression.
    pub expr: Expr,
    /// Output alias (`AS "alias"`).
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub alias: Option<String>,
}

impl From<Expr> for SelectItem {
    fn from(expr: Expr) -> Self {
        Self { expr, alias: None }
    }
}

impl From<ColumnRef> for SelectItem {
    fn from(col: ColumnRef) -> Self {
        Self::from(Expr::Column(col))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum OrderDirection {
    /// Ascending order (ASC)
    Asc,
    /// Descending order (DESC)
    Desc,
}

impl OrderDirection {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// An ORDER BY entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrderItem {
    /// Sort expression.
    pub expr: Expr,
    /// Direction; rendered bare when absent.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub direction: Option<OrderDirection>,
}

impl From<Expr> for OrderItem {
    fn from(expr: Expr) -> Self {
        Self {
            expr,
            direction: None,
        }
    }
}

impl From<ColumnRef> for OrderItem {
    fn from(col: ColumnRef) -> Self {
        Self::from(Expr::Column(col))
    }
}

/// Predicate and projection helpers shared by [`ColumnRef`] and [`Expr`].
///
/// Constructors whose arity is fixed by their signature are infallible.
/// [`ExprOps::in_list`] checks its arity when called.
pub trait ExprOps: Into<Expr> + Sized {
    /// `expr = ?`
    #[must_use]
    fn eq<V: ToSqlValue>(self, value: V) -> Predicate {
        single(self.into(), Operator::Eq, value.to_sql_value())
    }

    /// `expr != ?`
    #[must_use]
    fn ne<V: ToSqlValue>(self, value: V) -> Predicate {
        single(self.into(), Operator::Ne, value.to_sql_value())
    }

    /// `expr > ?`
    #[must_use]
    fn gt<V: ToSqlValue>(self, value: V) -> Predicate {
        single(self.into(), Operator::Gt, value.to_sql_value())
    }

    /// `expr >= ?`
    #[must_use]
    fn ge<V: ToSqlValue>(self, value: V) -> Predicate {
        single(self.into(), Operator::Ge, value.to_sql_value())
    }

    /// `expr < ?`
    #[must_use]
    fn lt<V: ToSqlValue>(self, value: V) -> Predicate {
        single(self.into(), Operator::Lt, value.to_sql_value())
    }

    /// `expr <= ?`
    #[must_use]
    fn le<V: ToSqlValue>(self, value: V) -> Predicate {
        single(self.into(), Operator::Le, value.to_sql_value())
    }

    /// `expr LIKE ?`
    #[must_use]
    fn like<V: ToSqlValue>(self, pattern: V) -> Predicate {
        single(self.into(), Operator::Like, pattern.to_sql_value())
    }

    /// `expr BETWEEN ? AND ?`
    #[must_use]
    fn between<L: ToSqlValue, H: ToSqlValue>(self, low: L, high: H) -> Predicate {
        Predicate::Leaf(Leaf::new_unchecked(
            self.into(),
            Operator::Between,
            Bound::Values(vec![low.to_sql_value(), high.to_sql_value()]),
        ))
    }

    /// `expr IN (?, ...)`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CompileError::MalformedPredicateArity`] when
    /// `values` is empty.
    fn in_list<V, I>(self, values: I) -> crate::Result<Predicate>
    where
        V: ToSqlValue,
        I: IntoIterator<Item = V>,
    {
        let values: Vec<SqlValue> = values.into_iter().map(ToSqlValue::to_sql_value).collect();
        Predicate::leaf(self, Operator::In, values)
    }

    /// `expr IS NULL`
    #[must_use]
    fn is_null(self) -> Predicate {
        Predicate::Leaf(Leaf::new_unchecked(
            self.into(),
            Operator::IsNull,
            Bound::Values(vec![]),
        ))
    }

    /// `expr IS NOT NULL`
    #[must_use]
    fn is_not_null(self) -> Predicate {
        Predicate::Leaf(Leaf::new_unchecked(
            self.into(),
            Operator::IsNotNull,
            Bound::Values(vec![]),
        ))
    }

    /// `expr = other`, comparing two expressions without binding a value.
    #[must_use]
    fn eq_expr(self, other: impl Into<Expr>) -> Predicate {
        Predicate::Leaf(Leaf::new_unchecked(
            self.into(),
            Operator::Eq,
            Bound::Expr(other.into()),
        ))
    }

    /// Selects the expression under an output alias.
    #[must_use]
    fn aliased(self, alias: impl Into<String>) -> SelectItem {
        SelectItem {
            expr: self.into(),
            alias: Some(alias.into()),
        }
    }

    /// Orders ascending.
    #[must_use]
    fn asc(self) -> OrderItem {
        OrderItem {
            expr: self.into(),
            direction: Some(OrderDirection::Asc),
        }
    }

    /// Orders descending.
    #[must_use]
    fn desc(self) -> OrderItem {
        OrderItem {
            expr: self.into(),
            direction: Some(OrderDirection::Desc),
        }
    }
}

impl ExprOps for ColumnRef {}
impl ExprOps for Expr {}

fn single(expr: Expr, operator: Operator, value: SqlValue) -> Predicate {
    Predicate::Leaf(Leaf::new_unchecked(expr, operator, Bound::Values(vec![value])))
}
