//! Query and mutation descriptions.

use super::expression::{Expr, OrderItem, SelectItem, TableRef};
use super::predicate::Predicate;
use super::row::Row;

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum JoinKind {
    /// INNER JOIN
    Inner,
    /// LEFT JOIN
    Left,
    /// RIGHT JOIN
    Right,
    /// FULL JOIN
    Full,
}

impl JoinKind {
    /// Returns the SQL keyword for this join type.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
        }
    }
}

/// A JOIN clause.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinClause {
    /// Join type.
    pub kind: JoinKind,
    /// Joined table.
    pub table: TableRef,
    /// ON condition.
    pub on: Predicate,
}

/// A database-agnostic SELECT.
///
/// An empty column list selects `*`. Builder methods consume and return the
/// description:
///
/// ```
/// use flexql_core::ast::{col, ExprOps, QueryDescription, TableRef};
///
/// let query = QueryDescription::new()
///     .from(TableRef::new("tb_account"))
///     .where_clause(col("id").ge(100))
///     .order_by(col("id").desc())
///     .limit(10);
/// assert_eq!(query.limit, Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QueryDescription {
    /// `SELECT DISTINCT`.
    pub distinct: bool,
    /// Select list; empty renders `*`.
    pub columns: Vec<SelectItem>,
    /// Primary table.
    pub from: Option<TableRef>,
    /// Joins in declaration order.
    pub joins: Vec<JoinClause>,
    /// WHERE tree.
    #[cfg_attr(feature = "serde", serde(rename = "where"))]
    pub where_clause: Option<Predicate>,
    /// GROUP BY expressions.
    pub group_by: Vec<Expr>,
    /// HAVING tree.
    pub having: Option<Predicate>,
    /// ORDER BY entries.
    pub order_by: Vec<OrderItem>,
    /// Row limit.
    pub limit: Option<u64>,
    /// Row offset.
    pub offset: Option<u64>,
}

impl QueryDescription {
    /// Creates an empty description.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one select item.
    #[must_use]
    pub fn column(mut self, item: impl Into<SelectItem>) -> Self {
        self.columns.push(item.into());
        self
    }

    /// Adds several select items.
    #[must_use]
    pub fn select<I, T>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<SelectItem>,
    {
        self.columns.extend(items.into_iter().map(Into::into));
        self
    }

    /// Sets `SELECT DISTINCT`.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Sets the primary table.
    #[must_use]
    pub fn from(mut self, table: TableRef) -> Self {
        self.from = Some(table);
        self
    }

    /// Adds a join.
    #[must_use]
    pub fn join(mut self, kind: JoinKind, table: TableRef, on: Predicate) -> Self {
        self.joins.push(JoinClause { kind, table, on });
        self
    }

    /// Adds an INNER JOIN.
    #[must_use]
    pub fn inner_join(self, table: TableRef, on: Predicate) -> Self {
        self.join(JoinKind::Inner, table, on)
    }

    /// Adds a LEFT JOIN.
    #[must_use]
    pub fn left_join(self, table: TableRef, on: Predicate) -> Self {
        self.join(JoinKind::Left, table, on)
    }

    /// Adds a RIGHT JOIN.
    #[must_use]
    pub fn right_join(self, table: TableRef, on: Predicate) -> Self {
        self.join(JoinKind::Right, table, on)
    }

    /// Adds a FULL JOIN.
    #[must_use]
    pub fn full_join(self, table: TableRef, on: Predicate) -> Self {
        self.join(JoinKind::Full, table, on)
    }

    /// Replaces the WHERE tree.
    #[must_use]
    pub fn where_clause(mut self, predicate: Predicate) -> Self {
        self.where_clause = Some(predicate);
        self
    }

    /// ANDs a predicate onto the WHERE tree.
    #[must_use]
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    /// ORs a predicate onto the WHERE tree.
    #[must_use]
    pub fn or(mut self, predicate: Predicate) -> Self {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => existing.or(predicate),
            None => predicate,
        });
        self
    }

    /// Adds a GROUP BY expression.
    #[must_use]
    pub fn group_by(mut self, expr: impl Into<Expr>) -> Self {
        self.group_by.push(expr.into());
        self
    }

    /// Sets the HAVING tree.
    #[must_use]
    pub fn having(mut self, predicate: Predicate) -> Self {
        self.having = Some(predicate);
        self
    }

    /// Adds an ORDER BY entry.
    #[must_use]
    pub fn order_by(mut self, item: impl Into<OrderItem>) -> Self {
        self.order_by.push(item.into());
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub const fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets the row offset.
    #[must_use]
    pub const fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Returns true when at least one join is present, which makes column
    /// references render table-qualified.
    #[must_use]
    pub fn is_multi_table(&self) -> bool {
        !self.joins.is_empty()
    }
}

/// A database-agnostic INSERT, UPDATE or DELETE.
///
/// A `None` table renders the empty-table form, or fails under the strict
/// missing-table policy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum MutationDescription {
    /// `INSERT INTO t(cols) VALUES (...)`.
    Insert {
        /// Target table.
        table: Option<TableRef>,
        /// Column values in declaration order.
        values: Row,
    },
    /// `UPDATE t SET ... [WHERE ...]`.
    Update {
        /// Target table.
        table: Option<TableRef>,
        /// SET pairs in declaration order.
        set: Row,
        /// WHERE tree.
        #[cfg_attr(feature = "serde", serde(default, rename = "where"))]
        where_clause: Option<Predicate>,
    },
    /// `DELETE FROM t [WHERE ...]`.
    Delete {
        /// Target table.
        table: Option<TableRef>,
        /// WHERE tree.
        #[cfg_attr(feature = "serde", serde(default, rename = "where"))]
        where_clause: Option<Predicate>,
    },
}

impl MutationDescription {
    /// Creates an INSERT.
    #[must_use]
    pub fn insert(table: TableRef, values: Row) -> Self {
        Self::Insert {
            table: Some(table),
            values,
        }
    }

    /// Creates an UPDATE without a WHERE tree.
    #[must_use]
    pub fn update(table: TableRef, set: Row) -> Self {
        Self::Update {
            table: Some(table),
            set,
            where_clause: None,
        }
    }

    /// Creates a DELETE without a WHERE tree.
    #[must_use]
    pub fn delete(table: TableRef) -> Self {
        Self::Delete {
            table: Some(table),
            where_clause: None,
        }
    }

    /// Sets the WHERE tree. Has no effect on an INSERT.
    #[must_use]
    pub fn where_clause(mut self, predicate: Predicate) -> Self {
        match &mut self {
            Self::Update { where_clause, .. } | Self::Delete { where_clause, .. } => {
                *where_clause = Some(predicate);
            }
            Self::Insert { .. } => {}
        }
        self
    }
}
