//! Database-agnostic statement descriptions.
//!
//! These types describe *what* to query or mutate. They know nothing about
//! identifier quoting, pagination syntax or placeholders; the
//! [`crate::compiler`] turns them into SQL for one [`crate::Dialect`].

mod expression;
mod predicate;
mod row;
mod statement;

pub use expression::{
    avg, col, count, count_all, count_distinct, max, min, sum, ColumnRef, Expr, ExprOps,
    OrderDirection, OrderItem, SelectItem, TableRef,
};
pub use predicate::{Bound, Connector, Leaf, Operator, Predicate};
pub use row::Row;
pub use statement::{JoinClause, JoinKind, MutationDescription, QueryDescription};
