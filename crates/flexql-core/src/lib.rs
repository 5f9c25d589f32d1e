//! # flexql-core
//!
//! A dialect-aware SQL compiler. It turns database-agnostic query and
//! mutation descriptions into parameterized SQL for a specific database
//! product.
//!
//! This crate provides:
//! - Statement descriptions ([`ast`]): columns, tables, joins, predicate
//!   trees, grouping, ordering and pagination bounds
//! - A closed set of dialect strategies ([`dialect`]): identifier quoting,
//!   LIMIT/OFFSET renderings and batch-insert styles, with a registry of
//!   built-in database products
//! - A stateless [`Compiler`] producing [`CompiledStatement`]s, including
//!   batch splitting and count-query optimization for paginated reads
//!
//! The compiler never executes SQL and never touches a connection.
//!
//! ## Example
//!
//! ```rust
//! use flexql_core::ast::{col, ExprOps, QueryDescription, TableRef};
//! use flexql_core::{Compiler, DbType, SqlValue};
//!
//! let dialect = DbType::PostgreSql.dialect();
//! let query = QueryDescription::new()
//!     .from(TableRef::new("tb_account"))
//!     .where_clause(col("id").ge(100).and(col("user_name").like("test")))
//!     .order_by(col("id").desc())
//!     .limit(10)
//!     .offset(20);
//!
//! let stmt = Compiler::new(&dialect).select_by_query(&query).unwrap();
//! assert_eq!(
//!     stmt.sql(),
//!     r#"SELECT * FROM "tb_account" WHERE "id" >= ? AND "user_name" LIKE ? ORDER BY "id" DESC LIMIT 10 OFFSET 20"#
//! );
//! assert_eq!(
//!     stmt.params(),
//!     &[SqlValue::Int(100), SqlValue::Text(String::from("test"))]
//! );
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Values always travel as positional `?` parameters. Only identifiers,
//! which are quoted by the dialect, and explicit [`ast::Expr::Raw`]
//! fragments reach the SQL text.

pub mod ast;
pub mod compiler;
pub mod dialect;
pub mod error;
pub mod page;
pub mod schema;
pub mod value;

pub use compiler::{
    can_optimize_count, CompileOptions, CompiledStatement, Compiler, MissingTablePolicy,
};
pub use dialect::{BatchStyle, DbType, Dialect, KeywordWrap, LimitOffset};
pub use error::{CompileError, Result};
pub use page::{PageRequest, PagedStatements};
pub use schema::{
    ColumnMeta, KeyStrategy, MetadataProvider, NoMetadata, StaticMetadata, Table, TableMeta,
};
pub use value::{SqlValue, ToSqlValue};
