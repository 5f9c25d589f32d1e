//! Statement compilation.
//!
//! [`Compiler`] binds one [`Dialect`], one [`MetadataProvider`] and a set of
//! [`CompileOptions`]. It holds no mutable state: every method renders a
//! fresh [`CompiledStatement`] from its arguments.

mod batch;
mod condition;
mod count;
mod mutation;
mod select;

use std::fmt;

use tracing::{debug, warn};

use crate::ast::TableRef;
use crate::dialect::Dialect;
use crate::error::{CompileError, Result};
use crate::schema::{MetadataProvider, NoMetadata, TableMeta};
use crate::value::SqlValue;

pub use count::can_optimize_count;

pub(crate) use condition::Renderer;

const NO_METADATA: &NoMetadata = &NoMetadata;

/// What to do when a statement's table name cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MissingTablePolicy {
    /// Render an empty table name, e.g. `DELETE FROM  WHERE "id" = ?`.
    #[default]
    Degenerate,
    /// Fail with [`CompileError::MetadataResolution`].
    Strict,
}

/// Compilation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CompileOptions {
    /// Missing-table handling.
    pub missing_table: MissingTablePolicy,
}

impl CompileOptions {
    /// Default options: unresolved tables render with an empty name.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            missing_table: MissingTablePolicy::Degenerate,
        }
    }

    /// Options that reject unresolved tables.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            missing_table: MissingTablePolicy::Strict,
        }
    }
}

/// SQL text with positional `?` placeholders and the values bound to them.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    sql: String,
    params: Vec<SqlValue>,
}

impl CompiledStatement {
    pub(crate) const fn new(sql: String, params: Vec<SqlValue>) -> Self {
        Self { sql, params }
    }

    /// SQL text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bound values in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Splits into SQL text and parameters.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }

    /// Number of `?` placeholders outside quoted identifiers and literals.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        placeholder_positions(&self.sql).len()
    }

    /// Renders the statement with every parameter inlined as a literal.
    ///
    /// **Warning**: for logging only. Execute [`Self::sql`] with
    /// [`Self::params`] instead.
    #[must_use]
    pub fn to_debug_sql(&self) -> String {
        let mut out = String::with_capacity(self.sql.len());
        let mut params = self.params.iter();
        let mut last = 0;
        for pos in placeholder_positions(&self.sql) {
            out.push_str(&self.sql[last..pos]);
            match params.next() {
                Some(value) => out.push_str(&value.to_sql_inline()),
                None => out.push('?'),
            }
            last = pos + 1;
        }
        out.push_str(&self.sql[last..]);
        out
    }
}

impl fmt::Display for CompiledStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

fn placeholder_positions(sql: &str) -> Vec<usize> {
    let mut positions = vec![];
    let mut closing: Option<char> = None;
    for (i, c) in sql.char_indices() {
        match closing {
            Some(end) if c == end => closing = None,
            Some(_) => {}
            None => match c {
                '?' => positions.push(i),
                '\'' | '"' | '`' => closing = Some(c),
                '[' => closing = Some(']'),
                _ => {}
            },
        }
    }
    positions
}

/// Compiles descriptions into SQL for one dialect.
///
/// ```
/// use flexql_core::ast::{col, ExprOps, QueryDescription, TableRef};
/// use flexql_core::{Compiler, DbType};
///
/// let dialect = DbType::PostgreSql.dialect();
/// let query = QueryDescription::new()
///     .from(TableRef::new("tb_account"))
///     .where_clause(col("id").ge(100));
/// let stmt = Compiler::new(&dialect).select_by_query(&query).unwrap();
/// assert_eq!(stmt.sql(), r#"SELECT * FROM "tb_account" WHERE "id" >= ?"#);
/// ```
#[derive(Clone, Copy)]
pub struct Compiler<'a> {
    dialect: &'a Dialect,
    metadata: &'a dyn MetadataProvider,
    options: CompileOptions,
}

impl fmt::Debug for Compiler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiler")
            .field("dialect", &self.dialect.name())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> Compiler<'a> {
    /// Creates a compiler with no metadata and default options.
    #[must_use]
    pub const fn new(dialect: &'a Dialect) -> Self {
        Self {
            dialect,
            metadata: NO_METADATA,
            options: CompileOptions::new(),
        }
    }

    /// Uses `metadata` for entity lookups.
    #[must_use]
    pub const fn with_metadata(mut self, metadata: &'a dyn MetadataProvider) -> Self {
        self.metadata = metadata;
        self
    }

    /// Replaces the options.
    #[must_use]
    pub const fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// The target dialect.
    #[must_use]
    pub const fn dialect(&self) -> &'a Dialect {
        self.dialect
    }

    /// The active options.
    #[must_use]
    pub const fn options(&self) -> CompileOptions {
        self.options
    }

    fn finish(&self, sql: String, params: Vec<SqlValue>) -> CompiledStatement {
        debug!(
            dialect = self.dialect.name(),
            sql = %sql,
            params = ?params,
            "compiled statement"
        );
        CompiledStatement::new(sql, params)
    }

    /// Renders a table reference, or applies the missing-table policy when
    /// there is none.
    fn table_sql(&self, table: Option<&TableRef>, entity: &str) -> Result<String> {
        match table {
            Some(table) => Ok(self.render_table(table)),
            None => self.missing_table(entity),
        }
    }

    fn render_table(&self, table: &TableRef) -> String {
        let mut sql = self.render_target(table);
        if let Some(alias) = &table.alias {
            sql.push_str(&self.dialect.alias_clause(alias));
        }
        sql
    }

    /// `schema.name` without the alias, for INSERT, UPDATE and DELETE
    /// targets.
    fn render_target(&self, table: &TableRef) -> String {
        let mut sql = String::new();
        if let Some(schema) = &table.schema {
            sql.push_str(&self.dialect.wrap(schema));
            sql.push('.');
        }
        sql.push_str(&self.dialect.wrap(&table.name));
        sql
    }

    /// Like [`Self::table_sql`], without the alias.
    fn target_sql(&self, table: Option<&TableRef>, entity: &str) -> Result<String> {
        match table {
            Some(table) => Ok(self.render_target(table)),
            None => self.missing_table(entity),
        }
    }

    fn missing_table(&self, entity: &str) -> Result<String> {
        match self.options.missing_table {
            MissingTablePolicy::Strict => Err(CompileError::MetadataResolution {
                entity: String::from(entity),
            }),
            MissingTablePolicy::Degenerate => {
                warn!(
                    dialect = self.dialect.name(),
                    entity, "rendering statement with empty table name"
                );
                Ok(String::new())
            }
        }
    }

    /// Looks up entity metadata; columns are required.
    fn entity_meta(&self, entity: &str) -> Result<TableMeta> {
        self.metadata
            .table(entity)
            .ok_or_else(|| CompileError::MetadataResolution {
                entity: String::from(entity),
            })
    }

    /// Resolves the table for an entity, applying the missing-table policy
    /// when either the entity or its table name is unknown.
    fn entity_table(&self, entity: &str, meta: Option<&TableMeta>) -> Result<String> {
        let table = meta.and_then(|m| {
            m.table.as_ref().map(|name| {
                let table = TableRef::new(name.clone());
                match &m.schema {
                    Some(schema) => table.schema(schema.clone()),
                    None => table,
                }
            })
        });
        self.table_sql(table.as_ref(), entity)
    }

    fn renderer(&self, qualify: bool) -> Renderer<'a> {
        Renderer::new(self.dialect, qualify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DbType;

    #[test]
    fn test_placeholder_count_skips_quoted() {
        let stmt = CompiledStatement::new(
            String::from(r#"SELECT "a?" FROM t WHERE x = ? AND y = '?' AND [z?] = ?"#),
            vec![SqlValue::Int(1), SqlValue::Int(2)],
        );
        assert_eq!(stmt.placeholder_count(), 2);
    }

    #[test]
    fn test_debug_sql_inlines_params() {
        let stmt = CompiledStatement::new(
            String::from(r#"SELECT * FROM "tb_account" WHERE "id" >= ? AND "user_name" LIKE ?"#),
            vec![SqlValue::Int(100), SqlValue::Text(String::from("te'st"))],
        );
        assert_eq!(
            stmt.to_debug_sql(),
            r#"SELECT * FROM "tb_account" WHERE "id" >= 100 AND "user_name" LIKE 'te''st'"#
        );
    }

    #[test]
    fn test_render_table_with_schema_and_alias() {
        let pg = DbType::PostgreSql.dialect();
        let oracle = DbType::Oracle.dialect();
        let table = TableRef::new("tb_account").schema("app").alias("u");
        assert_eq!(
            Compiler::new(&pg).render_table(&table),
            r#""app"."tb_account" AS "u""#
        );
        assert_eq!(
            Compiler::new(&oracle).render_table(&table),
            r#""app"."tb_account" "u""#
        );
    }

    const POSTGRES: Dialect = DbType::PostgreSql.dialect();
    const COMPILER: Compiler<'static> = Compiler::new(&POSTGRES);

    #[test]
    fn test_compiler_in_const_context() {
        assert_eq!(COMPILER.options(), CompileOptions::default());
        assert_eq!(CompileOptions::new(), CompileOptions::default());
        assert_eq!(COMPILER.dialect().name(), "postgresql");
    }

    #[test]
    fn test_render_target_drops_alias() {
        let mysql = DbType::MySql.dialect();
        let table = TableRef::new("tb_account").schema("app").alias("u");
        assert_eq!(
            Compiler::new(&mysql).render_target(&table),
            "`app`.`tb_account`"
        );
    }

    #[test]
    fn test_strict_missing_table() {
        let pg = DbType::PostgreSql.dialect();
        let compiler = Compiler::new(&pg).with_options(CompileOptions::strict());
        assert_eq!(
            compiler.table_sql(None, "tb_account"),
            Err(CompileError::MetadataResolution {
                entity: String::from("tb_account")
            })
        );
        assert_eq!(Compiler::new(&pg).table_sql(None, "tb_account"), Ok(String::new()));
    }
}
