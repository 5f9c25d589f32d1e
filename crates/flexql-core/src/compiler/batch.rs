//! Multi-row INSERT and per-row UPDATE batches.

use tracing::trace;

use crate::ast::{Row, TableRef};
use crate::dialect::BatchStyle;
use crate::error::{CompileError, Result};
use crate::schema::KeyStrategy;
use crate::value::SqlValue;

use super::{CompiledStatement, Compiler};

/// One entry of a VALUES tuple.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Cell {
    /// Bound to a `?`.
    Param(SqlValue),
    /// Inlined verbatim, e.g. a sequence expression.
    Raw(String),
}

impl Compiler<'_> {
    /// Compiles a multi-row INSERT whose columns are the keys of the first
    /// row, in that row's order.
    ///
    /// Returns more than one statement when the dialect caps rows or
    /// parameters per statement.
    ///
    /// # Errors
    ///
    /// - [`CompileError::EmptyBatch`] for zero rows.
    /// - [`CompileError::EmptyAssignments`] when the first row is empty.
    /// - [`CompileError::BatchColumnMismatch`] when a later row lacks a
    ///   column of the first row or carries an extra one. Checked for every
    ///   row before any SQL is rendered.
    /// - [`CompileError::UnsupportedDialectFeature`] when one row alone
    ///   exceeds the dialect's parameter limit.
    pub fn insert_batch_with_first_row_columns(
        &self,
        table: &TableRef,
        rows: &[Row],
    ) -> Result<Vec<CompiledStatement>> {
        let first = rows.first().ok_or(CompileError::EmptyBatch)?;
        if first.is_empty() {
            return Err(CompileError::EmptyAssignments);
        }
        let columns: Vec<&str> = first.columns().collect();
        for (index, row) in rows.iter().enumerate().skip(1) {
            if let Some(missing) = columns.iter().find(|c| !row.contains(c)) {
                return Err(CompileError::BatchColumnMismatch {
                    row: index,
                    column: String::from(*missing),
                });
            }
            if let Some(extra) = row.columns().find(|c| !columns.contains(c)) {
                return Err(CompileError::BatchColumnMismatch {
                    row: index,
                    column: String::from(extra),
                });
            }
        }

        let cells = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| Cell::Param(row.get(c).cloned().unwrap_or(SqlValue::Null)))
                    .collect()
            })
            .collect();
        let table = self.render_target(table);
        self.insert_values(&table, &columns, cells)
    }

    /// Compiles a multi-row INSERT of entity rows over every metadata
    /// column, keys included. Absent values bind NULL and sequence keys are
    /// inlined.
    ///
    /// # Errors
    ///
    /// - [`CompileError::MetadataResolution`] when the entity is unknown.
    /// - [`CompileError::EmptyBatch`] for zero rows.
    /// - [`CompileError::EmptyAssignments`] when the entity has no columns.
    pub fn insert_entity_batch(
        &self,
        entity: &str,
        rows: &[Row],
    ) -> Result<Vec<CompiledStatement>> {
        let meta = self.entity_meta(entity)?;
        if rows.is_empty() {
            return Err(CompileError::EmptyBatch);
        }
        if meta.columns.is_empty() {
            return Err(CompileError::EmptyAssignments);
        }
        let table = self.entity_table(entity, Some(&meta))?;
        let columns: Vec<&str> = meta.columns.iter().map(|c| c.name.as_str()).collect();
        let cells = rows
            .iter()
            .map(|row| {
                meta.columns
                    .iter()
                    .map(|column| match &column.key_strategy {
                        KeyStrategy::Sequence(seq) if column.primary_key => {
                            Cell::Raw(seq.clone())
                        }
                        _ => Cell::Param(
                            row.get(&column.name).cloned().unwrap_or(SqlValue::Null),
                        ),
                    })
                    .collect()
            })
            .collect();
        self.insert_values(&table, &columns, cells)
    }

    /// Compiles one UPDATE-by-id per row.
    ///
    /// # Errors
    ///
    /// [`CompileError::EmptyBatch`] for zero rows, otherwise the first error
    /// of [`Self::update_entity_by_id`].
    pub fn update_entity_batch(
        &self,
        entity: &str,
        rows: &[Row],
        ignore_nulls: bool,
    ) -> Result<Vec<CompiledStatement>> {
        if rows.is_empty() {
            return Err(CompileError::EmptyBatch);
        }
        rows.iter()
            .map(|row| self.update_entity_by_id(entity, row, ignore_nulls))
            .collect()
    }

    /// Renders INSERT statements for `rows`, split at the dialect's limits.
    pub(super) fn insert_values(
        &self,
        table: &str,
        columns: &[&str],
        rows: Vec<Vec<Cell>>,
    ) -> Result<Vec<CompiledStatement>> {
        let params_per_row = rows.first().map_or(0, |cells| {
            cells.iter().filter(|c| matches!(c, Cell::Param(_))).count()
        });
        let chunk_size = self.rows_per_statement(params_per_row)?;
        if rows.len() > chunk_size {
            trace!(
                dialect = self.dialect.name(),
                rows = rows.len(),
                chunk_size,
                "splitting batch insert"
            );
        }

        let column_list = columns
            .iter()
            .map(|c| self.dialect.wrap(c))
            .collect::<Vec<_>>()
            .join(", ");
        let target = format!("{table}({column_list})");

        let mut statements = vec![];
        let mut rows = rows.into_iter().peekable();
        while rows.peek().is_some() {
            let chunk: Vec<Vec<Cell>> = rows.by_ref().take(chunk_size).collect();
            let mut params = Vec::with_capacity(chunk.len() * params_per_row);
            let sql = match self.dialect.batch_style() {
                BatchStyle::MultiValues => {
                    let mut sql = format!("INSERT INTO {target} VALUES ");
                    for (i, cells) in chunk.into_iter().enumerate() {
                        if i > 0 {
                            sql.push_str(", ");
                        }
                        push_tuple(&mut sql, &mut params, cells);
                    }
                    sql
                }
                BatchStyle::InsertAll => {
                    let mut sql = String::from("INSERT ALL");
                    for cells in chunk {
                        sql.push_str(&format!(" INTO {target} VALUES "));
                        push_tuple(&mut sql, &mut params, cells);
                    }
                    sql.push_str(" SELECT 1 FROM DUAL");
                    sql
                }
            };
            statements.push(self.finish(sql, params));
        }
        Ok(statements)
    }

    fn rows_per_statement(&self, params_per_row: usize) -> Result<usize> {
        let by_params = match self.dialect.max_batch_params() {
            Some(max) if params_per_row > max => {
                return Err(CompileError::unsupported(
                    self.dialect.name(),
                    format!("a row of {params_per_row} parameters (limit {max})"),
                ));
            }
            Some(max) if params_per_row > 0 => max / params_per_row,
            _ => usize::MAX,
        };
        let by_rows = self.dialect.max_batch_rows().unwrap_or(usize::MAX);
        Ok(by_params.min(by_rows).max(1))
    }
}

fn push_tuple(sql: &mut String, params: &mut Vec<SqlValue>, cells: Vec<Cell>) {
    sql.push('(');
    for (i, cell) in cells.into_iter().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        match cell {
            Cell::Param(value) => {
                sql.push('?');
                params.push(value);
            }
            Cell::Raw(raw) => sql.push_str(&raw),
        }
    }
    sql.push(')');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{DbType, Dialect};

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| {
                Row::new()
                    .with("username", format!("pg_user{i}"))
                    .with("age", 20 + i32::try_from(i).unwrap())
                    .with("sex", 1)
            })
            .collect()
    }

    #[test]
    fn test_first_row_columns() {
        let pg = DbType::PostgreSql.dialect();
        let stmts = Compiler::new(&pg)
            .insert_batch_with_first_row_columns(&TableRef::new("tb_account"), &rows(3))
            .unwrap();
        assert_eq!(stmts.len(), 1);
        assert_eq!(
            stmts[0].sql(),
            r#"INSERT INTO "tb_account"("username", "age", "sex") VALUES (?, ?, ?), (?, ?, ?), (?, ?, ?)"#
        );
        assert_eq!(stmts[0].params().len(), 9);
        assert_eq!(stmts[0].params()[3], SqlValue::Text(String::from("pg_user1")));
    }

    #[test]
    fn test_missing_and_extra_columns() {
        let pg = DbType::PostgreSql.dialect();
        let compiler = Compiler::new(&pg);
        let table = TableRef::new("tb_account");

        let mut short = rows(3);
        short[2] = Row::new().with("username", "x").with("age", 1);
        assert_eq!(
            compiler.insert_batch_with_first_row_columns(&table, &short),
            Err(CompileError::BatchColumnMismatch {
                row: 2,
                column: String::from("sex")
            })
        );

        let mut wide = rows(2);
        wide[1].set("birthday", SqlValue::Null);
        assert_eq!(
            compiler.insert_batch_with_first_row_columns(&table, &wide),
            Err(CompileError::BatchColumnMismatch {
                row: 1,
                column: String::from("birthday")
            })
        );

        assert_eq!(
            compiler.insert_batch_with_first_row_columns(&table, &[]),
            Err(CompileError::EmptyBatch)
        );
    }

    #[test]
    fn test_split_by_params() {
        let tiny = Dialect::custom("tiny").with_max_batch_params(7);
        let stmts = Compiler::new(&tiny)
            .insert_batch_with_first_row_columns(&TableRef::new("t"), &rows(5))
            .unwrap();
        let shapes: Vec<usize> = stmts.iter().map(|s| s.params().len()).collect();
        assert_eq!(shapes, vec![6, 6, 3]);
    }

    #[test]
    fn test_row_over_param_limit() {
        let tiny = Dialect::custom("tiny").with_max_batch_params(2);
        assert!(matches!(
            Compiler::new(&tiny).insert_batch_with_first_row_columns(&TableRef::new("t"), &rows(1)),
            Err(CompileError::UnsupportedDialectFeature { dialect: "tiny", .. })
        ));
    }

    #[test]
    fn test_insert_all() {
        let oracle = DbType::Oracle.dialect();
        let stmts = Compiler::new(&oracle)
            .insert_batch_with_first_row_columns(&TableRef::new("tb_account"), &rows(2))
            .unwrap();
        assert_eq!(
            stmts[0].sql(),
            r#"INSERT ALL INTO "tb_account"("username", "age", "sex") VALUES (?, ?, ?) INTO "tb_account"("username", "age", "sex") VALUES (?, ?, ?) SELECT 1 FROM DUAL"#
        );
    }

    #[test]
    fn test_one_row_per_statement() {
        let sybase = DbType::Sybase.dialect();
        let stmts = Compiler::new(&sybase)
            .insert_batch_with_first_row_columns(&TableRef::new("tb_account"), &rows(3))
            .unwrap();
        assert_eq!(stmts.len(), 3);
        assert_eq!(
            stmts[2].sql(),
            "INSERT INTO [tb_account]([username], [age], [sex]) VALUES (?, ?, ?)"
        );
    }
}
