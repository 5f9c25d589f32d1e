//! INSERT, UPDATE and DELETE assembly, plus the entity statements that read
//! keys and columns from metadata.

use crate::ast::{
    col, ExprOps, MutationDescription, Operator, Predicate, QueryDescription, Row, TableRef,
};
use crate::error::{CompileError, Result};
use crate::schema::{KeyStrategy, TableMeta};
use crate::value::SqlValue;

use super::batch::Cell;
use super::{CompiledStatement, Compiler};

impl Compiler<'_> {
    /// Compiles a mutation description.
    ///
    /// # Errors
    ///
    /// - [`CompileError::EmptyAssignments`] for an INSERT or UPDATE with no
    ///   columns.
    /// - [`CompileError::MetadataResolution`] for a missing table under the
    ///   strict policy.
    pub fn compile_mutation(&self, mutation: &MutationDescription) -> Result<CompiledStatement> {
        match mutation {
            MutationDescription::Insert { table, values } => {
                let table = self.target_sql(table.as_ref(), "insert")?;
                self.insert_single(&table, values)
            }
            MutationDescription::Update {
                table,
                set,
                where_clause,
            } => {
                let table = self.target_sql(table.as_ref(), "update")?;
                let pairs: Vec<(&str, &SqlValue)> = set.iter().collect();
                self.update_with(&table, &pairs, where_clause.as_ref())
            }
            MutationDescription::Delete {
                table,
                where_clause,
            } => {
                let table = self.target_sql(table.as_ref(), "delete")?;
                Ok(self.delete_with(&table, where_clause.as_ref()))
            }
        }
    }

    /// `INSERT INTO t(cols) VALUES (?, ...)` for one untyped row.
    ///
    /// # Errors
    ///
    /// [`CompileError::EmptyAssignments`] when the row is empty.
    pub fn insert_row(&self, table: &TableRef, row: &Row) -> Result<CompiledStatement> {
        let table = self.render_target(table);
        self.insert_single(&table, row)
    }

    /// `UPDATE t SET ... WHERE ...` for an untyped row, with the table and
    /// filter taken from `query`.
    ///
    /// # Errors
    ///
    /// - [`CompileError::EmptyAssignments`] when the row is empty.
    /// - [`CompileError::UnsupportedDialectFeature`] when the query joins.
    /// - [`CompileError::MetadataResolution`] for a missing FROM table under
    ///   the strict policy.
    pub fn update_row_by_query(
        &self,
        row: &Row,
        query: &QueryDescription,
    ) -> Result<CompiledStatement> {
        self.reject_joins(query, "UPDATE with JOIN")?;
        let table = self.target_sql(query.from.as_ref(), "query")?;
        let pairs: Vec<(&str, &SqlValue)> = row.iter().collect();
        self.update_with(&table, &pairs, query.where_clause.as_ref())
    }

    /// `DELETE FROM t [WHERE ...]` with the table and filter from `query`.
    ///
    /// Without a FROM table the default policy renders the documented empty
    /// form, `DELETE FROM  WHERE "id" = ?`.
    ///
    /// # Errors
    ///
    /// - [`CompileError::UnsupportedDialectFeature`] when the query joins.
    /// - [`CompileError::MetadataResolution`] for a missing FROM table under
    ///   the strict policy.
    pub fn delete_by_query(&self, query: &QueryDescription) -> Result<CompiledStatement> {
        self.reject_joins(query, "DELETE with JOIN")?;
        let table = self.target_sql(query.from.as_ref(), "query")?;
        Ok(self.delete_with(&table, query.where_clause.as_ref()))
    }

    /// Like [`Self::delete_by_query`], with the table resolved from the
    /// entity's metadata when the query has none.
    ///
    /// # Errors
    ///
    /// As [`Self::delete_by_query`].
    pub fn delete_by_query_for(
        &self,
        entity: &str,
        query: &QueryDescription,
    ) -> Result<CompiledStatement> {
        self.reject_joins(query, "DELETE with JOIN")?;
        let table = self.query_or_entity_table(entity, query, false)?;
        Ok(self.delete_with(&table, query.where_clause.as_ref()))
    }

    /// Like [`Self::select_by_query`], with the table resolved from the
    /// entity's metadata when the query has none.
    ///
    /// # Errors
    ///
    /// As [`Self::select_by_query`].
    pub fn select_by_query_for(
        &self,
        entity: &str,
        query: &QueryDescription,
    ) -> Result<CompiledStatement> {
        let table = self.query_or_entity_table(entity, query, true)?;
        self.select_with_table(query, &table)
    }

    /// Inserts one entity row over its metadata columns.
    ///
    /// Database-generated keys are left out unless the row sets them and
    /// sequence keys are inlined. Other absent or NULL columns bind NULL,
    /// or are omitted when `ignore_nulls` is set.
    ///
    /// # Errors
    ///
    /// - [`CompileError::MetadataResolution`] when the entity is unknown.
    /// - [`CompileError::EmptyAssignments`] when no column remains.
    pub fn insert_entity(
        &self,
        entity: &str,
        row: &Row,
        ignore_nulls: bool,
    ) -> Result<CompiledStatement> {
        let meta = self.entity_meta(entity)?;
        let table = self.entity_table(entity, Some(&meta))?;
        let mut columns = vec![];
        let mut cells = vec![];
        for column in &meta.columns {
            let value = row.get(&column.name).filter(|v| !v.is_null());
            let cell = match (&column.key_strategy, value) {
                (_, Some(value)) => Cell::Param(value.clone()),
                (KeyStrategy::Auto, None) if column.primary_key => continue,
                (KeyStrategy::Sequence(seq), None) if column.primary_key => Cell::Raw(seq.clone()),
                (_, None) if ignore_nulls => continue,
                (_, None) => Cell::Param(SqlValue::Null),
            };
            columns.push(column.name.as_str());
            cells.push(cell);
        }
        if columns.is_empty() {
            return Err(CompileError::EmptyAssignments);
        }
        single(self.insert_values(&table, &columns, vec![cells])?)
    }

    /// `UPDATE t SET ... WHERE <key> = ?` for one entity row. Key columns
    /// are never assigned.
    ///
    /// # Errors
    ///
    /// - [`CompileError::MetadataResolution`] when the entity is unknown.
    /// - [`CompileError::MissingPrimaryKey`] when the row lacks a key value.
    /// - [`CompileError::EmptyAssignments`] when no column remains to set.
    pub fn update_entity_by_id(
        &self,
        entity: &str,
        row: &Row,
        ignore_nulls: bool,
    ) -> Result<CompiledStatement> {
        let meta = self.entity_meta(entity)?;
        let mut ids = vec![];
        for key in meta.primary_keys() {
            match row.get(&key.name) {
                Some(value) if !value.is_null() => ids.push(value.clone()),
                _ => {
                    return Err(CompileError::MissingPrimaryKey {
                        entity: String::from(entity),
                        column: key.name.clone(),
                    })
                }
            }
        }
        let filter = key_filter(entity, &meta, ids)?;
        let table = self.entity_table(entity, Some(&meta))?;
        let pairs = assignments(Some(&meta), row, ignore_nulls);
        self.update_with(&table, &pairs, Some(&filter))
    }

    /// `UPDATE t SET ... WHERE ...` for one entity row, filtered by `query`.
    ///
    /// # Errors
    ///
    /// - [`CompileError::EmptyAssignments`] when no column remains to set.
    /// - [`CompileError::UnsupportedDialectFeature`] when the query joins.
    /// - [`CompileError::MetadataResolution`] for an unresolved table under
    ///   the strict policy.
    pub fn update_entity_by_query(
        &self,
        entity: &str,
        row: &Row,
        ignore_nulls: bool,
        query: &QueryDescription,
    ) -> Result<CompiledStatement> {
        self.reject_joins(query, "UPDATE with JOIN")?;
        let meta = self.metadata.table(entity);
        let table = self.entity_table(entity, meta.as_ref())?;
        let pairs = assignments(meta.as_ref(), row, ignore_nulls);
        self.update_with(&table, &pairs, query.where_clause.as_ref())
    }

    /// `DELETE FROM t WHERE <key> = ?`. Composite keys AND their columns.
    ///
    /// # Errors
    ///
    /// - [`CompileError::MetadataResolution`] when the entity is unknown.
    /// - [`CompileError::IdArity`] when `id` does not match the key.
    pub fn delete_by_id(&self, entity: &str, id: &[SqlValue]) -> Result<CompiledStatement> {
        let meta = self.entity_meta(entity)?;
        let filter = key_filter(entity, &meta, id.to_vec())?;
        let table = self.entity_table(entity, Some(&meta))?;
        Ok(self.delete_with(&table, Some(&filter)))
    }

    /// Deletes several entities by key: `"id" IN (?, ...)` for a single key
    /// column, an OR of per-entity key matches for composite keys.
    ///
    /// # Errors
    ///
    /// - [`CompileError::EmptyBatch`] when `ids` is empty.
    /// - [`CompileError::MetadataResolution`] when the entity is unknown.
    /// - [`CompileError::IdArity`] when an id does not match the key.
    pub fn delete_batch_by_ids(
        &self,
        entity: &str,
        ids: &[Vec<SqlValue>],
    ) -> Result<CompiledStatement> {
        let meta = self.entity_meta(entity)?;
        if ids.is_empty() {
            return Err(CompileError::EmptyBatch);
        }
        let keys: Vec<&str> = meta.primary_keys().map(|k| k.name.as_str()).collect();
        let filter = if let [key] = keys.as_slice() {
            let mut values = Vec::with_capacity(ids.len());
            for id in ids {
                check_id_arity(entity, 1, id.len())?;
                values.extend(id.iter().cloned());
            }
            Predicate::leaf(col(*key), Operator::In, values)?
        } else {
            let mut filter: Option<Predicate> = None;
            for id in ids {
                let matched = key_filter(entity, &meta, id.clone())?;
                filter = Some(match filter {
                    Some(existing) => existing.or(matched),
                    None => matched,
                });
            }
            filter.ok_or(CompileError::EmptyBatch)?
        };
        let table = self.entity_table(entity, Some(&meta))?;
        Ok(self.delete_with(&table, Some(&filter)))
    }

    /// `SELECT * FROM t WHERE <key> = ?`.
    ///
    /// # Errors
    ///
    /// - [`CompileError::MetadataResolution`] when the entity is unknown.
    /// - [`CompileError::IdArity`] when `id` does not match the key.
    pub fn select_by_id(&self, entity: &str, id: &[SqlValue]) -> Result<CompiledStatement> {
        let meta = self.entity_meta(entity)?;
        let filter = key_filter(entity, &meta, id.to_vec())?;
        let table = self.entity_table(entity, Some(&meta))?;
        let query = QueryDescription::new().where_clause(filter);
        self.select_with_table(&query, &table)
    }

    fn insert_single(&self, table: &str, row: &Row) -> Result<CompiledStatement> {
        if row.is_empty() {
            return Err(CompileError::EmptyAssignments);
        }
        let columns: Vec<&str> = row.columns().collect();
        let cells = row.iter().map(|(_, v)| Cell::Param(v.clone())).collect();
        single(self.insert_values(table, &columns, vec![cells])?)
    }

    fn update_with(
        &self,
        table: &str,
        pairs: &[(&str, &SqlValue)],
        filter: Option<&Predicate>,
    ) -> Result<CompiledStatement> {
        if pairs.is_empty() {
            return Err(CompileError::EmptyAssignments);
        }
        let mut sql = format!("UPDATE {table} SET ");
        let mut params = Vec::with_capacity(pairs.len());
        for (i, (column, value)) in pairs.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&self.dialect.wrap(column));
            sql.push_str(" = ?");
            params.push((*value).clone());
        }
        if let Some(filter) = filter {
            sql.push_str(" WHERE ");
            self.renderer(false).predicate(&mut sql, &mut params, filter);
        }
        Ok(self.finish(sql, params))
    }

    fn delete_with(&self, table: &str, filter: Option<&Predicate>) -> CompiledStatement {
        let mut sql = format!("DELETE FROM {table}");
        let mut params = vec![];
        if let Some(filter) = filter {
            sql.push_str(" WHERE ");
            self.renderer(false).predicate(&mut sql, &mut params, filter);
        }
        self.finish(sql, params)
    }

    fn reject_joins(&self, query: &QueryDescription, feature: &str) -> Result<()> {
        if query.is_multi_table() {
            Err(CompileError::unsupported(self.dialect.name(), feature))
        } else {
            Ok(())
        }
    }

    fn query_or_entity_table(
        &self,
        entity: &str,
        query: &QueryDescription,
        with_alias: bool,
    ) -> Result<String> {
        match &query.from {
            Some(table) if with_alias => Ok(self.render_table(table)),
            Some(table) => Ok(self.render_target(table)),
            None => {
                let meta = self.metadata.table(entity);
                self.entity_table(entity, meta.as_ref())
            }
        }
    }
}

/// SET pairs for an entity row. With known columns, they follow metadata
/// order and skip keys and columns the row does not set; otherwise they
/// follow row order.
fn assignments<'r>(
    meta: Option<&TableMeta>,
    row: &'r Row,
    ignore_nulls: bool,
) -> Vec<(&'r str, &'r SqlValue)> {
    let keep = |(_, value): &(&str, &SqlValue)| !(ignore_nulls && value.is_null());
    match meta.filter(|m| !m.columns.is_empty()) {
        Some(meta) => meta
            .columns
            .iter()
            .filter(|c| !c.primary_key)
            .filter_map(|c| row.get_key_value(&c.name))
            .filter(keep)
            .collect(),
        None => row.iter().filter(keep).collect(),
    }
}

fn single(statements: Vec<CompiledStatement>) -> Result<CompiledStatement> {
    statements
        .into_iter()
        .next()
        .ok_or(CompileError::EmptyBatch)
}

fn check_id_arity(entity: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual && expected > 0 {
        Ok(())
    } else {
        Err(CompileError::IdArity {
            entity: String::from(entity),
            expected,
            actual,
        })
    }
}

/// `"a" = ? AND "b" = ?` over the entity's key columns.
fn key_filter(entity: &str, meta: &TableMeta, id: Vec<SqlValue>) -> Result<Predicate> {
    let keys: Vec<&str> = meta.primary_keys().map(|k| k.name.as_str()).collect();
    check_id_arity(entity, keys.len(), id.len())?;
    keys.into_iter()
        .zip(id)
        .map(|(key, value)| col(key).eq(value))
        .reduce(Predicate::and)
        .ok_or_else(|| CompileError::IdArity {
            entity: String::from(entity),
            expected: 0,
            actual: 0,
        })
}
