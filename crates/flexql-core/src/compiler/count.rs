//! Count statements for paginated reads.

use crate::ast::QueryDescription;
use crate::error::{CompileError, Result};
use crate::page::{PageRequest, PagedStatements};

use super::{CompiledStatement, Compiler};

/// Returns true when `SELECT COUNT(*)` over the FROM/JOIN/WHERE skeleton
/// counts the same rows as the query itself.
///
/// DISTINCT, GROUP BY and HAVING change the row count, and so do aggregate
/// or raw select items.
#[must_use]
pub fn can_optimize_count(query: &QueryDescription) -> bool {
    !query.distinct
        && query.group_by.is_empty()
        && query.having.is_none()
        && !query
            .columns
            .iter()
            .any(|item| item.expr.is_aggregate_or_opaque())
}

impl Compiler<'_> {
    /// Compiles the count for a query, rewriting it to a plain
    /// `SELECT COUNT(*)` when that is safe and wrapping it in a subquery
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::MetadataResolution`] when the query has no
    /// FROM table under the strict policy.
    pub fn select_count_by_query(&self, query: &QueryDescription) -> Result<CompiledStatement> {
        if can_optimize_count(query) {
            self.optimized_count(query)
        } else {
            self.subquery_count(query)
        }
    }

    /// `SELECT COUNT(*) FROM ... [WHERE ...]`, dropping the select list,
    /// ORDER BY and pagination.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnsupportedDialectFeature`] when
    /// [`can_optimize_count`] is false for the query.
    pub fn optimized_count(&self, query: &QueryDescription) -> Result<CompiledStatement> {
        if !can_optimize_count(query) {
            return Err(CompileError::unsupported(
                self.dialect.name(),
                "count optimization",
            ));
        }
        let table = self.table_sql(query.from.as_ref(), "query")?;
        let rendered = self.render_select(query, &table);
        let mut sql = String::from("SELECT COUNT(*)");
        sql.push_str(&rendered.body);
        Ok(self.finish(sql, rendered.params))
    }

    /// `SELECT COUNT(*) FROM (<query>) AS t`, with the inner query's ORDER BY
    /// and pagination removed. Always row-count preserving.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::MetadataResolution`] when the query has no
    /// FROM table under the strict policy.
    pub fn subquery_count(&self, query: &QueryDescription) -> Result<CompiledStatement> {
        let table = self.table_sql(query.from.as_ref(), "query")?;
        let rendered = self.render_select(query, &table);
        let mut parts = rendered.parts(query.distinct);
        parts.order_by = None;
        let mut sql = String::from("SELECT COUNT(*) FROM (");
        sql.push_str(&parts.render());
        sql.push(')');
        sql.push_str(if self.dialect.table_alias_keyword() {
            " AS t"
        } else {
            " t"
        });
        Ok(self.finish(sql, rendered.params))
    }

    /// Compiles the records statement and the count statement of one page
    /// from the same description.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Self::select_by_query`] and
    /// [`Self::select_count_by_query`].
    pub fn paginate(&self, query: &QueryDescription, page: PageRequest) -> Result<PagedStatements> {
        let paged = query
            .clone()
            .limit(page.size)
            .offset(page.offset());
        let records = self.select_by_query(&paged)?;
        let count = if page.optimize_count {
            self.select_count_by_query(query)?
        } else {
            self.subquery_count(query)?
        };
        Ok(PagedStatements { records, count })
    }
}
