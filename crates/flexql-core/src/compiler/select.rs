//! SELECT assembly.

use crate::ast::QueryDescription;
use crate::dialect::SelectParts;
use crate::error::Result;
use crate::value::SqlValue;

use super::{CompiledStatement, Compiler};

/// A SELECT rendered clause by clause, before pagination.
pub(super) struct RenderedSelect {
    pub(super) columns: String,
    /// ` FROM` through HAVING.
    pub(super) body: String,
    pub(super) order_by: Option<String>,
    pub(super) params: Vec<SqlValue>,
}

impl RenderedSelect {
    pub(super) fn parts(&self, distinct: bool) -> SelectParts<'_> {
        SelectParts {
            distinct,
            columns: &self.columns,
            body: &self.body,
            order_by: self.order_by.as_deref(),
        }
    }
}

impl Compiler<'_> {
    /// Compiles a SELECT, including pagination.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CompileError::MetadataResolution`] when the query
    /// has no FROM table under the strict policy, and
    /// [`crate::CompileError::UnsupportedDialectFeature`] when the dialect
    /// cannot express the requested pagination.
    pub fn select_by_query(&self, query: &QueryDescription) -> Result<CompiledStatement> {
        let table = self.table_sql(query.from.as_ref(), "query")?;
        self.select_with_table(query, &table)
    }

    pub(super) fn select_with_table(
        &self,
        query: &QueryDescription,
        table: &str,
    ) -> Result<CompiledStatement> {
        let rendered = self.render_select(query, table);
        let sql = self.dialect.limit_strategy().apply(
            self.dialect.name(),
            &rendered.parts(query.distinct),
            query.limit,
            query.offset,
        )?;
        Ok(self.finish(sql, rendered.params))
    }

    pub(super) fn render_select(&self, query: &QueryDescription, table: &str) -> RenderedSelect {
        let renderer = self.renderer(query.is_multi_table());
        let mut body = String::from(" FROM ");
        let mut params = vec![];
        body.push_str(table);

        for join in &query.joins {
            body.push(' ');
            body.push_str(join.kind.as_sql());
            body.push(' ');
            body.push_str(&self.render_table(&join.table));
            body.push_str(" ON ");
            renderer.predicate(&mut body, &mut params, &join.on);
        }

        if let Some(where_clause) = &query.where_clause {
            body.push_str(" WHERE ");
            renderer.predicate(&mut body, &mut params, where_clause);
        }

        if !query.group_by.is_empty() {
            body.push_str(" GROUP BY ");
            body.push_str(&renderer.expr_list(&query.group_by));
        }

        if let Some(having) = &query.having {
            body.push_str(" HAVING ");
            renderer.predicate(&mut body, &mut params, having);
        }

        RenderedSelect {
            columns: renderer.select_list(&query.columns),
            body,
            order_by: renderer.order_list(&query.order_by),
            params,
        }
    }
}
