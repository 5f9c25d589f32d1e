//! Expression and predicate rendering.

use crate::ast::{
    Bound, ColumnRef, Connector, Expr, Leaf, Operator, OrderItem, Predicate, SelectItem,
};
use crate::dialect::Dialect;
use crate::value::SqlValue;

/// Renders expressions for one statement.
///
/// `qualify` is set when the statement joins more than one table; column
/// references then carry their table qualifier.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Renderer<'a> {
    dialect: &'a Dialect,
    qualify: bool,
}

impl<'a> Renderer<'a> {
    pub(crate) const fn new(dialect: &'a Dialect, qualify: bool) -> Self {
        Self { dialect, qualify }
    }

    pub(crate) fn column(&self, sql: &mut String, column: &ColumnRef) {
        if self.qualify {
            if let Some(table) = &column.table {
                sql.push_str(&self.dialect.wrap(table));
                sql.push('.');
            }
        }
        sql.push_str(&self.dialect.wrap(&column.name));
    }

    pub(crate) fn expr(&self, sql: &mut String, expr: &Expr) {
        match expr {
            Expr::Column(column) => self.column(sql, column),
            Expr::Function {
                name,
                args,
                distinct,
            } => {
                sql.push_str(name);
                sql.push('(');
                if *distinct {
                    sql.push_str("DISTINCT ");
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(", ");
                    }
                    self.expr(sql, arg);
                }
                sql.push(')');
            }
            Expr::Star => sql.push('*'),
            Expr::Raw(raw) => sql.push_str(raw),
        }
    }

    /// Renders a comma-separated select list; empty renders `*`.
    pub(crate) fn select_list(&self, items: &[SelectItem]) -> String {
        if items.is_empty() {
            return String::from("*");
        }
        let mut sql = String::new();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            self.expr(&mut sql, &item.expr);
            if let Some(alias) = &item.alias {
                sql.push_str(" AS ");
                sql.push_str(&self.dialect.wrap(alias));
            }
        }
        sql
    }

    pub(crate) fn expr_list(&self, exprs: &[Expr]) -> String {
        let mut sql = String::new();
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            self.expr(&mut sql, expr);
        }
        sql
    }

    pub(crate) fn order_list(&self, items: &[OrderItem]) -> Option<String> {
        if items.is_empty() {
            return None;
        }
        let mut sql = String::new();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            self.expr(&mut sql, &item.expr);
            if let Some(direction) = item.direction {
                sql.push(' ');
                sql.push_str(direction.as_sql());
            }
        }
        Some(sql)
    }

    /// Renders a predicate tree, appending bound values in encounter order.
    pub(crate) fn predicate(&self, sql: &mut String, params: &mut Vec<SqlValue>, pred: &Predicate) {
        match pred {
            Predicate::Leaf(leaf) => self.leaf(sql, params, leaf),
            Predicate::Composite {
                left,
                connector,
                right,
            } => {
                self.child(sql, params, left, *connector);
                sql.push(' ');
                sql.push_str(connector.as_sql());
                sql.push(' ');
                self.child(sql, params, right, *connector);
            }
        }
    }

    fn child(
        &self,
        sql: &mut String,
        params: &mut Vec<SqlValue>,
        child: &Predicate,
        parent: Connector,
    ) {
        let grouped = child.connector().is_some_and(|c| c != parent);
        if grouped {
            sql.push('(');
        }
        self.predicate(sql, params, child);
        if grouped {
            sql.push(')');
        }
    }

    fn leaf(&self, sql: &mut String, params: &mut Vec<SqlValue>, leaf: &Leaf) {
        self.expr(sql, leaf.expr());
        sql.push(' ');
        sql.push_str(leaf.operator().as_sql());
        match leaf.bound() {
            Bound::Expr(other) => {
                sql.push(' ');
                self.expr(sql, other);
            }
            Bound::Values(values) => {
                match leaf.operator() {
                    Operator::IsNull | Operator::IsNotNull => {}
                    Operator::Between => sql.push_str(" ? AND ?"),
                    Operator::In => {
                        sql.push_str(" (");
                        sql.push_str(&placeholders(values.len()));
                        sql.push(')');
                    }
                    _ => sql.push_str(" ?"),
                }
                params.extend(values.iter().cloned());
            }
        }
    }
}

/// `?, ?, ?` with `n` placeholders.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{col, count, ExprOps, TableRef};
    use crate::dialect::DbType;

    fn render(dialect: &Dialect, qualify: bool, pred: &Predicate) -> (String, Vec<SqlValue>) {
        let mut sql = String::new();
        let mut params = vec![];
        Renderer::new(dialect, qualify).predicate(&mut sql, &mut params, pred);
        (sql, params)
    }

    #[test]
    fn test_leaf_operators() {
        let pg = DbType::PostgreSql.dialect();
        let (sql, params) = render(&pg, false, &col("age").between(18, 65));
        assert_eq!(sql, r#""age" BETWEEN ? AND ?"#);
        assert_eq!(params, vec![SqlValue::Int(18), SqlValue::Int(65)]);

        let (sql, params) = render(&pg, false, &col("id").in_list([1, 2, 3]).unwrap());
        assert_eq!(sql, r#""id" IN (?, ?, ?)"#);
        assert_eq!(params.len(), 3);

        let (sql, params) = render(&pg, false, &col("birthday").is_null());
        assert_eq!(sql, r#""birthday" IS NULL"#);
        assert!(params.is_empty());

        let (sql, _) = render(&pg, false, &col("sex").ne(1));
        assert_eq!(sql, r#""sex" != ?"#);
    }

    #[test]
    fn test_same_connector_is_flat() {
        let pg = DbType::PostgreSql.dialect();
        let pred = col("a").eq(1).and(col("b").eq(2)).and(col("c").eq(3));
        let (sql, params) = render(&pg, false, &pred);
        assert_eq!(sql, r#""a" = ? AND "b" = ? AND "c" = ?"#);
        assert_eq!(
            params,
            vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)]
        );
    }

    #[test]
    fn test_mixed_connectors_are_grouped() {
        let pg = DbType::PostgreSql.dialect();
        let pred = col("a").eq(1).and(col("b").eq(2).or(col("c").eq(3)));
        let (sql, _) = render(&pg, false, &pred);
        assert_eq!(sql, r#""a" = ? AND ("b" = ? OR "c" = ?)"#);

        let pred = col("a").eq(1).and(col("b").eq(2)).or(col("c").eq(3));
        let (sql, _) = render(&pg, false, &pred);
        assert_eq!(sql, r#"("a" = ? AND "b" = ?) OR "c" = ?"#);
    }

    #[test]
    fn test_qualification_follows_flag() {
        let pg = DbType::PostgreSql.dialect();
        let account = TableRef::new("tb_account");
        let article = TableRef::new("tb_article");
        let on = account.col("id").eq_expr(article.col("account_id"));

        let (sql, params) = render(&pg, true, &on);
        assert_eq!(sql, r#""tb_account"."id" = "tb_article"."account_id""#);
        assert!(params.is_empty());

        let (sql, _) = render(&pg, false, &on);
        assert_eq!(sql, r#""id" = "account_id""#);
    }

    #[test]
    fn test_functions_and_lists() {
        let mysql = DbType::MySql.dialect();
        let renderer = Renderer::new(&mysql, true);
        let article = TableRef::new("tb_article");
        let mut sql = String::new();
        renderer.expr(&mut sql, &count(article.col("id")));
        assert_eq!(sql, "COUNT(`tb_article`.`id`)");

        assert_eq!(renderer.select_list(&[]), "*");
        assert_eq!(
            renderer.select_list(&[col("user_name").aliased("name")]),
            "`user_name` AS `name`"
        );
        assert_eq!(
            renderer.order_list(&[col("id").asc(), col("age").into()]),
            Some(String::from("`id` ASC, `age`"))
        );
        assert_eq!(renderer.order_list(&[]), None);
    }
}
