#![allow(dead_code)]

use flexql_core::ast::{QueryDescription, Row, TableRef};
use flexql_core::{
    ColumnMeta, CompiledStatement, Compiler, DbType, KeyStrategy, SqlValue, StaticMetadata,
    TableMeta,
};

pub const ACCOUNT_COLUMNS: [&str; 7] = [
    "id",
    "user_name",
    "birthday",
    "sex",
    "age",
    "is_normal",
    "is_delete",
];

pub fn account() -> TableRef {
    TableRef::new("tb_account")
}

pub fn article() -> TableRef {
    TableRef::new("tb_article")
}

pub fn account_meta() -> TableMeta {
    ACCOUNT_COLUMNS
        .iter()
        .fold(TableMeta::new("tb_account"), |meta, &name| {
            if name == "id" {
                meta.column(ColumnMeta::key(name, KeyStrategy::Auto))
            } else {
                meta.column(ColumnMeta::new(name))
            }
        })
}

pub fn article_meta() -> TableMeta {
    TableMeta::new("tb_article")
        .column(ColumnMeta::key("id", KeyStrategy::Auto))
        .column(ColumnMeta::new("account_id"))
        .column(ColumnMeta::new("title"))
        .column(ColumnMeta::new("content"))
}

/// Metadata registered under the entity names `account` and `article`.
pub fn metadata() -> StaticMetadata {
    StaticMetadata::new()
        .with("account", account_meta())
        .with("article", article_meta())
}

pub fn account_row(user_name: &str, age: i32, sex: i32) -> Row {
    Row::new()
        .with("user_name", user_name)
        .with("age", age)
        .with("sex", sex)
}

pub fn select(db: DbType, query: &QueryDescription) -> CompiledStatement {
    let dialect = db.dialect();
    Compiler::new(&dialect)
        .select_by_query(query)
        .unwrap_or_else(|e| panic!("{db}: failed to compile {query:?}: {e}"))
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(String::from(s))
}
