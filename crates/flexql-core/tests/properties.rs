//! Properties that hold for every generated query.

mod common;

use common::account;
use flexql_core::ast::{col, ExprOps, Predicate, QueryDescription};
use flexql_core::{Compiler, DbType, LimitOffset, SqlValue};
use proptest::prelude::*;

const COLUMNS: [&str; 4] = ["id", "user_name", "age", "sex"];

fn value() -> impl Strategy<Value = SqlValue> {
    prop_oneof![
        any::<i64>().prop_map(SqlValue::Int),
        "[a-z' ?\"]{0,8}".prop_map(SqlValue::Text),
        Just(SqlValue::Null),
    ]
}

fn leaf() -> impl Strategy<Value = Predicate> {
    let column = prop::sample::select(COLUMNS.to_vec());
    prop_oneof![
        (column.clone(), value()).prop_map(|(c, v)| col(c).eq(v)),
        (column.clone(), value()).prop_map(|(c, v)| col(c).ge(v)),
        (column.clone(), value()).prop_map(|(c, v)| col(c).like(v)),
        (column.clone(), value(), value()).prop_map(|(c, lo, hi)| col(c).between(lo, hi)),
        (column.clone(), prop::collection::vec(value(), 1..5))
            .prop_map(|(c, vs)| col(c).in_list(vs).unwrap()),
        column.prop_map(|c| col(c).is_null()),
    ]
}

fn predicate() -> impl Strategy<Value = Predicate> {
    leaf().prop_recursive(4, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l.and(r)),
            (inner.clone(), inner).prop_map(|(l, r)| l.or(r)),
        ]
    })
}

fn query() -> impl Strategy<Value = QueryDescription> {
    (
        prop::option::of(predicate()),
        prop::option::of(1u64..100),
        any::<bool>(),
    )
        .prop_map(|(filter, limit, ordered)| {
            let mut query = QueryDescription::new()
                .select([col("id"), col("user_name")])
                .from(account());
            if let Some(filter) = filter {
                query = query.where_clause(filter);
            }
            if let Some(limit) = limit {
                query = query.limit(limit);
            }
            if ordered {
                query = query.order_by(col("id").asc());
            }
            query
        })
}

/// SQL with every identifier quote removed.
fn unwrapped(sql: &str) -> String {
    sql.chars()
        .filter(|c| !matches!(c, '"' | '`' | '[' | ']'))
        .collect()
}

proptest! {
    #[test]
    fn test_placeholders_match_params(query in query()) {
        for db in DbType::ALL {
            let dialect = db.dialect();
            let stmt = Compiler::new(&dialect).select_by_query(&query).unwrap();
            prop_assert_eq!(stmt.placeholder_count(), stmt.params().len(), "{}", db);
        }
    }

    #[test]
    fn test_compilation_is_deterministic(query in query()) {
        let dialect = DbType::MySql.dialect();
        let compiler = Compiler::new(&dialect);
        prop_assert_eq!(
            compiler.select_by_query(&query).unwrap(),
            compiler.select_by_query(&query).unwrap()
        );
    }

    #[test]
    fn test_params_independent_of_dialect(query in query()) {
        let reference = DbType::PostgreSql.dialect();
        let expected = Compiler::new(&reference).select_by_query(&query).unwrap();
        for db in DbType::ALL {
            let dialect = db.dialect();
            let stmt = Compiler::new(&dialect).select_by_query(&query).unwrap();
            prop_assert_eq!(stmt.params(), expected.params(), "{}", db);
        }
    }

    #[test]
    fn test_count_forms_bind_same_params(query in query()) {
        let dialect = DbType::PostgreSql.dialect();
        let compiler = Compiler::new(&dialect);
        let optimized = compiler.optimized_count(&query).unwrap();
        let subquery = compiler.subquery_count(&query).unwrap();
        prop_assert_eq!(optimized.params(), subquery.params());
    }

    #[test]
    fn test_dialects_differ_only_in_wrapping_and_limit(query in query()) {
        let mut unpaged = query.clone();
        unpaged.limit = None;
        let reference = DbType::PostgreSql.dialect();
        let base = unwrapped(Compiler::new(&reference).select_by_query(&unpaged).unwrap().sql());
        for db in DbType::ALL {
            let dialect = db.dialect();
            let compiler = Compiler::new(&dialect);
            let plain = compiler.select_by_query(&unpaged).unwrap();
            prop_assert_eq!(unwrapped(plain.sql()), base.clone(), "{}", db);

            let paged = compiler.select_by_query(&query).unwrap();
            let suffix_only = matches!(
                dialect.limit_strategy(),
                LimitOffset::Standard | LimitOffset::MySql | LimitOffset::Sqlite | LimitOffset::OffsetFetch
            );
            if suffix_only {
                prop_assert!(unwrapped(paged.sql()).starts_with(&base), "{}", db);
            }
        }
    }
}
