//! Pagination strategies.
//!
//! Suffix strategies append a clause after ORDER BY. Rewrap strategies
//! rebuild the whole SELECT, either by nesting it in an outer query or by
//! injecting keywords right after `SELECT`.

use crate::error::{CompileError, Result};

const MYSQL_NO_LIMIT: &str = "18446744073709551615";

/// Closed set of LIMIT/OFFSET renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitOffset {
    /// `LIMIT n OFFSET m`
    Standard,
    /// `LIMIT m, n`
    MySql,
    /// `LIMIT n OFFSET m`, with `LIMIT -1` for offset-only.
    Sqlite,
    /// `OFFSET m ROWS FETCH NEXT n ROWS ONLY`
    OffsetFetch,
    /// OFFSET/FETCH with an ORDER BY fallback and `TOP 0` for empty pages.
    /// DISTINCT without ORDER BY cannot be paginated.
    SqlServer,
    /// Nested query filtered on `ROWNUM`.
    Rownum,
    /// Nested query filtered on `ROW_NUMBER() OVER (...)`.
    RowNumber,
    /// `SELECT SKIP m FIRST n`
    SkipFirst,
    /// `SELECT TOP n`, limit only.
    Top,
}

/// A SELECT broken into the pieces pagination strategies need.
#[derive(Debug, Clone, Copy)]
pub struct SelectParts<'a> {
    /// `SELECT DISTINCT` requested.
    pub distinct: bool,
    /// Rendered select list.
    pub columns: &'a str,
    /// Everything from ` FROM` through HAVING.
    pub body: &'a str,
    /// Rendered ORDER BY items, without the keyword.
    pub order_by: Option<&'a str>,
}

impl SelectParts<'_> {
    fn head(&self, keywords: &str) -> String {
        let mut sql = String::from("SELECT ");
        sql.push_str(keywords);
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql
    }

    fn render_with(&self, keywords: &str, order_by: Option<&str>) -> String {
        let mut sql = self.head(keywords);
        sql.push_str(self.columns);
        sql.push_str(self.body);
        if let Some(order) = order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        sql
    }

    fn render_top(&self, n: u64) -> String {
        let mut sql = self.head("");
        sql.push_str(&format!("TOP {n} "));
        sql.push_str(self.columns);
        sql.push_str(self.body);
        if let Some(order) = self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        sql
    }

    /// Renders the statement without pagination.
    #[must_use]
    pub fn render(&self) -> String {
        self.render_with("", self.order_by)
    }

    /// Renders a statement that yields no rows, for strategies whose row
    /// count must be at least 1. Ordering is dropped.
    fn render_empty(&self) -> String {
        format!(
            "SELECT * FROM ({}) TEMP_EMPTY WHERE 1 = 0",
            self.render_with("", None)
        )
    }
}

impl LimitOffset {
    /// Strategies that reject a row count of 0 and render empty pages as a
    /// guarded subquery instead.
    const fn needs_empty_guard(self) -> bool {
        matches!(self, Self::OffsetFetch | Self::SkipFirst | Self::Top)
    }

    /// Returns true when pagination is a clause appended after ORDER BY.
    #[must_use]
    pub const fn applies_as_suffix(self) -> bool {
        matches!(
            self,
            Self::Standard | Self::MySql | Self::Sqlite | Self::OffsetFetch | Self::SqlServer
        )
    }

    /// Renders the pagination suffix, without a leading space.
    ///
    /// Returns `Ok(None)` when neither limit nor offset is set.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnsupportedDialectFeature`] for rewrap
    /// strategies, which have no suffix form, and for a limit of 0 under
    /// `FETCH NEXT`, which requires at least one row.
    pub fn render_suffix(
        self,
        dialect: &'static str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Option<String>> {
        if limit.is_none() && offset.is_none() {
            return Ok(None);
        }
        let clause = match (self, limit, offset) {
            (Self::OffsetFetch | Self::SqlServer, Some(0), _) => {
                return Err(CompileError::unsupported(dialect, "FETCH NEXT 0 ROWS"));
            }
            (Self::Standard | Self::Sqlite | Self::MySql, Some(n), None) => format!("LIMIT {n}"),
            (Self::Standard, None, Some(m)) => format!("OFFSET {m}"),
            (Self::Standard | Self::Sqlite, Some(n), Some(m)) => format!("LIMIT {n} OFFSET {m}"),
            (Self::MySql, None, Some(m)) => format!("LIMIT {m}, {MYSQL_NO_LIMIT}"),
            (Self::MySql, Some(n), Some(m)) => format!("LIMIT {m}, {n}"),
            (Self::Sqlite, None, Some(m)) => format!("LIMIT -1 OFFSET {m}"),
            (Self::OffsetFetch | Self::SqlServer, Some(n), None) => {
                format!("OFFSET 0 ROWS FETCH NEXT {n} ROWS ONLY")
            }
            (Self::OffsetFetch | Self::SqlServer, None, Some(m)) => format!("OFFSET {m} ROWS"),
            (Self::OffsetFetch | Self::SqlServer, Some(n), Some(m)) => {
                format!("OFFSET {m} ROWS FETCH NEXT {n} ROWS ONLY")
            }
            _ => {
                return Err(CompileError::unsupported(
                    dialect,
                    format!("suffix pagination with {self:?} strategy"),
                ))
            }
        };
        Ok(Some(clause))
    }

    /// Renders the complete SELECT with pagination applied.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::UnsupportedDialectFeature`] when the
    /// strategy cannot express the request: an offset under [`Self::Top`],
    /// DISTINCT under [`Self::RowNumber`], or DISTINCT without ORDER BY
    /// under [`Self::SqlServer`].
    pub fn apply(
        self,
        dialect: &'static str,
        parts: &SelectParts<'_>,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<String> {
        if limit.is_none() && offset.is_none() {
            return Ok(parts.render());
        }
        if limit == Some(0) && self.needs_empty_guard() {
            return Ok(parts.render_empty());
        }
        match self {
            Self::Standard | Self::MySql | Self::Sqlite | Self::OffsetFetch => {
                let mut sql = parts.render();
                if let Some(suffix) = self.render_suffix(dialect, limit, offset)? {
                    sql.push(' ');
                    sql.push_str(&suffix);
                }
                Ok(sql)
            }
            Self::SqlServer => {
                if limit == Some(0) {
                    return Ok(parts.render_top(0));
                }
                if parts.distinct && parts.order_by.is_none() {
                    return Err(CompileError::unsupported(
                        dialect,
                        "DISTINCT pagination without ORDER BY",
                    ));
                }
                let mut sql =
                    parts.render_with("", Some(parts.order_by.unwrap_or("CURRENT_TIMESTAMP")));
                if let Some(suffix) = self.render_suffix(dialect, limit, offset)? {
                    sql.push(' ');
                    sql.push_str(&suffix);
                }
                Ok(sql)
            }
            Self::Rownum => {
                let inner = parts.render();
                let m = offset.unwrap_or(0);
                let filter = limit.map_or_else(String::new, |n| {
                    format!(" WHERE ROWNUM <= {}", m.saturating_add(n))
                });
                Ok(format!(
                    "SELECT * FROM (SELECT TEMP_DATAS.*, ROWNUM RN FROM ({inner}) TEMP_DATAS{filter}) WHERE RN > {m}"
                ))
            }
            Self::RowNumber => {
                if parts.distinct {
                    return Err(CompileError::unsupported(
                        dialect,
                        "DISTINCT with ROW_NUMBER pagination",
                    ));
                }
                let m = offset.unwrap_or(0);
                let order = parts.order_by.unwrap_or("CURRENT_TIMESTAMP");
                let mut sql = format!(
                    "SELECT * FROM (SELECT {}, ROW_NUMBER() OVER (ORDER BY {order}) AS __rn{}) TEMP_PAGE WHERE __rn > {m}",
                    parts.columns, parts.body
                );
                if let Some(n) = limit {
                    sql.push_str(&format!(" AND __rn <= {}", m.saturating_add(n)));
                }
                Ok(sql)
            }
            Self::SkipFirst => {
                let mut keywords = String::new();
                if let Some(m) = offset {
                    keywords.push_str(&format!("SKIP {m} "));
                }
                if let Some(n) = limit {
                    keywords.push_str(&format!("FIRST {n} "));
                }
                Ok(parts.render_with(&keywords, parts.order_by))
            }
            Self::Top => {
                if offset.is_some_and(|m| m > 0) {
                    return Err(CompileError::unsupported(dialect, "offset pagination"));
                }
                let Some(n) = limit else {
                    return Ok(parts.render());
                };
                Ok(parts.render_top(n))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARTS: SelectParts<'static> = SelectParts {
        distinct: false,
        columns: "*",
        body: " FROM t",
        order_by: Some("id DESC"),
    };

    const UNORDERED: SelectParts<'static> = SelectParts {
        distinct: false,
        columns: "*",
        body: " FROM t",
        order_by: None,
    };

    fn suffix(strategy: LimitOffset, limit: Option<u64>, offset: Option<u64>) -> String {
        strategy
            .render_suffix("test", limit, offset)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_standard_forms() {
        assert_eq!(suffix(LimitOffset::Standard, Some(10), None), "LIMIT 10");
        assert_eq!(suffix(LimitOffset::Standard, None, Some(20)), "OFFSET 20");
        assert_eq!(
            suffix(LimitOffset::Standard, Some(10), Some(20)),
            "LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_mysql_forms() {
        assert_eq!(suffix(LimitOffset::MySql, Some(10), None), "LIMIT 10");
        assert_eq!(
            suffix(LimitOffset::MySql, None, Some(20)),
            "LIMIT 20, 18446744073709551615"
        );
        assert_eq!(suffix(LimitOffset::MySql, Some(10), Some(20)), "LIMIT 20, 10");
    }

    #[test]
    fn test_sqlite_offset_only() {
        assert_eq!(suffix(LimitOffset::Sqlite, None, Some(5)), "LIMIT -1 OFFSET 5");
    }

    #[test]
    fn test_offset_fetch_forms() {
        assert_eq!(
            suffix(LimitOffset::OffsetFetch, Some(10), None),
            "OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"
        );
        assert_eq!(suffix(LimitOffset::OffsetFetch, None, Some(20)), "OFFSET 20 ROWS");
    }

    #[test]
    fn test_limit_zero_is_kept() {
        assert_eq!(suffix(LimitOffset::Standard, Some(0), None), "LIMIT 0");
        assert_eq!(
            LimitOffset::SqlServer
                .apply("sqlserver", &UNORDERED, Some(0), None)
                .unwrap(),
            "SELECT TOP 0 * FROM t"
        );
    }

    #[test]
    fn test_limit_zero_guarded() {
        for strategy in [LimitOffset::OffsetFetch, LimitOffset::SkipFirst, LimitOffset::Top] {
            assert_eq!(
                strategy.apply("test", &PARTS, Some(0), None).unwrap(),
                "SELECT * FROM (SELECT * FROM t) TEMP_EMPTY WHERE 1 = 0"
            );
        }
        assert!(LimitOffset::OffsetFetch
            .render_suffix("derby", Some(0), Some(10))
            .is_err());
    }

    #[test]
    fn test_sqlserver_distinct_needs_order() {
        let distinct = SelectParts {
            distinct: true,
            ..UNORDERED
        };
        assert_eq!(
            LimitOffset::SqlServer.apply("sqlserver", &distinct, Some(10), None),
            Err(CompileError::unsupported(
                "sqlserver",
                "DISTINCT pagination without ORDER BY"
            ))
        );
        assert_eq!(
            LimitOffset::SqlServer
                .apply("sqlserver", &distinct, Some(0), None)
                .unwrap(),
            "SELECT DISTINCT TOP 0 * FROM t"
        );
        let ordered = SelectParts {
            distinct: true,
            ..PARTS
        };
        assert_eq!(
            LimitOffset::SqlServer
                .apply("sqlserver", &ordered, Some(10), None)
                .unwrap(),
            "SELECT DISTINCT * FROM t ORDER BY id DESC OFFSET 0 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn test_no_pagination() {
        assert_eq!(LimitOffset::Standard.render_suffix("test", None, None), Ok(None));
        assert_eq!(
            LimitOffset::Rownum.apply("oracle", &PARTS, None, None).unwrap(),
            "SELECT * FROM t ORDER BY id DESC"
        );
    }

    #[test]
    fn test_rewrap_has_no_suffix() {
        assert!(LimitOffset::Rownum.render_suffix("oracle", Some(1), None).is_err());
        assert!(!LimitOffset::Top.applies_as_suffix());
        assert!(LimitOffset::SqlServer.applies_as_suffix());
    }

    #[test]
    fn test_sqlserver_adds_order_by() {
        assert_eq!(
            LimitOffset::SqlServer
                .apply("sqlserver", &UNORDERED, Some(10), Some(20))
                .unwrap(),
            "SELECT * FROM t ORDER BY CURRENT_TIMESTAMP OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn test_rownum() {
        assert_eq!(
            LimitOffset::Rownum
                .apply("oracle", &PARTS, Some(10), Some(20))
                .unwrap(),
            "SELECT * FROM (SELECT TEMP_DATAS.*, ROWNUM RN FROM (SELECT * FROM t ORDER BY id DESC) TEMP_DATAS WHERE ROWNUM <= 30) WHERE RN > 20"
        );
        assert_eq!(
            LimitOffset::Rownum.apply("oracle", &PARTS, None, Some(20)).unwrap(),
            "SELECT * FROM (SELECT TEMP_DATAS.*, ROWNUM RN FROM (SELECT * FROM t ORDER BY id DESC) TEMP_DATAS) WHERE RN > 20"
        );
    }

    #[test]
    fn test_row_number() {
        assert_eq!(
            LimitOffset::RowNumber
                .apply("sqlserver-2005", &PARTS, Some(10), Some(20))
                .unwrap(),
            "SELECT * FROM (SELECT *, ROW_NUMBER() OVER (ORDER BY id DESC) AS __rn FROM t) TEMP_PAGE WHERE __rn > 20 AND __rn <= 30"
        );
        let distinct = SelectParts {
            distinct: true,
            ..PARTS
        };
        assert!(LimitOffset::RowNumber
            .apply("sqlserver-2005", &distinct, Some(10), None)
            .is_err());
    }

    #[test]
    fn test_skip_first() {
        assert_eq!(
            LimitOffset::SkipFirst
                .apply("informix", &UNORDERED, Some(10), Some(20))
                .unwrap(),
            "SELECT SKIP 20 FIRST 10 * FROM t"
        );
        assert_eq!(
            LimitOffset::SkipFirst
                .apply("informix", &UNORDERED, Some(10), None)
                .unwrap(),
            "SELECT FIRST 10 * FROM t"
        );
    }

    #[test]
    fn test_top() {
        let distinct = SelectParts {
            distinct: true,
            ..UNORDERED
        };
        assert_eq!(
            LimitOffset::Top.apply("sybase", &distinct, Some(5), None).unwrap(),
            "SELECT DISTINCT TOP 5 * FROM t"
        );
        assert_eq!(
            LimitOffset::Top.apply("sybase", &UNORDERED, Some(5), Some(10)),
            Err(CompileError::unsupported("sybase", "offset pagination"))
        );
    }
}
