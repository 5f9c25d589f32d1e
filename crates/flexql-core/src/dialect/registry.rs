//! Fixed mapping from database product to dialect.

use std::fmt;
use std::str::FromStr;

use crate::error::CompileError;

use super::{BatchStyle, Dialect, KeywordWrap, LimitOffset};

/// Database products with a built-in dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbType {
    MySql,
    MariaDb,
    ClickHouse,
    PostgreSql,
    KingBase,
    H2,
    Hsql,
    OpenGauss,
    Sqlite,
    Oracle,
    Dm,
    Oracle12c,
    Db2,
    Derby,
    SqlServer,
    SqlServer2005,
    Informix,
    Sybase,
}

impl DbType {
    /// Every registered product, in display order.
    pub const ALL: [Self; 18] = [
        Self::MySql,
        Self::MariaDb,
        Self::ClickHouse,
        Self::PostgreSql,
        Self::KingBase,
        Self::H2,
        Self::Hsql,
        Self::OpenGauss,
        Self::Sqlite,
        Self::Oracle,
        Self::Dm,
        Self::Oracle12c,
        Self::Db2,
        Self::Derby,
        Self::SqlServer,
        Self::SqlServer2005,
        Self::Informix,
        Self::Sybase,
    ];

    /// Registry tag, e.g. `sqlserver-2005`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::MariaDb => "mariadb",
            Self::ClickHouse => "clickhouse",
            Self::PostgreSql => "postgresql",
            Self::KingBase => "kingbase",
            Self::H2 => "h2",
            Self::Hsql => "hsql",
            Self::OpenGauss => "opengauss",
            Self::Sqlite => "sqlite",
            Self::Oracle => "oracle",
            Self::Dm => "dm",
            Self::Oracle12c => "oracle-12c",
            Self::Db2 => "db2",
            Self::Derby => "derby",
            Self::SqlServer => "sqlserver",
            Self::SqlServer2005 => "sqlserver-2005",
            Self::Informix => "informix",
            Self::Sybase => "sybase",
        }
    }

    /// Returns the dialect for this product.
    #[must_use]
    pub const fn dialect(self) -> Dialect {
        let base = Dialect::custom(self.name());
        match self {
            Self::MySql | Self::MariaDb | Self::ClickHouse => base
                .with_wrap(KeywordWrap::Backtick)
                .with_limit(LimitOffset::MySql)
                .with_max_batch_params(65535),
            Self::PostgreSql | Self::KingBase | Self::H2 | Self::Hsql | Self::OpenGauss => {
                base.with_max_batch_params(65535)
            }
            Self::Sqlite => base
                .with_limit(LimitOffset::Sqlite)
                .with_max_batch_params(999),
            Self::Oracle | Self::Dm => base
                .with_limit(LimitOffset::Rownum)
                .with_batch_style(BatchStyle::InsertAll)
                .with_max_batch_params(65535)
                .with_max_batch_rows(1000)
                .with_table_alias_keyword(false),
            Self::Oracle12c => base
                .with_limit(LimitOffset::OffsetFetch)
                .with_batch_style(BatchStyle::InsertAll)
                .with_max_batch_params(65535)
                .with_table_alias_keyword(false),
            Self::Db2 | Self::Derby => base
                .with_limit(LimitOffset::OffsetFetch)
                .with_max_batch_params(65535),
            Self::SqlServer => base
                .with_wrap(KeywordWrap::Bracket)
                .with_limit(LimitOffset::SqlServer)
                .with_max_batch_params(2100)
                .with_max_batch_rows(1000),
            Self::SqlServer2005 => base
                .with_wrap(KeywordWrap::Bracket)
                .with_limit(LimitOffset::RowNumber)
                .with_max_batch_params(2100)
                .with_max_batch_rows(1000),
            Self::Informix => base
                .with_wrap(KeywordWrap::None)
                .with_limit(LimitOffset::SkipFirst)
                .with_max_batch_rows(1),
            Self::Sybase => base
                .with_wrap(KeywordWrap::Bracket)
                .with_limit(LimitOffset::Top)
                .with_max_batch_params(2048)
                .with_max_batch_rows(1),
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DbType {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|db| db.name() == wanted)
            .ok_or_else(|| CompileError::UnknownDbType(String::from(s)))
    }
}

impl From<DbType> for Dialect {
    fn from(db: DbType) -> Self {
        db.dialect()
    }
}
