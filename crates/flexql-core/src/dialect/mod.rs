//! SQL dialect configuration.
//!
//! A [`Dialect`] is a plain value bundling the strategies that differ
//! between database products. It holds no state and is `Copy`, so one
//! instance can be shared by any number of concurrent compilations.

mod limit;
mod registry;
mod wrap;

pub use limit::{LimitOffset, SelectParts};
pub use registry::DbType;
pub use wrap::KeywordWrap;

/// How multi-row inserts are spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchStyle {
    /// `INSERT INTO t(cols) VALUES (..), (..)`
    MultiValues,
    /// `INSERT ALL INTO t(cols) VALUES (..) INTO t(cols) VALUES (..) SELECT 1 FROM DUAL`
    InsertAll,
}

/// SQL generation policy for one database product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dialect {
    name: &'static str,
    wrap: KeywordWrap,
    limit: LimitOffset,
    batch_style: BatchStyle,
    max_batch_params: Option<usize>,
    max_batch_rows: Option<usize>,
    table_alias_keyword: bool,
}

impl Dialect {
    /// Starts a dialect with standard behavior: double-quoted identifiers,
    /// `LIMIT n OFFSET m`, multi-row VALUES and no batch limits.
    #[must_use]
    pub const fn custom(name: &'static str) -> Self {
        Self {
            name,
            wrap: KeywordWrap::DoubleQuote,
            limit: LimitOffset::Standard,
            batch_style: BatchStyle::MultiValues,
            max_batch_params: None,
            max_batch_rows: None,
            table_alias_keyword: true,
        }
    }

    /// Sets the identifier quoting policy.
    #[must_use]
    pub const fn with_wrap(mut self, wrap: KeywordWrap) -> Self {
        self.wrap = wrap;
        self
    }

    /// Sets the pagination strategy.
    #[must_use]
    pub const fn with_limit(mut self, limit: LimitOffset) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the multi-row insert style.
    #[must_use]
    pub const fn with_batch_style(mut self, style: BatchStyle) -> Self {
        self.batch_style = style;
        self
    }

    /// Caps the number of bound parameters per batch statement.
    #[must_use]
    pub const fn with_max_batch_params(mut self, max: usize) -> Self {
        self.max_batch_params = Some(max);
        self
    }

    /// Caps the number of rows per batch statement.
    #[must_use]
    pub const fn with_max_batch_rows(mut self, max: usize) -> Self {
        self.max_batch_rows = Some(max);
        self
    }

    /// Sets whether table aliases are introduced with `AS`.
    #[must_use]
    pub const fn with_table_alias_keyword(mut self, enabled: bool) -> Self {
        self.table_alias_keyword = enabled;
        self
    }

    /// Dialect name, used in log fields and error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Identifier quoting policy.
    #[must_use]
    pub const fn wrap_policy(&self) -> KeywordWrap {
        self.wrap
    }

    /// Pagination strategy.
    #[must_use]
    pub const fn limit_strategy(&self) -> LimitOffset {
        self.limit
    }

    /// Multi-row insert style.
    #[must_use]
    pub const fn batch_style(&self) -> BatchStyle {
        self.batch_style
    }

    /// Maximum bound parameters per batch statement.
    #[must_use]
    pub const fn max_batch_params(&self) -> Option<usize> {
        self.max_batch_params
    }

    /// Maximum rows per batch statement.
    #[must_use]
    pub const fn max_batch_rows(&self) -> Option<usize> {
        self.max_batch_rows
    }

    /// Whether table aliases are introduced with `AS`.
    #[must_use]
    pub const fn table_alias_keyword(&self) -> bool {
        self.table_alias_keyword
    }

    /// Quotes an identifier with this dialect's policy.
    #[must_use]
    pub fn wrap(&self, ident: &str) -> String {
        self.wrap.wrap(ident)
    }

    /// Renders a table alias, with or without `AS`.
    #[must_use]
    pub fn alias_clause(&self, alias: &str) -> String {
        if self.table_alias_keyword {
            format!(" AS {}", self.wrap(alias))
        } else {
            format!(" {}", self.wrap(alias))
        }
    }
}
