//! Page requests.

use crate::compiler::CompiledStatement;

/// A 1-based page of `size` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    /// Page number, starting at 1. Zero is treated as the first page.
    pub number: u64,
    /// Rows per page.
    pub size: u64,
    /// Allow the `SELECT COUNT(*)` rewrite when it is safe.
    pub optimize_count: bool,
}

impl PageRequest {
    /// Creates a page request with count optimization enabled.
    #[must_use]
    pub const fn new(number: u64, size: u64) -> Self {
        Self {
            number,
            size,
            optimize_count: true,
        }
    }

    /// Disables the count rewrite; the count always wraps the query.
    #[must_use]
    pub const fn without_count_optimization(mut self) -> Self {
        self.optimize_count = false;
        self
    }

    /// Rows skipped before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.number.saturating_sub(1).saturating_mul(self.size)
    }

    /// Number of pages needed for `total_rows` rows.
    #[must_use]
    pub const fn total_pages(&self, total_rows: u64) -> u64 {
        if self.size == 0 {
            0
        } else {
            total_rows.div_ceil(self.size)
        }
    }
}

/// The two statements of a paginated read.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedStatements {
    /// Fetches the rows of the page.
    pub records: CompiledStatement,
    /// Counts all matching rows.
    pub count: CompiledStatement,
}
