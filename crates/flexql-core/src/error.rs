//! Error types for statement compilation.

use thiserror::Error;

/// Errors raised while building descriptions or compiling statements.
///
/// Every error is detected before any SQL text is handed back; the engine
/// never returns a partially rendered statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Table metadata could not be resolved and the strict policy is active.
    #[error("no table metadata resolved for `{entity}`")]
    MetadataResolution {
        /// Entity or table identifier that failed to resolve.
        entity: String,
    },

    /// A predicate leaf was built with the wrong number of bound values.
    #[error("operator {operator} expects {expected} bound value(s), got {actual}")]
    MalformedPredicateArity {
        /// Operator keyword.
        operator: &'static str,
        /// Human-readable arity requirement.
        expected: String,
        /// Number of values supplied.
        actual: usize,
    },

    /// A batch row does not carry the same columns as the first row.
    #[error("batch row {row} does not match the first row's columns at `{column}`")]
    BatchColumnMismatch {
        /// Zero-based index of the offending row.
        row: usize,
        /// Column that is missing from (or extra in) the row.
        column: String,
    },

    /// The dialect has no way to express the requested construct.
    #[error("{feature} is unsupported for dialect {dialect}")]
    UnsupportedDialectFeature {
        /// Dialect name.
        dialect: &'static str,
        /// Description of the construct.
        feature: String,
    },

    /// A batch operation received no rows.
    #[error("batch contains no rows")]
    EmptyBatch,

    /// An INSERT or UPDATE has no columns to write.
    #[error("statement has no columns to write")]
    EmptyAssignments,

    /// An entity statement needs a primary-key value that is absent.
    #[error("entity `{entity}` is missing a value for primary key `{column}`")]
    MissingPrimaryKey {
        /// Entity identifier.
        entity: String,
        /// Primary-key column.
        column: String,
    },

    /// A by-id call supplied the wrong number of key values.
    #[error("entity `{entity}` has {expected} primary key column(s), got {actual} id value(s)")]
    IdArity {
        /// Entity identifier.
        entity: String,
        /// Number of primary-key columns.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// A database product tag is not in the registry.
    #[error("unknown database type: {0}")]
    UnknownDbType(String),
}

/// Result type alias for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;

impl CompileError {
    pub(crate) fn unsupported(dialect: &'static str, feature: impl Into<String>) -> Self {
        Self::UnsupportedDialectFeature {
            dialect,
            feature: feature.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message() {
        let err = CompileError::unsupported("sybase", "offset pagination");
        assert_eq!(
            err.to_string(),
            "offset pagination is unsupported for dialect sybase"
        );
    }

    #[test]
    fn test_arity_message() {
        let err = CompileError::MalformedPredicateArity {
            operator: "BETWEEN",
            expected: String::from("exactly 2"),
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "operator BETWEEN expects exactly 2 bound value(s), got 3"
        );
    }
}
