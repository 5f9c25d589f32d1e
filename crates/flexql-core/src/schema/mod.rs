//! Table metadata lookup.
//!
//! The compiler never reflects over entity types. It asks a
//! [`MetadataProvider`] for the physical table and its columns, and how that
//! provider sources its data is up to the caller.

use std::collections::HashMap;

/// Trait for statically known table definitions.
///
/// Lets a type describe its table with associated constants, which
/// [`TableMeta::of`] turns into runtime metadata.
pub trait Table {
    /// The SQL table name.
    const NAME: &'static str;

    /// List of all column names, in declaration order.
    const COLUMNS: &'static [&'static str];

    /// The primary key column name, if any.
    const PRIMARY_KEY: Option<&'static str>;
}

/// How a primary-key value is produced on insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum KeyStrategy {
    /// The caller supplies the value.
    #[default]
    None,
    /// The database generates the value; the column is left out of INSERTs
    /// that do not set it.
    Auto,
    /// A raw SQL expression, such as `nextval('seq_account')`, inlined into
    /// VALUES.
    Sequence(String),
}

/// Metadata for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnMeta {
    /// Column name.
    pub name: String,
    /// Part of the primary key.
    #[cfg_attr(feature = "serde", serde(default))]
    pub primary_key: bool,
    /// Key generation strategy; only meaningful for key columns.
    #[cfg_attr(feature = "serde", serde(default))]
    pub key_strategy: KeyStrategy,
}

impl ColumnMeta {
    /// A regular column.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: false,
            key_strategy: KeyStrategy::None,
        }
    }

    /// A primary-key column.
    #[must_use]
    pub fn key(name: impl Into<String>, strategy: KeyStrategy) -> Self {
        Self {
            name: name.into(),
            primary_key: true,
            key_strategy: strategy,
        }
    }
}

/// Metadata for one entity's table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableMeta {
    /// Physical table name. `None` means the name could not be resolved.
    #[cfg_attr(feature = "serde", serde(default))]
    pub table: Option<String>,
    /// Schema qualifier.
    #[cfg_attr(feature = "serde", serde(default))]
    pub schema: Option<String>,
    /// Columns in declaration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub columns: Vec<ColumnMeta>,
}

impl TableMeta {
    /// Metadata for a named table.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            schema: None,
            columns: vec![],
        }
    }

    /// Metadata with no table name.
    #[must_use]
    pub const fn unresolved(columns: Vec<ColumnMeta>) -> Self {
        Self {
            table: None,
            schema: None,
            columns,
        }
    }

    /// Sets the schema qualifier.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: ColumnMeta) -> Self {
        self.columns.push(column);
        self
    }

    /// Builds metadata from a [`Table`] implementation. The key column, if
    /// any, is database-generated.
    #[must_use]
    pub fn of<T: Table>() -> Self {
        Self {
            table: Some(String::from(T::NAME)),
            schema: None,
            columns: T::COLUMNS
                .iter()
                .map(|&name| {
                    if T::PRIMARY_KEY == Some(name) {
                        ColumnMeta::key(name, KeyStrategy::Auto)
                    } else {
                        ColumnMeta::new(name)
                    }
                })
                .collect(),
        }
    }

    /// Primary-key columns in declaration order.
    pub fn primary_keys(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.columns.iter().filter(|c| c.primary_key)
    }
}

/// Resolves an entity identifier to table metadata.
///
/// Implementations must be pure lookups: compilation may run on many
/// threads at once.
pub trait MetadataProvider: Send + Sync {
    /// Returns the metadata for `entity`, or `None` when it is unknown.
    fn table(&self, entity: &str) -> Option<TableMeta>;
}

/// A provider that knows no entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataProvider for NoMetadata {
    fn table(&self, _entity: &str) -> Option<TableMeta> {
        None
    }
}

/// A provider backed by a fixed map.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    tables: HashMap<String, TableMeta>,
}

impl StaticMetadata {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers metadata for an entity.
    #[must_use]
    pub fn with(mut self, entity: impl Into<String>, meta: TableMeta) -> Self {
        self.tables.insert(entity.into(), meta);
        self
    }

    /// Registers a [`Table`] implementation under its table name.
    #[must_use]
    pub fn with_table<T: Table>(self) -> Self {
        self.with(T::NAME, TableMeta::of::<T>())
    }
}

impl MetadataProvider for StaticMetadata {
    fn table(&self, entity: &str) -> Option<TableMeta> {
        self.tables.get(entity).cloned()
    }
}

impl<S: std::hash::BuildHasher + Send + Sync> MetadataProvider for HashMap<String, TableMeta, S> {
    fn table(&self, entity: &str) -> Option<TableMeta> {
        self.get(entity).cloned()
    }
}
