//! Untyped row records.

use indexmap::IndexMap;

use crate::value::{SqlValue, ToSqlValue};

/// Column values keyed by column name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Row(IndexMap<String, SqlValue>);

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Adds a column value, returning the row.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl ToSqlValue) -> Self {
        self.set(column, value);
        self
    }

    /// Sets a column value. An existing column keeps its position.
    pub fn set(&mut self, column: impl Into<String>, value: impl ToSqlValue) {
        self.0.insert(column.into(), value.to_sql_value());
    }

    /// Returns the value of a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.0.get(column)
    }

    /// Returns the stored column name and value.
    #[must_use]
    pub fn get_key_value(&self, column: &str) -> Option<(&str, &SqlValue)> {
        self.0.get_key_value(column).map(|(k, v)| (k.as_str(), v))
    }

    /// Returns true when the row has the column, even if its value is NULL.
    #[must_use]
    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Column/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: ToSqlValue> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_sql_value()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_insertion_order() {
        let row = Row::new()
            .with("user_name", "michael")
            .with("age", 18)
            .with("birthday", SqlValue::Null);
        assert_eq!(
            row.columns().collect::<Vec<_>>(),
            vec!["user_name", "age", "birthday"]
        );
        assert!(row.contains("birthday"));
        assert_eq!(row.get("age"), Some(&SqlValue::Int(18)));
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut row = Row::new().with("a", 1).with("b", 2);
        row.set("a", 3);
        assert_eq!(
            row.iter().collect::<Vec<_>>(),
            vec![("a", &SqlValue::Int(3)), ("b", &SqlValue::Int(2))]
        );
    }

    #[test]
    fn test_from_iter() {
        let row: Row = [("id", 1), ("age", 2)].into_iter().collect();
        assert_eq!(row.len(), 2);
    }
}
