//! Rows and equality filters.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Value;
use crate::constants::ID_COLUMN;

/// Column assignments of an `update`, in the order they were written.
pub type Assignments = IndexMap<String, Value>;

/// A single row: column name to value, in schema order.
///
/// Every row stored by the engine carries an `ID` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: IndexMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a row holding only the given `ID`.
    pub fn with_id(id: i64) -> Self {
        let mut row = Self::new();
        row.set(ID_COLUMN, Value::Integer(id));
        row
    }

    /// Returns the row's `ID`, if present and an integer.
    pub fn id(&self) -> Option<i64> {
        self.get(ID_COLUMN).and_then(Value::as_integer)
    }

    /// Returns the value of a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Sets a column, keeping its position if it already exists.
    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        self.fields.insert(column.into(), value);
    }

    /// Iterates over `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if this row satisfies every predicate of the filter.
    pub fn matches(&self, filter: &Filter) -> bool {
        filter
            .iter()
            .all(|(column, expected)| self.get(column) == Some(expected))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A conjunctive equality filter (`col = value AND ...`).
///
/// Predicates are kept sorted by column name, so two filters with the same
/// predicates compare and hash equal regardless of construction order. An
/// empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Filter {
    predicates: BTreeMap<String, Value>,
}

impl Filter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filter with a single `column = value` predicate.
    pub fn equals(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().and(column, value)
    }

    /// Adds a predicate, replacing any existing one on the same column.
    #[must_use]
    pub fn and(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.insert(column.into(), value.into());
        self
    }

    /// Returns the expected value for a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.predicates.get(column)
    }

    /// Iterates over predicates sorted by column name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.predicates.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of predicates.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns true if the filter has no predicates.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (column, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" and ")?;
            }
            write!(f, "{column} = {}", value.to_literal())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> Row {
        [
            ("ID", Value::Integer(1)),
            ("name", Value::from("Ann")),
            ("active", Value::Boolean(true)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_row_fields_keep_order() {
        let mut row = ann();
        row.set("name", Value::from("Bob"));

        let columns: Vec<&str> = row.iter().map(|(k, _)| k).collect();
        assert_eq!(columns, vec!["ID", "name", "active"]);
        assert_eq!(row.id(), Some(1));
        assert_eq!(row.get("name"), Some(&Value::from("Bob")));
    }

    #[test]
    fn test_filter_matching() {
        let row = ann();

        assert!(row.matches(&Filter::new()));
        assert!(row.matches(&Filter::equals("name", "Ann")));
        assert!(row.matches(&Filter::equals("ID", 1).and("active", true)));
        assert!(!row.matches(&Filter::equals("name", "Bob")));
        assert!(!row.matches(&Filter::equals("missing", 1)));
        // Booleans never equal integers.
        assert!(!row.matches(&Filter::equals("active", 1)));
    }

    #[test]
    fn test_filter_normalized_order() {
        let a = Filter::equals("b", 2).and("a", 1);
        let b = Filter::equals("a", 1).and("b", 2);
        assert_eq!(a, b);

        let columns: Vec<&str> = a.iter().map(|(k, _)| k).collect();
        assert_eq!(columns, vec!["a", "b"]);
        assert_eq!(a.to_string(), "a = 1 and b = 2");
    }

    #[test]
    fn test_row_json_shape() {
        let json = serde_json::to_string(&ann()).unwrap();
        assert_eq!(json, r#"{"ID":1,"name":"Ann","active":true}"#);

        let back: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ann());
    }
}
