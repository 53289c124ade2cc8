//! Write payloads and query results for the store.
//!
//! # Responsibility
//! - Carry column/value maps for insert and update.
//! - Carry materialized query rows tagged with their source resource.
//!
//! # Invariants
//! - A field map distinguishes an absent column from an explicit NULL.
//! - A row set remembers the resource it observed, so callers can
//!   subscribe to changes for that resource.

use crate::store::Resource;
use std::collections::BTreeMap;

pub use rusqlite::types::Value;

/// Column-to-value map used by insert and update.
///
/// Absent columns are left untouched by an update; a column explicitly set
/// to `Value::Null` is a write of NULL and is validated as such.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: BTreeMap<String, Value>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a raw value for a column, replacing any previous one.
    pub fn set(&mut self, column: &str, value: Value) {
        self.entries.insert(column.to_string(), value);
    }

    pub fn set_text(&mut self, column: &str, value: impl Into<String>) {
        self.set(column, Value::Text(value.into()));
    }

    pub fn set_int(&mut self, column: &str, value: i64) {
        self.set(column, Value::Integer(value));
    }

    /// Records an explicit NULL for a column.
    pub fn set_null(&mut self, column: &str) {
        self.set(column, Value::Null);
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.entries.contains_key(column)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates entries in stable column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(column, value)| (column.as_str(), value))
    }
}

/// Materialized query result.
///
/// Unlike a live database cursor, the rows are owned data; the resource
/// tag is what lets a caller watch for changes and re-run the query.
#[derive(Debug, Clone)]
pub struct RowSet {
    resource: Resource,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub(crate) fn new(resource: Resource, columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            resource,
            columns,
            rows,
        }
    }

    /// The resource this row set observed when it was produced.
    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Projected column names, in query order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw row values, one slice per row.
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Looks up one cell by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let column_index = self.columns.iter().position(|name| name == column)?;
        self.rows.get(row)?.get(column_index)
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldMap, RowSet, Value};
    use crate::store::Resource;

    #[test]
    fn field_map_distinguishes_absent_from_explicit_null() {
        let mut values = FieldMap::new();
        values.set_null("make");

        assert!(values.contains("make"));
        assert!(matches!(values.get("make"), Some(Value::Null)));
        assert!(!values.contains("model"));
        assert!(values.get("model").is_none());
    }

    #[test]
    fn field_map_set_replaces_previous_value() {
        let mut values = FieldMap::new();
        values.set_text("plate", "ABC123");
        values.set_text("plate", "XYZ999");

        assert_eq!(values.len(), 1);
        assert!(matches!(values.get("plate"), Some(Value::Text(text)) if text == "XYZ999"));
    }

    #[test]
    fn row_set_cell_lookup_by_name() {
        let rows = RowSet::new(
            Resource::Item(1),
            vec!["_id".to_string(), "make".to_string()],
            vec![vec![Value::Integer(1), Value::Text("Ford".to_string())]],
        );

        assert_eq!(rows.resource(), Resource::Item(1));
        assert_eq!(rows.len(), 1);
        assert!(matches!(rows.value(0, "make"), Some(Value::Text(text)) if text == "Ford"));
        assert!(rows.value(0, "plate").is_none());
        assert!(rows.value(1, "make").is_none());
    }
}
