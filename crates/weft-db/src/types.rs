//! Database value types and conversions.

use crate::DbError;
use base64::Engine;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// A database value that can be used as a parameter or result.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Integer value.
    Integer(i64),
    /// Real/float value.
    Real(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl Value {
    /// Try to get the value as an i64.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(f) => Some(*f as i64),
            _ => None,
        }
    }

    /// Try to get the value as an f64.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get the value as a string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as bytes.
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            Value::Text(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Check if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[cfg(target_arch = "wasm32")]
    pub(crate) fn to_spin(&self) -> spin_sdk::sqlite::Value {
        match self {
            Value::Null => spin_sdk::sqlite::Value::Null,
            Value::Integer(i) => spin_sdk::sqlite::Value::Integer(*i),
            Value::Real(f) => spin_sdk::sqlite::Value::Real(*f),
            Value::Text(s) => spin_sdk::sqlite::Value::Text(s.clone()),
            Value::Blob(b) => spin_sdk::sqlite::Value::Blob(b.clone()),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub(crate) fn from_spin(value: &spin_sdk::sqlite::Value) -> Self {
        match value {
            spin_sdk::sqlite::Value::Null => Value::Null,
            spin_sdk::sqlite::Value::Integer(i) => Value::Integer(*i),
            spin_sdk::sqlite::Value::Real(f) => Value::Real(*f),
            spin_sdk::sqlite::Value::Text(s) => Value::Text(s.clone()),
            spin_sdk::sqlite::Value::Blob(b) => Value::Blob(b.clone()),
        }
    }
}

// Conversions from Rust types to Value
impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Real(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(if v { 1 } else { 0 })
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// A row from a query result.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Create a new row from columns and values.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Get a value by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Get a value by column index.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get all values.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Convert the row to a HashMap.
    pub fn to_map(&self) -> HashMap<String, Value> {
        self.columns
            .iter()
            .zip(self.values.iter())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Try to deserialize the row into a type.
    ///
    /// Goes through a serde_json map so any `Deserialize` struct whose
    /// field names match the selected columns works unchanged.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, DbError> {
        let map: serde_json::Map<String, serde_json::Value> = self
            .columns
            .iter()
            .zip(self.values.iter())
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect();

        let json = serde_json::Value::Object(map);
        serde_json::from_value(json).map_err(|e| DbError::DeserializeError(e.to_string()))
    }
}

/// Query result containing rows.
#[derive(Debug, Clone)]
pub struct QueryResult {
    /// The column names.
    pub columns: Vec<String>,
    /// The rows.
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Create a new query result.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the result is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the first row.
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Iterate over the rows.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Deserialize all rows into a vector of a type.
    pub fn deserialize_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, DbError> {
        self.rows.iter().map(|row| row.deserialize()).collect()
    }
}

/// Convert a Value to a serde_json::Value.
///
/// Blobs are passed through as UTF-8 text when possible, otherwise
/// base64-encoded.
fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Real(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Blob(b) => String::from_utf8(b.clone())
            .map(serde_json::Value::String)
            .unwrap_or_else(|_| {
                serde_json::Value::String(base64::engine::general_purpose::STANDARD.encode(b))
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn value_conversions() {
        assert_eq!(Value::from(42), Value::Integer(42));
        assert_eq!(Value::from(true), Value::Integer(1));
        assert_eq!(Value::from(false), Value::Integer(0));
        assert_eq!(Value::from("hello"), Value::Text("hello".to_string()));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(5i64)), Value::Integer(5));
    }

    #[test]
    fn integer_coercion_from_real() {
        assert_eq!(Value::Real(3.7).as_integer(), Some(3));
        assert_eq!(Value::Integer(9).as_real(), Some(9.0));
        assert_eq!(Value::Text("x".into()).as_integer(), None);
    }

    #[test]
    fn row_get_by_column() {
        let row = Row::new(
            vec!["id".into(), "name".into()],
            vec![Value::Integer(1), Value::Text("Indigo Stole".into())],
        );
        assert_eq!(row.get("name").and_then(|v| v.as_text()), Some("Indigo Stole"));
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn row_deserializes_into_struct() {
        #[derive(Deserialize)]
        struct ItemRow {
            id: String,
            quantity: i64,
            unit_price: i64,
        }

        let row = Row::new(
            vec!["id".into(), "quantity".into(), "unit_price".into()],
            vec![
                Value::Text("item_1".into()),
                Value::Integer(2),
                Value::Integer(50000),
            ],
        );
        let item: ItemRow = row.deserialize().unwrap();
        assert_eq!(item.id, "item_1");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.unit_price, 50000);
    }

    #[test]
    fn row_deserialize_handles_nullable_columns() {
        #[derive(Deserialize)]
        struct VariantRow {
            id: String,
            variant_id: Option<String>,
        }

        let row = Row::new(
            vec!["id".into(), "variant_id".into()],
            vec![Value::Text("item_2".into()), Value::Null],
        );
        let item: VariantRow = row.deserialize().unwrap();
        assert_eq!(item.variant_id, None);
    }
}
