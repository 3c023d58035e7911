//! A single row read from a source table.

use crate::domain::errors::{ImportError, Result};
use crate::domain::value::{Attributes, RecordKey, Value};
use serde::{Deserialize, Serialize};

/// Name of the field holding a row's source-system identifier.
pub const ID_FIELD: &str = "id";

/// Field name to value map, in source column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: Attributes,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// The row's source identifier. `table` is only used for the error message.
    pub fn id(&self, table: &str) -> Result<RecordKey> {
        self.fields
            .get(ID_FIELD)
            .ok_or_else(|| ImportError::MissingField {
                table: table.to_string(),
                field: ID_FIELD.to_string(),
            })?
            .to_key()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Replaces the value of an existing field in place, or appends a new one.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Attributes> for Row {
    fn from(fields: Attributes) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_lookup() {
        let row: Row = [("id", Value::from("12")), ("name", Value::from("A"))]
            .into_iter()
            .collect();
        assert_eq!(row.id("users").unwrap(), RecordKey::Int(12));

        let row: Row = [("name", "A")].into_iter().collect();
        assert!(matches!(
            row.id("users"),
            Err(ImportError::MissingField { field, .. }) if field == "id"
        ));
    }

    #[test]
    fn test_set_keeps_column_position() {
        let mut row: Row = [("id", Value::Int(1)), ("a_id", Value::Int(1)), ("x", Value::Int(2))]
            .into_iter()
            .collect();
        row.set("a_id", 99_i64);
        let names: Vec<&str> = row.fields().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["id", "a_id", "x"]);
        assert_eq!(row.get("a_id"), Some(&Value::Int(99)));
    }
}
