//! Stored rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::value::Value;

/// A row read from an entity table.
///
/// Fields appear in the entity's declaration order and every declared
/// field is present; NULL columns hold [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    entity: String,
    id: i64,
    fields: Vec<(String, Value)>,
}

impl Row {
    /// Create a row.
    pub fn new(entity: impl Into<String>, id: i64, fields: Vec<(String, Value)>) -> Self {
        Self {
            entity: entity.into(),
            id,
            fields,
        }
    }

    /// Entity the row belongs to.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Primary key.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// All field values in declaration order.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Consume the row, returning its field values.
    pub fn into_fields(self) -> Vec<(String, Value)> {
        self.fields
    }

    /// Get a field value by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
    }

    /// Check whether a field is NULL or absent.
    pub fn is_null(&self, field: &str) -> bool {
        self.get(field).map_or(true, Value::is_null)
    }

    /// Get an integer field.
    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }

    /// Get a float field.
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }

    /// Get a boolean field.
    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    /// Get a string field.
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Get a decimal field.
    pub fn get_decimal(&self, field: &str) -> Option<Decimal> {
        self.get(field).and_then(Value::as_decimal)
    }

    /// Get a timestamp field.
    pub fn get_timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get(field).and_then(Value::as_timestamp)
    }

    /// Get a UUID field.
    pub fn get_uuid(&self, field: &str) -> Option<Uuid> {
        self.get(field).and_then(Value::as_uuid)
    }

    pub(crate) fn set(&mut self, field: &str, value: Value) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getters() {
        let row = Row::new(
            "Category",
            3,
            vec![
                ("id".into(), Value::Int(3)),
                ("name".into(), Value::from("Shoes")),
                ("is_active".into(), Value::Bool(false)),
                ("parent".into(), Value::Null),
            ],
        );

        assert_eq!(row.entity(), "Category");
        assert_eq!(row.id(), 3);
        assert_eq!(row.get_str("name"), Some("Shoes"));
        assert_eq!(row.get_bool("is_active"), Some(false));
        assert!(row.is_null("parent"));
        assert!(row.is_null("missing"));
        assert_eq!(row.get_i64("parent"), None);
    }

    #[test]
    fn test_set_replaces_value() {
        let mut row = Row::new("Product", 1, vec![("category".into(), Value::Int(4))]);
        row.set("category", Value::Null);

        assert!(row.is_null("category"));
        assert_eq!(row.fields().len(), 1);
    }
}
