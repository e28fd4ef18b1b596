//! Field definitions for entities.

use super::types::{FieldType, ScalarType};
use rkyv::{Archive, Deserialize, Serialize};

/// A field definition within an entity.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Field data type.
    pub field_type: FieldType,
    /// Maximum length in characters for string-like fields.
    pub max_length: Option<u32>,
    /// Default value if not provided.
    pub default: Option<DefaultValue>,
    /// Timestamp maintained by the store.
    pub auto_timestamp: Option<AutoTimestamp>,
    /// Whether an empty string is accepted.
    pub blank: bool,
    /// Whether this is the primary key.
    pub primary_key: bool,
}

/// Default value for a field.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub enum DefaultValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Next value of the store's id sequence.
    AutoIncrement,
    /// Random (v4) UUID.
    AutoUuid,
    /// Current timestamp (evaluated at insert time).
    CurrentTimestamp,
}

/// When the store stamps a timestamp field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub enum AutoTimestamp {
    /// Set once when the row is created.
    OnCreate,
    /// Set on creation and on every update.
    OnUpdate,
}

impl FieldDef {
    /// Create a new field of the given type.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            max_length: None,
            default: None,
            auto_timestamp: None,
            blank: false,
            primary_key: false,
        }
    }

    /// Create the auto-increment primary key field.
    pub fn identity(name: impl Into<String>) -> Self {
        let mut field = Self::new(name, FieldType::Scalar(ScalarType::Int64))
            .with_default(DefaultValue::AutoIncrement);
        field.primary_key = true;
        field
    }

    /// Create a required bounded string field.
    pub fn string(name: impl Into<String>, max_length: u32) -> Self {
        Self::new(name, FieldType::Scalar(ScalarType::String)).with_max_length(max_length)
    }

    /// Create an optional scalar field.
    pub fn optional_scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, FieldType::OptionalScalar(scalar))
    }

    /// Set the maximum length.
    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Let the store maintain this timestamp.
    pub fn auto_timestamp(mut self, auto: AutoTimestamp) -> Self {
        self.auto_timestamp = Some(auto);
        self
    }

    /// Accept empty strings.
    pub fn allow_blank(mut self) -> Self {
        self.blank = true;
        self
    }

    /// Check if this field accepts NULL.
    pub fn is_nullable(&self) -> bool {
        self.field_type.is_nullable()
    }

    /// Check if this field has a default value.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Check if callers may assign this field.
    pub fn is_editable(&self) -> bool {
        !self.primary_key && self.auto_timestamp.is_none()
    }

    /// Check if this is a foreign key column.
    pub fn is_reference(&self) -> bool {
        self.field_type.referenced_entity().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_field() {
        let field = FieldDef::identity("id");

        assert!(field.primary_key);
        assert!(!field.is_nullable());
        assert!(!field.is_editable());
        assert_eq!(field.default, Some(DefaultValue::AutoIncrement));
    }

    #[test]
    fn test_string_field_builder() {
        let field = FieldDef::string("slug", 220).allow_blank();

        assert_eq!(field.max_length, Some(220));
        assert!(field.blank);
        assert!(field.is_editable());
        assert!(!field.has_default());
    }

    #[test]
    fn test_auto_timestamp_is_read_only() {
        let field = FieldDef::new("updated_at", FieldType::scalar(ScalarType::Timestamp))
            .auto_timestamp(AutoTimestamp::OnUpdate);

        assert!(!field.is_editable());
        assert!(!field.is_reference());
    }
}
