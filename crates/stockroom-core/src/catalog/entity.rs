//! Entity definitions.

use super::field::FieldDef;
use rkyv::{Archive, Deserialize, Serialize};

/// An entity definition (table schema).
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct EntityDef {
    /// Entity name (unique within schema).
    pub name: String,
    /// Name of the primary identity field.
    pub identity_field: String,
    /// Field definitions in declaration order.
    pub fields: Vec<FieldDef>,
    /// Human readable singular name.
    pub display_name: Option<String>,
    /// Human readable plural name.
    pub display_name_plural: Option<String>,
}

impl EntityDef {
    /// Create a new entity definition with an auto-increment identity field.
    pub fn new(name: impl Into<String>, identity_field: impl Into<String>) -> Self {
        let identity_field = identity_field.into();
        Self {
            name: name.into(),
            fields: vec![FieldDef::identity(identity_field.clone())],
            identity_field,
            display_name: None,
            display_name_plural: None,
        }
    }

    /// Add a field to the entity.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add multiple fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDef>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Set the human readable names.
    pub fn with_display_names(
        mut self,
        singular: impl Into<String>,
        plural: impl Into<String>,
    ) -> Self {
        self.display_name = Some(singular.into());
        self.display_name_plural = Some(plural.into());
        self
    }

    /// Get a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get the identity field definition.
    pub fn get_identity_field(&self) -> Option<&FieldDef> {
        self.get_field(&self.identity_field)
    }

    /// Number of declared columns, identity and foreign keys included.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over foreign key columns.
    pub fn reference_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_reference())
    }

    /// Singular display name, falling back to the entity name.
    pub fn verbose_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldType, ScalarType};

    #[test]
    fn test_entity_builder() {
        let entity = EntityDef::new("Attribute", "id")
            .with_field(FieldDef::string("name", 200))
            .with_field(FieldDef::optional_scalar("description", ScalarType::Text));

        assert_eq!(entity.name, "Attribute");
        assert_eq!(entity.identity_field, "id");
        assert_eq!(entity.field_count(), 3);
        assert!(entity.get_identity_field().is_some());
        assert_eq!(entity.verbose_name(), "Attribute");
    }

    #[test]
    fn test_reference_fields() {
        let entity = EntityDef::new("AttributeValue", "id")
            .with_field(FieldDef::string("attribute_value", 100))
            .with_field(FieldDef::new("attribute", FieldType::reference("Attribute")));

        let refs: Vec<_> = entity.reference_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(refs, vec!["attribute"]);
        assert!(entity.get_field("nonexistent").is_none());
    }

    #[test]
    fn test_display_names() {
        let entity = EntityDef::new("Category", "id")
            .with_display_names("Inventory Category", "Categories");

        assert_eq!(entity.verbose_name(), "Inventory Category");
        assert_eq!(entity.display_name_plural.as_deref(), Some("Categories"));
    }
}
