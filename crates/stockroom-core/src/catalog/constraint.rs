//! Uniqueness constraints.

use rkyv::{Archive, Deserialize, Serialize};

/// A uniqueness constraint over one or more fields of an entity.
///
/// Rows where any constrained field is NULL are not indexed.
#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct UniqueConstraint {
    /// Constraint name.
    pub name: String,
    /// Entity this constraint applies to.
    pub entity: String,
    /// Fields that must be unique together.
    pub fields: Vec<String>,
}

impl UniqueConstraint {
    /// Create a unique constraint on a single field, named `entity_field_key`.
    pub fn single(entity: impl Into<String>, field: impl Into<String>) -> Self {
        let entity = entity.into();
        let field = field.into();
        Self {
            name: format!("{}_{}_key", entity.to_lowercase(), field),
            entity,
            fields: vec![field],
        }
    }

    /// Create a composite unique constraint.
    pub fn composite(
        name: impl Into<String>,
        entity: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            entity: entity.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if this constraint covers exactly one field with the given name.
    pub fn is_single_field(&self, field: &str) -> bool {
        self.fields.len() == 1 && self.fields[0] == field
    }
}
