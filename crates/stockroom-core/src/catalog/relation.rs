//! Relation definitions between entities.

use std::fmt;

use rkyv::{Archive, Deserialize, Serialize};

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub enum Cardinality {
    /// One-to-one relation (unique foreign key).
    OneToOne,
    /// One-to-many relation (foreign key on many side).
    OneToMany,
    /// Many-to-many relation (requires edge/join entity).
    ManyToMany,
}

/// Behavior when a referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub enum DeleteBehavior {
    /// Delete referencing rows.
    Cascade,
    /// Prevent deletion if referencing rows exist.
    Restrict,
    /// Set the foreign key to null.
    SetNull,
}

impl fmt::Display for DeleteBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteBehavior::Cascade => write!(f, "cascade"),
            DeleteBehavior::Restrict => write!(f, "restrict"),
            DeleteBehavior::SetNull => write!(f, "set null"),
        }
    }
}

/// A relation definition between two entities.
///
/// For foreign key relations `from_entity.from_field` holds the id of a
/// `to_entity` row and `on_delete` applies when that row is deleted.
/// For many-to-many relations both fields live on the edge entity:
/// `from_field` points back at the source row, `to_field` at the target.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct RelationDef {
    /// Relation name (unique within schema).
    pub name: String,
    /// Source entity name.
    pub from_entity: String,
    /// Target entity name.
    pub to_entity: String,
    /// Relation cardinality.
    pub cardinality: Cardinality,
    /// Foreign key field on the source entity.
    pub from_field: String,
    /// Field on the target entity (usually identity).
    pub to_field: String,
    /// Delete behavior.
    pub on_delete: DeleteBehavior,
    /// Edge entity for many-to-many relations.
    pub edge_entity: Option<String>,
}

impl RelationDef {
    fn foreign_key(
        cardinality: Cardinality,
        from_entity: String,
        from_field: String,
        to_entity: String,
    ) -> Self {
        Self {
            name: format!("{}.{}", from_entity, from_field),
            from_entity,
            to_entity,
            cardinality,
            from_field,
            to_field: "id".to_string(),
            on_delete: DeleteBehavior::Restrict,
            edge_entity: None,
        }
    }

    /// Create a one-to-one relation. The relation is named `Entity.field`.
    pub fn one_to_one(
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
    ) -> Self {
        Self::foreign_key(
            Cardinality::OneToOne,
            from_entity.into(),
            from_field.into(),
            to_entity.into(),
        )
    }

    /// Create a many-to-one foreign key. The relation is named `Entity.field`.
    pub fn one_to_many(
        from_entity: impl Into<String>,
        from_field: impl Into<String>,
        to_entity: impl Into<String>,
    ) -> Self {
        Self::foreign_key(
            Cardinality::OneToMany,
            from_entity.into(),
            from_field.into(),
            to_entity.into(),
        )
    }

    /// Create a many-to-many relation through an edge entity.
    pub fn many_to_many(
        name: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
        edge_entity: impl Into<String>,
        edge_from_field: impl Into<String>,
        edge_to_field: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            from_entity: from_entity.into(),
            to_entity: to_entity.into(),
            cardinality: Cardinality::ManyToMany,
            from_field: edge_from_field.into(),
            to_field: edge_to_field.into(),
            on_delete: DeleteBehavior::Cascade,
            edge_entity: Some(edge_entity.into()),
        }
    }

    /// Set delete behavior.
    pub fn with_on_delete(mut self, on_delete: DeleteBehavior) -> Self {
        self.on_delete = on_delete;
        self
    }

    /// Check if this is a many-to-many relation.
    pub fn is_many_to_many(&self) -> bool {
        self.cardinality == Cardinality::ManyToMany
    }

    /// Check if the source entity references its own table.
    pub fn is_self_referencing(&self) -> bool {
        !self.is_many_to_many() && self.from_entity == self.to_entity
    }
}
