//! Schema registry - the explicit set of entities, relations and constraints.

use std::collections::HashSet;

use super::{DeleteBehavior, EntityDef, FieldDef, FieldType, RelationDef, UniqueConstraint};
use crate::error::Error;
use rkyv::{Archive, Deserialize, Serialize};

/// The complete schema of a store.
///
/// Built once at start-up and passed by reference to everything that
/// needs schema metadata. Declaration order is preserved so that the
/// encoded form, and therefore the fingerprint, is deterministic.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct SchemaRegistry {
    /// Schema version.
    pub version: u64,
    /// Entity definitions in declaration order.
    pub entities: Vec<EntityDef>,
    /// Relation definitions in declaration order.
    pub relations: Vec<RelationDef>,
    /// Uniqueness constraints.
    pub unique_constraints: Vec<UniqueConstraint>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new(version: u64) -> Self {
        Self {
            version,
            entities: Vec::new(),
            relations: Vec::new(),
            unique_constraints: Vec::new(),
        }
    }

    /// Add an entity to the schema.
    pub fn with_entity(mut self, entity: EntityDef) -> Self {
        self.entities.push(entity);
        self
    }

    /// Add a relation to the schema.
    pub fn with_relation(mut self, relation: RelationDef) -> Self {
        self.relations.push(relation);
        self
    }

    /// Add a uniqueness constraint to the schema.
    pub fn with_unique(mut self, constraint: UniqueConstraint) -> Self {
        self.unique_constraints.push(constraint);
        self
    }

    /// Get an entity by name.
    pub fn get_entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Get an entity by name or fail with [`Error::UnknownEntity`].
    pub fn entity(&self, name: &str) -> Result<&EntityDef, Error> {
        self.get_entity(name)
            .ok_or_else(|| Error::UnknownEntity(name.to_string()))
    }

    /// Get a field of an entity.
    pub fn field(&self, entity: &str, field: &str) -> Option<&FieldDef> {
        self.get_entity(entity).and_then(|e| e.get_field(field))
    }

    /// Get a relation by name.
    pub fn get_relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Get all relations for an entity (as source).
    pub fn relations_from(&self, entity: &str) -> Vec<&RelationDef> {
        self.relations
            .iter()
            .filter(|r| r.from_entity == entity)
            .collect()
    }

    /// Get all relations to an entity (as target).
    pub fn relations_to(&self, entity: &str) -> Vec<&RelationDef> {
        self.relations
            .iter()
            .filter(|r| r.to_entity == entity)
            .collect()
    }

    /// Get the foreign key relation backed by a column.
    pub fn relation_for_field(&self, entity: &str, field: &str) -> Option<&RelationDef> {
        self.relations
            .iter()
            .find(|r| !r.is_many_to_many() && r.from_entity == entity && r.from_field == field)
    }

    /// Get the many-to-many relations declared on an entity.
    pub fn many_to_many_from(&self, entity: &str) -> Vec<&RelationDef> {
        self.relations
            .iter()
            .filter(|r| r.is_many_to_many() && r.from_entity == entity)
            .collect()
    }

    /// Get all uniqueness constraints for an entity.
    pub fn unique_constraints_for(&self, entity: &str) -> Vec<&UniqueConstraint> {
        self.unique_constraints
            .iter()
            .filter(|c| c.entity == entity)
            .collect()
    }

    /// Check if a field is unique on its own (primary keys included).
    pub fn is_unique(&self, entity: &str, field: &str) -> bool {
        if self.field(entity, field).is_some_and(|f| f.primary_key) {
            return true;
        }
        self.unique_constraints
            .iter()
            .any(|c| c.entity == entity && c.is_single_field(field))
    }

    /// Number of columns of an entity, identity and foreign keys included.
    pub fn field_count(&self, entity: &str) -> Option<usize> {
        self.get_entity(entity).map(EntityDef::field_count)
    }

    /// List all entity names in declaration order.
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.name.as_str()).collect()
    }

    /// Check the registry for structural consistency.
    ///
    /// Every relation and constraint must name existing entities and
    /// fields, every foreign key column must be backed by exactly one
    /// relation, and names must not repeat.
    pub fn validate(&self) -> Result<(), Error> {
        let mut names = HashSet::new();
        for entity in &self.entities {
            if !names.insert(entity.name.as_str()) {
                return Err(invalid(format!("duplicate entity '{}'", entity.name)));
            }
            self.validate_entity(entity)?;
        }

        let mut relation_names = HashSet::new();
        for relation in &self.relations {
            if !relation_names.insert(relation.name.as_str()) {
                return Err(invalid(format!("duplicate relation '{}'", relation.name)));
            }
            self.validate_relation(relation)?;
        }

        let mut constraint_names = HashSet::new();
        for constraint in &self.unique_constraints {
            if !constraint_names.insert(constraint.name.as_str()) {
                return Err(invalid(format!(
                    "duplicate constraint '{}'",
                    constraint.name
                )));
            }
            if constraint.fields.is_empty() {
                return Err(invalid(format!(
                    "constraint '{}' has no fields",
                    constraint.name
                )));
            }
            for field in &constraint.fields {
                if self.field(&constraint.entity, field).is_none() {
                    return Err(invalid(format!(
                        "constraint '{}' names unknown field {}.{}",
                        constraint.name, constraint.entity, field
                    )));
                }
            }
        }

        Ok(())
    }

    fn validate_entity(&self, entity: &EntityDef) -> Result<(), Error> {
        match entity.get_identity_field() {
            Some(f) if f.primary_key => {}
            _ => {
                return Err(invalid(format!(
                    "entity '{}' has no primary key '{}'",
                    entity.name, entity.identity_field
                )))
            }
        }

        let mut fields = HashSet::new();
        for field in &entity.fields {
            if !fields.insert(field.name.as_str()) {
                return Err(invalid(format!(
                    "duplicate field {}.{}",
                    entity.name, field.name
                )));
            }
            if let Some(target) = field.field_type.referenced_entity() {
                if self.get_entity(target).is_none() {
                    return Err(invalid(format!(
                        "{}.{} references unknown entity '{}'",
                        entity.name, field.name, target
                    )));
                }
                let backing = self
                    .relations
                    .iter()
                    .filter(|r| {
                        !r.is_many_to_many()
                            && r.from_entity == entity.name
                            && r.from_field == field.name
                    })
                    .count();
                if backing != 1 {
                    return Err(invalid(format!(
                        "{}.{} must be backed by exactly one relation, found {}",
                        entity.name, field.name, backing
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_relation(&self, relation: &RelationDef) -> Result<(), Error> {
        let from = self.get_entity(&relation.from_entity).ok_or_else(|| {
            invalid(format!(
                "relation '{}' names unknown entity '{}'",
                relation.name, relation.from_entity
            ))
        })?;
        let to = self.get_entity(&relation.to_entity).ok_or_else(|| {
            invalid(format!(
                "relation '{}' names unknown entity '{}'",
                relation.name, relation.to_entity
            ))
        })?;

        if relation.is_many_to_many() {
            let edge_name = relation.edge_entity.as_deref().ok_or_else(|| {
                invalid(format!("relation '{}' has no edge entity", relation.name))
            })?;
            let edge = self.get_entity(edge_name).ok_or_else(|| {
                invalid(format!(
                    "relation '{}' names unknown edge entity '{}'",
                    relation.name, edge_name
                ))
            })?;
            expect_reference(edge, &relation.from_field, &from.name, &relation.name)?;
            expect_reference(edge, &relation.to_field, &to.name, &relation.name)?;
            return Ok(());
        }

        let field = expect_reference(from, &relation.from_field, &to.name, &relation.name)?;
        if to.get_field(&relation.to_field).is_none() {
            return Err(invalid(format!(
                "relation '{}' targets unknown field {}.{}",
                relation.name, to.name, relation.to_field
            )));
        }
        if relation.on_delete == DeleteBehavior::SetNull && !field.is_nullable() {
            return Err(invalid(format!(
                "relation '{}' sets {}.{} to null but the field is required",
                relation.name, from.name, field.name
            )));
        }
        Ok(())
    }

    /// Serialize the registry to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|v| v.to_vec())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a registry from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        rkyv::from_bytes::<Self, rkyv::rancor::Error>(bytes)
            .map_err(|e| Error::Deserialization(e.to_string()))
    }

    /// Hex-encoded blake3 hash of the encoded registry.
    pub fn fingerprint(&self) -> Result<String, Error> {
        let bytes = self.to_bytes()?;
        Ok(hex::encode(blake3::hash(&bytes).as_bytes()))
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new(1)
    }
}

fn invalid(message: String) -> Error {
    Error::InvalidSchema(message)
}

fn expect_reference<'a>(
    entity: &'a EntityDef,
    field: &str,
    target: &str,
    relation: &str,
) -> Result<&'a FieldDef, Error> {
    let def = entity.get_field(field).ok_or_else(|| {
        invalid(format!(
            "relation '{}' names unknown field {}.{}",
            relation, entity.name, field
        ))
    })?;
    match &def.field_type {
        FieldType::Reference { entity: e } | FieldType::OptionalReference { entity: e }
            if e == target =>
        {
            Ok(def)
        }
        other => Err(invalid(format!(
            "relation '{}' expects {}.{} to reference {}, found {}",
            relation, entity.name, field, target, other
        ))),
    }
}
