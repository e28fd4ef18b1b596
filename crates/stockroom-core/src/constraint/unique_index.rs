//! Secondary index for enforcing unique constraints.
//!
//! Entries live in the shared `index:unique` tree and are written through
//! the caller's transaction, so a failed operation leaves no entries behind.

use crate::catalog::{SchemaRegistry, UniqueConstraint};
use crate::error::{Error, ValidationError};
use crate::storage::key::{decode_row_key, encode_row_key, UNIQUE_INDEX_TREE};
use crate::storage::Transaction;
use crate::value::Value;

/// Unique constraint index over a schema registry.
///
/// Key format: `entity\0constraint\0value1\0value2...` -> `row id`
pub struct UniqueIndex<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> UniqueIndex<'r> {
    /// Create an index view over the registry's constraints.
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Build the index key for a unique constraint.
    pub fn build_key(entity: &str, constraint: &str, values: &[String]) -> Vec<u8> {
        let mut key = Vec::new();
        key.extend_from_slice(entity.as_bytes());
        key.push(0);
        key.extend_from_slice(constraint.as_bytes());
        for value in values {
            key.push(0);
            key.extend_from_slice(value.as_bytes());
        }
        key
    }

    /// Canonical values of a row for a constraint. None if any of them is NULL.
    fn constrained_values(
        constraint: &UniqueConstraint,
        fields: &[(String, Value)],
    ) -> Option<Vec<String>> {
        constraint
            .fields
            .iter()
            .map(|name| {
                fields
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, v)| v)
                    .filter(|v| !v.is_null())
                    .map(Value::index_key)
            })
            .collect()
    }

    /// Look up the row holding a unique value.
    pub fn lookup(
        &self,
        tx: &Transaction<'_>,
        entity: &str,
        constraint: &str,
        values: &[String],
    ) -> Result<Option<i64>, Error> {
        let key = Self::build_key(entity, constraint, values);
        match tx.get(UNIQUE_INDEX_TREE, &key)? {
            Some(bytes) => decode_row_key(&bytes)
                .map(Some)
                .ok_or_else(|| Error::InvalidData("malformed unique index entry".into())),
            None => Ok(None),
        }
    }

    /// Move a row's entries from its old values to its new values.
    ///
    /// Pass `old = None` for a new row. Fails with a unique violation if
    /// another row already holds one of the new values.
    pub fn update_row(
        &self,
        tx: &mut Transaction<'_>,
        entity: &str,
        id: i64,
        old: Option<&[(String, Value)]>,
        new: &[(String, Value)],
    ) -> Result<(), Error> {
        for constraint in self.registry.unique_constraints_for(entity) {
            let old_values = old.and_then(|fields| Self::constrained_values(constraint, fields));
            let new_values = Self::constrained_values(constraint, new);
            if old_values == new_values {
                continue;
            }

            if let Some(values) = &new_values {
                if let Some(existing) = self.lookup(tx, entity, &constraint.name, values)? {
                    if existing != id {
                        return Err(ValidationError::UniqueViolation {
                            constraint: constraint.name.clone(),
                            entity: entity.to_string(),
                            fields: constraint.fields.clone(),
                            value: values.join(", "),
                        }
                        .into());
                    }
                }
            }

            if let Some(values) = &old_values {
                tx.remove(
                    UNIQUE_INDEX_TREE,
                    Self::build_key(entity, &constraint.name, values),
                );
            }
            if let Some(values) = &new_values {
                tx.insert(
                    UNIQUE_INDEX_TREE,
                    Self::build_key(entity, &constraint.name, values),
                    encode_row_key(id).to_vec(),
                );
            }
        }
        Ok(())
    }

    /// Remove every entry held by a row.
    pub fn release_row(
        &self,
        tx: &mut Transaction<'_>,
        entity: &str,
        fields: &[(String, Value)],
    ) {
        for constraint in self.registry.unique_constraints_for(entity) {
            if let Some(values) = Self::constrained_values(constraint, fields) {
                tx.remove(
                    UNIQUE_INDEX_TREE,
                    Self::build_key(entity, &constraint.name, &values),
                );
            }
        }
    }
}
