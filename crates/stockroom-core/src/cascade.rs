//! Cascade executor for handling referential integrity on deletes.
//!
//! A delete first collects every row reachable through CASCADE relations,
//! then checks RESTRICT relations against rows no cascade reaches, clears
//! SET NULL references held by surviving rows, and finally removes the
//! collected rows together with their unique index entries.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::catalog::{DeleteBehavior, SchemaRegistry};
use crate::constraint::UniqueIndex;
use crate::error::{Error, IntegrityError};
use crate::query::{encode_row, read_row, referencing_ids};
use crate::row::Row;
use crate::storage::key::{encode_row_key, table_tree};
use crate::storage::Transaction;
use crate::value::Value;

/// Maximum cascade depth to prevent runaway recursion.
pub const MAX_CASCADE_DEPTH: usize = 100;

/// Result of a delete.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DeleteReport {
    /// Rows that were deleted, the requested row first.
    pub deleted: Vec<(String, i64)>,
    /// Foreign keys that were set to null: (entity, id, field).
    pub nullified: Vec<(String, i64, String)>,
}

impl DeleteReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of affected rows.
    pub fn affected_count(&self) -> usize {
        let nullified: HashSet<(&str, i64)> = self
            .nullified
            .iter()
            .map(|(entity, id, _)| (entity.as_str(), *id))
            .collect();
        self.deleted.len() + nullified.len()
    }

    /// Number of deleted rows of an entity.
    pub fn deleted_count(&self, entity: &str) -> usize {
        self.deleted.iter().filter(|(e, _)| e == entity).count()
    }

    /// Check whether a row was deleted.
    pub fn was_deleted(&self, entity: &str, id: i64) -> bool {
        self.deleted.iter().any(|(e, i)| e == entity && *i == id)
    }
}

/// Rows gathered by a cascade walk.
#[derive(Default)]
struct CascadeWalk {
    /// Rows to delete, in discovery order.
    closure: Vec<(String, i64)>,
    visited: HashSet<(String, i64)>,
    /// Rows reached through a cascading edge, the requested row included
    /// only when a cascade cycle leads back to it.
    cascaded: HashSet<(String, i64)>,
}

/// Executes cascade operations for delete.
pub struct CascadeExecutor<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> CascadeExecutor<'r> {
    /// Create a new cascade executor.
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Delete a row and apply every delete policy that reaches it.
    ///
    /// All writes are queued on `tx`; the caller commits.
    pub fn process_delete(
        &self,
        tx: &mut Transaction<'_>,
        entity: &str,
        id: i64,
    ) -> Result<DeleteReport, Error> {
        let mut walk = CascadeWalk::default();
        self.collect(tx, entity, id, &mut walk, 0)?;
        let CascadeWalk {
            closure,
            visited,
            cascaded,
        } = walk;

        self.check_restrict(tx, &closure, &cascaded)?;

        let mut report = DeleteReport::new();
        self.nullify(tx, &closure, &visited, &mut report)?;

        let unique_index = UniqueIndex::new(self.registry);
        for (entity, id) in closure {
            if let Some(row) = read_row(tx, &entity, id)? {
                unique_index.release_row(tx, &entity, row.fields());
            }
            tx.remove(&table_tree(&entity), encode_row_key(id));
            debug!(entity = %entity, id, "Row deleted");
            report.deleted.push((entity, id));
        }

        Ok(report)
    }

    /// Collect the row and everything reachable through CASCADE relations.
    fn collect(
        &self,
        tx: &Transaction<'_>,
        entity: &str,
        id: i64,
        walk: &mut CascadeWalk,
        depth: usize,
    ) -> Result<(), Error> {
        if depth > MAX_CASCADE_DEPTH {
            return Err(IntegrityError::MaxDepthExceeded { depth }.into());
        }

        if !walk.visited.insert((entity.to_string(), id)) {
            return Ok(());
        }
        walk.closure.push((entity.to_string(), id));

        for relation in self.registry.relations_to(entity) {
            if relation.is_many_to_many() || relation.on_delete != DeleteBehavior::Cascade {
                continue;
            }
            for ref_id in referencing_ids(tx, &relation.from_entity, &relation.from_field, id)? {
                walk.cascaded.insert((relation.from_entity.clone(), ref_id));
                self.collect(tx, &relation.from_entity, ref_id, walk, depth + 1)?;
            }
        }

        Ok(())
    }

    /// Fail if a RESTRICT relation is held by a row no cascade removes.
    ///
    /// The requested row counts as a holder, so a row restricting itself
    /// cannot be deleted.
    fn check_restrict(
        &self,
        tx: &Transaction<'_>,
        closure: &[(String, i64)],
        cascaded: &HashSet<(String, i64)>,
    ) -> Result<(), Error> {
        for (entity, id) in closure {
            for relation in self.registry.relations_to(entity) {
                if relation.is_many_to_many() || relation.on_delete != DeleteBehavior::Restrict {
                    continue;
                }
                let blocking = referencing_ids(tx, &relation.from_entity, &relation.from_field, *id)?
                    .into_iter()
                    .filter(|ref_id| !cascaded.contains(&(relation.from_entity.clone(), *ref_id)))
                    .count();
                if blocking > 0 {
                    warn!(
                        relation = %relation.name,
                        entity = %entity,
                        id = *id,
                        count = blocking,
                        "Delete blocked by restrict relation"
                    );
                    return Err(IntegrityError::RestrictViolation {
                        relation: relation.name.clone(),
                        entity: entity.clone(),
                        id: *id,
                        referencing_entity: relation.from_entity.clone(),
                        count: blocking,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Clear SET NULL references held by rows that survive the delete.
    ///
    /// Auto timestamps are left untouched.
    fn nullify(
        &self,
        tx: &mut Transaction<'_>,
        closure: &[(String, i64)],
        visited: &HashSet<(String, i64)>,
        report: &mut DeleteReport,
    ) -> Result<(), Error> {
        let mut changed: BTreeMap<(String, i64), (Row, Row)> = BTreeMap::new();

        for (entity, id) in closure {
            for relation in self.registry.relations_to(entity) {
                if relation.is_many_to_many() || relation.on_delete != DeleteBehavior::SetNull {
                    continue;
                }
                for ref_id in referencing_ids(tx, &relation.from_entity, &relation.from_field, *id)? {
                    let key = (relation.from_entity.clone(), ref_id);
                    if visited.contains(&key) {
                        continue;
                    }
                    if !changed.contains_key(&key) {
                        if let Some(row) = read_row(tx, &relation.from_entity, ref_id)? {
                            changed.insert(key.clone(), (row.clone(), row));
                        }
                    }
                    if let Some((_, row)) = changed.get_mut(&key) {
                        row.set(&relation.from_field, Value::Null);
                        report.nullified.push((
                            relation.from_entity.clone(),
                            ref_id,
                            relation.from_field.clone(),
                        ));
                    }
                }
            }
        }

        let unique_index = UniqueIndex::new(self.registry);
        let mut written: HashMap<&str, usize> = HashMap::new();
        for ((entity, id), (before, after)) in &changed {
            unique_index.update_row(tx, entity, *id, Some(before.fields()), after.fields())?;
            tx.insert(&table_tree(entity), encode_row_key(*id), encode_row(after.fields())?);
            *written.entry(entity.as_str()).or_default() += 1;
        }
        for (entity, count) in written {
            debug!(entity = %entity, count, "References set to null");
        }

        Ok(())
    }
}
