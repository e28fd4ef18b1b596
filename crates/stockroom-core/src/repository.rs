//! Repository - schema-checked create, read, update and delete.
//!
//! Every write runs in one storage transaction: either every check,
//! cascade step and index update succeeds and is committed, or nothing
//! is written.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::cascade::{CascadeExecutor, DeleteReport};
use crate::catalog::{Catalog, RelationDef, SchemaRegistry};
use crate::constraint::ConstraintValidator;
use crate::error::{Error, ValidationError};
use crate::query::{encode_row, read_row, scan_rows, Filter};
use crate::row::Row;
use crate::storage::key::{encode_row_key, table_tree};
use crate::storage::{StorageConfig, StorageEngine};
use crate::value::Fields;

/// Data access over a store bound to one schema registry.
pub struct Repository {
    engine: StorageEngine,
    registry: Arc<SchemaRegistry>,
    catalog: Catalog,
}

impl Repository {
    /// Open storage with the given configuration and attach the registry.
    pub fn open(config: StorageConfig, registry: Arc<SchemaRegistry>) -> Result<Self, Error> {
        let engine = StorageEngine::open(config)?;
        Self::with_engine(engine, registry)
    }

    /// Attach the registry to an already opened engine.
    ///
    /// Fails if the registry is inconsistent or the store was created
    /// with a different schema.
    pub fn with_engine(engine: StorageEngine, registry: Arc<SchemaRegistry>) -> Result<Self, Error> {
        registry.validate()?;
        let catalog = Catalog::attach(engine.db(), &registry)?;

        info!(
            entities = registry.entities.len(),
            relations = registry.relations.len(),
            "Repository opened"
        );

        Ok(Self {
            engine,
            registry,
            catalog,
        })
    }

    /// Get the schema registry.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Get the storage engine.
    pub fn engine(&self) -> &StorageEngine {
        &self.engine
    }

    /// Get the catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Create a row.
    pub fn create(&self, entity: &str, fields: Fields) -> Result<Row, Error> {
        let def = self.registry.entity(entity)?;
        let id = self.engine.next_id()?;

        let mut tx = self.engine.transaction();
        let validator = ConstraintValidator::new(&self.registry);
        let values = validator.validate_insert(&mut tx, def, id, &fields, Utc::now())?;
        tx.insert(&table_tree(entity), encode_row_key(id), encode_row(&values)?);
        tx.commit()?;

        debug!(entity = %entity, id, "Row created");
        Ok(Row::new(entity, id, values))
    }

    /// Get a row by id.
    pub fn get(&self, entity: &str, id: i64) -> Result<Option<Row>, Error> {
        self.registry.entity(entity)?;
        let tx = self.engine.transaction();
        read_row(&tx, entity, id)
    }

    /// List the rows of an entity matching a filter, ordered by id.
    pub fn list(&self, entity: &str, filter: &Filter) -> Result<Vec<Row>, Error> {
        let def = self.registry.entity(entity)?;
        for condition in filter.conditions() {
            if def.get_field(condition.field()).is_none() {
                return Err(ValidationError::UnknownField {
                    entity: entity.to_string(),
                    field: condition.field().to_string(),
                }
                .into());
            }
        }
        let tx = self.engine.transaction();
        scan_rows(&tx, entity, filter)
    }

    /// Number of rows of an entity.
    pub fn count(&self, entity: &str) -> Result<usize, Error> {
        self.registry.entity(entity)?;
        self.engine.row_count(entity)
    }

    /// Update a row. Unassigned fields keep their values.
    pub fn update(&self, entity: &str, id: i64, fields: Fields) -> Result<Row, Error> {
        let def = self.registry.entity(entity)?;
        let mut tx = self.engine.transaction();

        let existing = read_row(&tx, entity, id)?.ok_or_else(|| Error::not_found(entity, id))?;
        let validator = ConstraintValidator::new(&self.registry);
        let values = validator.validate_update(&mut tx, def, &existing, &fields, Utc::now())?;

        tx.insert(&table_tree(entity), encode_row_key(id), encode_row(&values)?);
        tx.commit()?;

        debug!(entity = %entity, id, fields = fields.len(), "Row updated");
        Ok(Row::new(entity, id, values))
    }

    /// Delete a row, applying the delete policy of every relation that reaches it.
    pub fn delete(&self, entity: &str, id: i64) -> Result<DeleteReport, Error> {
        self.registry.entity(entity)?;
        let mut tx = self.engine.transaction();

        if read_row(&tx, entity, id)?.is_none() {
            return Err(Error::not_found(entity, id));
        }
        let report = CascadeExecutor::new(&self.registry).process_delete(&mut tx, entity, id)?;
        tx.commit()?;

        debug!(
            entity = %entity,
            id,
            deleted = report.deleted.len(),
            nullified = report.nullified.len(),
            "Row deleted"
        );
        Ok(report)
    }

    /// Rows linked to `id` through a many-to-many relation, ordered by id.
    pub fn related(&self, relation: &str, id: i64) -> Result<Vec<Row>, Error> {
        let rel = self.many_to_many(relation)?;
        let edge = edge_of(rel)?;
        let tx = self.engine.transaction();

        if read_row(&tx, &rel.from_entity, id)?.is_none() {
            return Err(Error::not_found(&rel.from_entity, id));
        }

        let edges = scan_rows(&tx, edge, &Filter::all().eq(&rel.from_field, id))?;
        let mut target_ids: Vec<i64> = edges
            .iter()
            .filter_map(|row| row.get_i64(&rel.to_field))
            .collect();
        target_ids.sort_unstable();
        target_ids.dedup();

        let mut rows = Vec::with_capacity(target_ids.len());
        for target_id in target_ids {
            if let Some(row) = read_row(&tx, &rel.to_entity, target_id)? {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    /// Link two rows through a many-to-many relation.
    ///
    /// Returns the edge row; linking an already linked pair returns the
    /// existing edge.
    pub fn add_related(&self, relation: &str, from_id: i64, to_id: i64) -> Result<Row, Error> {
        let rel = self.many_to_many(relation)?;
        let edge = edge_of(rel)?;

        let filter = Filter::all()
            .eq(&rel.from_field, from_id)
            .eq(&rel.to_field, to_id);
        let tx = self.engine.transaction();
        if let Some(existing) = scan_rows(&tx, edge, &filter)?.into_iter().next() {
            return Ok(existing);
        }
        drop(tx);

        self.create(
            edge,
            Fields::new()
                .set(rel.from_field.clone(), from_id)
                .set(rel.to_field.clone(), to_id),
        )
    }

    /// Unlink two rows. Returns the number of edge rows removed.
    pub fn remove_related(&self, relation: &str, from_id: i64, to_id: i64) -> Result<usize, Error> {
        let rel = self.many_to_many(relation)?;
        let edge = edge_of(rel)?;

        let filter = Filter::all()
            .eq(&rel.from_field, from_id)
            .eq(&rel.to_field, to_id);
        let mut tx = self.engine.transaction();
        let edges = scan_rows(&tx, edge, &filter)?;

        let executor = CascadeExecutor::new(&self.registry);
        for row in &edges {
            executor.process_delete(&mut tx, edge, row.id())?;
        }
        tx.commit()?;

        Ok(edges.len())
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.engine.flush()
    }

    fn many_to_many(&self, relation: &str) -> Result<&RelationDef, Error> {
        self.registry
            .get_relation(relation)
            .filter(|r| r.is_many_to_many())
            .ok_or_else(|| Error::UnknownRelation(relation.to_string()))
    }
}

fn edge_of(relation: &RelationDef) -> Result<&str, Error> {
    relation.edge_entity.as_deref().ok_or_else(|| {
        Error::InvalidSchema(format!("relation '{}' has no edge entity", relation.name))
    })
}
