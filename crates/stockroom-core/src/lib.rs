//! Stockroom Core - schema catalog, constraint enforcement and storage.
//!
//! This crate provides the generic engine behind Stockroom: explicit
//! schema descriptions, a sled-backed store with atomic transactions, and
//! a repository that enforces field constraints, uniqueness and delete
//! policies (cascade, restrict, set null).

pub mod cascade;
pub mod catalog;
pub mod constraint;
pub mod error;
pub mod query;
pub mod repository;
pub mod row;
pub mod storage;
pub mod value;

pub use cascade::{CascadeExecutor, DeleteReport, MAX_CASCADE_DEPTH};
pub use catalog::{
    AutoTimestamp, Cardinality, Catalog, DefaultValue, DeleteBehavior, EntityDef, FieldDef,
    FieldType, RelationDef, ScalarType, SchemaRegistry, UniqueConstraint,
};
pub use constraint::{ConstraintValidator, UniqueIndex};
pub use error::{Error, IntegrityError, ValidationError};
pub use query::{Condition, Filter};
pub use repository::Repository;
pub use row::Row;
pub use storage::{StorageConfig, StorageEngine, Transaction};
pub use value::{Fields, Value};
