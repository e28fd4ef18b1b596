//! Schema description for Stockroom.
//!
//! Entities, fields, relations and uniqueness constraints are plain data
//! collected into a [`SchemaRegistry`]. The [`Catalog`] pins a store to
//! the registry it was created with.

mod catalog;
mod constraint;
mod entity;
mod field;
mod relation;
mod schema;
mod types;

pub use catalog::{Catalog, META_TREE};
pub use constraint::UniqueConstraint;
pub use entity::EntityDef;
pub use field::{AutoTimestamp, DefaultValue, FieldDef};
pub use relation::{Cardinality, DeleteBehavior, RelationDef};
pub use schema::SchemaRegistry;
pub use types::{FieldType, ScalarType};
