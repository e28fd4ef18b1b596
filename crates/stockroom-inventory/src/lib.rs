//! Stockroom Inventory - the product catalog schema and typed access to it.
//!
//! [`inventory_schema`] describes the eleven catalog entities and their
//! delete policies. [`Inventory`] opens a store bound to that schema and
//! hands out typed [`Table`]s per entity.

pub mod inventory;
pub mod models;
pub mod schema;
pub mod table;

pub use inventory::Inventory;
pub use models::{
    Attribute, AttributeValue, Category, Model, Product, ProductImage, ProductLine,
    ProductLineAttributeValue, ProductProductType, ProductType, SeasonalEvent, StockControl,
    StockStatus,
};
pub use schema::{inventory_schema, SCHEMA_VERSION};
pub use table::Table;
