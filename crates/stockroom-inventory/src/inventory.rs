//! Inventory handle.

use std::sync::Arc;

use stockroom_core::{Error, Repository, StorageConfig, StorageEngine};
use tracing::info;

use crate::models::{
    Attribute, AttributeValue, Category, Model, Product, ProductImage, ProductLine,
    ProductLineAttributeValue, ProductProductType, ProductType, SeasonalEvent, StockControl,
};
use crate::schema::inventory_schema;
use crate::table::Table;

const PRODUCT_TYPES: &str = "Product.product_type";
const ATTRIBUTE_VALUES: &str = "ProductLine.attribute_values";

/// A store opened with the catalog schema.
pub struct Inventory {
    repo: Repository,
}

impl Inventory {
    /// Open the store described by `config`.
    ///
    /// Fails with `SchemaMismatch` if the store was created with a
    /// different schema.
    pub fn open(config: StorageConfig) -> Result<Self, Error> {
        let engine = StorageEngine::open(config)?;
        let repo = Repository::with_engine(engine, Arc::new(inventory_schema()))?;
        info!(fingerprint = %repo.catalog().fingerprint(), "Inventory opened");
        Ok(Self { repo })
    }

    /// Open a throwaway in-memory store.
    pub fn temporary() -> Result<Self, Error> {
        Self::open(StorageConfig::temporary())
    }

    /// Get the underlying repository.
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Typed table for any model.
    pub fn table<M: Model>(&self) -> Table<'_, M> {
        Table::new(&self.repo)
    }

    /// Product attributes.
    pub fn attributes(&self) -> Table<'_, Attribute> {
        self.table()
    }

    /// Values of product attributes.
    pub fn attribute_values(&self) -> Table<'_, AttributeValue> {
        self.table()
    }

    /// Inventory categories.
    pub fn categories(&self) -> Table<'_, Category> {
        self.table()
    }

    /// Seasonal events.
    pub fn seasonal_events(&self) -> Table<'_, SeasonalEvent> {
        self.table()
    }

    /// Products.
    pub fn products(&self) -> Table<'_, Product> {
        self.table()
    }

    /// Product types.
    pub fn product_types(&self) -> Table<'_, ProductType> {
        self.table()
    }

    /// Edges between products and product types.
    pub fn product_product_types(&self) -> Table<'_, ProductProductType> {
        self.table()
    }

    /// Product lines.
    pub fn product_lines(&self) -> Table<'_, ProductLine> {
        self.table()
    }

    /// Edges between product lines and attribute values.
    pub fn product_line_attribute_values(&self) -> Table<'_, ProductLineAttributeValue> {
        self.table()
    }

    /// Product line images.
    pub fn product_images(&self) -> Table<'_, ProductImage> {
        self.table()
    }

    /// Stock control records, one per product.
    pub fn stock_controls(&self) -> Table<'_, StockControl> {
        self.table()
    }

    /// Tag a product with a product type. Tagging twice is a no-op.
    pub fn add_product_type(
        &self,
        product: i64,
        product_type: i64,
    ) -> Result<ProductProductType, Error> {
        let edge = self.repo.add_related(PRODUCT_TYPES, product, product_type)?;
        ProductProductType::from_row(&edge)
    }

    /// Remove a product type from a product.
    pub fn remove_product_type(&self, product: i64, product_type: i64) -> Result<bool, Error> {
        Ok(self.repo.remove_related(PRODUCT_TYPES, product, product_type)? > 0)
    }

    /// Product types of a product, ordered by id.
    pub fn product_types_of(&self, product: i64) -> Result<Vec<ProductType>, Error> {
        self.repo
            .related(PRODUCT_TYPES, product)?
            .iter()
            .map(ProductType::from_row)
            .collect()
    }

    /// Attach an attribute value to a product line. Attaching twice is a no-op.
    pub fn add_attribute_value(
        &self,
        product_line: i64,
        attribute_value: i64,
    ) -> Result<ProductLineAttributeValue, Error> {
        let edge = self
            .repo
            .add_related(ATTRIBUTE_VALUES, product_line, attribute_value)?;
        ProductLineAttributeValue::from_row(&edge)
    }

    /// Detach an attribute value from a product line.
    pub fn remove_attribute_value(
        &self,
        product_line: i64,
        attribute_value: i64,
    ) -> Result<bool, Error> {
        Ok(self
            .repo
            .remove_related(ATTRIBUTE_VALUES, product_line, attribute_value)?
            > 0)
    }

    /// Attribute values of a product line, ordered by id.
    pub fn attribute_values_of(&self, product_line: i64) -> Result<Vec<AttributeValue>, Error> {
        self.repo
            .related(ATTRIBUTE_VALUES, product_line)?
            .iter()
            .map(AttributeValue::from_row)
            .collect()
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.repo.flush()
    }
}
