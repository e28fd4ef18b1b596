use rust_decimal::Decimal;
use stockroom_core::{Error, Row};
use uuid::Uuid;

use super::{boolean, decimal, float, int, int32, string, uuid, Model};

/// A concrete variant of a product with its own price and stock.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductLine {
    pub id: i64,
    pub price: Decimal,
    pub sku: Uuid,
    pub stock_qty: i32,
    pub is_active: bool,
    pub order: i32,
    pub weight: f64,
    pub product: i64,
}

impl Model for ProductLine {
    const ENTITY: &'static str = "ProductLine";

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Self {
            id: row.id(),
            price: decimal(row, "price")?,
            sku: uuid(row, "sku")?,
            stock_qty: int32(row, "stock_qty")?,
            is_active: boolean(row, "is_active")?,
            order: int32(row, "order")?,
            weight: float(row, "weight")?,
            product: int(row, "product")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}

/// Edge linking a product line to an attribute value.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductLineAttributeValue {
    pub id: i64,
    pub product_line: i64,
    pub attribute_value: i64,
}

impl Model for ProductLineAttributeValue {
    const ENTITY: &'static str = "ProductLine_AttributeValue";

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Self {
            id: row.id(),
            product_line: int(row, "product_line")?,
            attribute_value: int(row, "attribute_value")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}

/// An image of a product line. Deleted with its line.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductImage {
    pub id: i64,
    pub alternative_text: String,
    pub url: String,
    pub order: i32,
    pub product_line: i64,
}

impl Model for ProductImage {
    const ENTITY: &'static str = "ProductImage";

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Self {
            id: row.id(),
            alternative_text: string(row, "alternative_text")?,
            url: string(row, "url")?,
            order: int32(row, "order")?,
            product_line: int(row, "product_line")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}
