use std::fmt;

use chrono::{DateTime, Utc};
use stockroom_core::{Error, Row, Value};

use super::{boolean, int, int32, missing, optional_int, optional_string, string, timestamp, Model};

/// Availability of a product, stored as a short code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StockStatus {
    InStock,
    #[default]
    OutOfStock,
    BackOrdered,
}

impl StockStatus {
    /// All statuses in declaration order.
    pub const ALL: [StockStatus; 3] = [
        StockStatus::InStock,
        StockStatus::OutOfStock,
        StockStatus::BackOrdered,
    ];

    /// Stored code.
    pub fn code(&self) -> &'static str {
        match self {
            StockStatus::InStock => "IS",
            StockStatus::OutOfStock => "OOS",
            StockStatus::BackOrdered => "BO",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::OutOfStock => "Out of Stock",
            StockStatus::BackOrdered => "Back Ordered",
        }
    }

    /// Parse a stored code.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<StockStatus> for Value {
    fn from(status: StockStatus) -> Self {
        Value::String(status.code().to_string())
    }
}

/// A sellable product.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub pid: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub is_digital: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    pub stock_status: StockStatus,
    pub category: Option<i64>,
    pub seasonal_event: Option<i64>,
}

impl Model for Product {
    const ENTITY: &'static str = "Product";

    fn from_row(row: &Row) -> Result<Self, Error> {
        let stock_status = row
            .get_str("stock_status")
            .and_then(StockStatus::from_code)
            .ok_or_else(|| missing(row, "stock_status"))?;

        Ok(Self {
            id: row.id(),
            pid: string(row, "pid")?,
            name: string(row, "name")?,
            slug: string(row, "slug")?,
            description: optional_string(row, "description"),
            is_digital: boolean(row, "is_digital")?,
            created_at: timestamp(row, "created_at")?,
            updated_at: timestamp(row, "updated_at")?,
            is_active: boolean(row, "is_active")?,
            stock_status,
            category: optional_int(row, "category"),
            seasonal_event: optional_int(row, "seasonal_event"),
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}

/// A node of the product type tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductType {
    pub id: i64,
    pub name: String,
    pub level: i32,
    pub parent: Option<i64>,
}

impl Model for ProductType {
    const ENTITY: &'static str = "ProductType";

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Self {
            id: row.id(),
            name: string(row, "name")?,
            level: int32(row, "level")?,
            parent: optional_int(row, "parent"),
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}

/// Edge linking a product to one of its types.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductProductType {
    pub id: i64,
    pub product: i64,
    pub product_type: i64,
}

impl Model for ProductProductType {
    const ENTITY: &'static str = "Product_ProductType";

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Self {
            id: row.id(),
            product: int(row, "product")?,
            product_type: int(row, "product_type")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_status_codes() {
        assert_eq!(StockStatus::default(), StockStatus::OutOfStock);
        assert_eq!(StockStatus::default().code(), "OOS");
        assert_eq!(StockStatus::from_code("BO"), Some(StockStatus::BackOrdered));
        assert_eq!(StockStatus::from_code("XX"), None);
        assert_eq!(StockStatus::InStock.to_string(), "In Stock");
    }

    #[test]
    fn test_stock_status_into_value() {
        assert_eq!(Value::from(StockStatus::InStock), Value::String("IS".into()));
    }
}
