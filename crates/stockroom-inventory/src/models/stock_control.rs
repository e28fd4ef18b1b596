use stockroom_core::{Error, Row};

use super::{int, int32, string, Model};

/// Stock bookkeeping for exactly one product.
#[derive(Debug, Clone, PartialEq)]
pub struct StockControl {
    pub id: i64,
    pub stock_qty: i32,
    pub name: String,
    pub stock_product: i64,
}

impl Model for StockControl {
    const ENTITY: &'static str = "StockControl";

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Self {
            id: row.id(),
            stock_qty: int32(row, "stock_qty")?,
            name: string(row, "name")?,
            stock_product: int(row, "stock_product")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}
