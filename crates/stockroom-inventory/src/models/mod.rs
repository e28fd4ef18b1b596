//! Typed read models for the catalog entities.

mod attribute;
mod category;
mod product;
mod product_line;
mod seasonal_event;
mod stock_control;

pub use attribute::{Attribute, AttributeValue};
pub use category::Category;
pub use product::{Product, ProductProductType, ProductType, StockStatus};
pub use product_line::{ProductImage, ProductLine, ProductLineAttributeValue};
pub use seasonal_event::SeasonalEvent;
pub use stock_control::StockControl;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use stockroom_core::{Error, Row};
use uuid::Uuid;

/// A typed view of one entity's rows.
pub trait Model: Sized {
    /// Entity name in the schema registry.
    const ENTITY: &'static str;

    /// Build the model from a stored row.
    fn from_row(row: &Row) -> Result<Self, Error>;

    /// Row id.
    fn id(&self) -> i64;
}

fn missing(row: &Row, field: &str) -> Error {
    Error::InvalidData(format!(
        "{} {} has no usable value for '{}'",
        row.entity(),
        row.id(),
        field
    ))
}

pub(crate) fn string(row: &Row, field: &str) -> Result<String, Error> {
    row.get_str(field)
        .map(str::to_string)
        .ok_or_else(|| missing(row, field))
}

pub(crate) fn optional_string(row: &Row, field: &str) -> Option<String> {
    row.get_str(field).map(str::to_string)
}

pub(crate) fn int(row: &Row, field: &str) -> Result<i64, Error> {
    row.get_i64(field).ok_or_else(|| missing(row, field))
}

pub(crate) fn int32(row: &Row, field: &str) -> Result<i32, Error> {
    int(row, field)?
        .try_into()
        .map_err(|_| missing(row, field))
}

pub(crate) fn optional_int(row: &Row, field: &str) -> Option<i64> {
    row.get_i64(field)
}

pub(crate) fn boolean(row: &Row, field: &str) -> Result<bool, Error> {
    row.get_bool(field).ok_or_else(|| missing(row, field))
}

pub(crate) fn float(row: &Row, field: &str) -> Result<f64, Error> {
    row.get_f64(field).ok_or_else(|| missing(row, field))
}

pub(crate) fn decimal(row: &Row, field: &str) -> Result<Decimal, Error> {
    row.get_decimal(field).ok_or_else(|| missing(row, field))
}

pub(crate) fn timestamp(row: &Row, field: &str) -> Result<DateTime<Utc>, Error> {
    row.get_timestamp(field).ok_or_else(|| missing(row, field))
}

pub(crate) fn uuid(row: &Row, field: &str) -> Result<Uuid, Error> {
    row.get_uuid(field).ok_or_else(|| missing(row, field))
}
