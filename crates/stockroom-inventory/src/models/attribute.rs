use stockroom_core::{Error, Row};

use super::{int, optional_string, string, Model};

/// A named product attribute, e.g. "Size".
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl Model for Attribute {
    const ENTITY: &'static str = "Attribute";

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Self {
            id: row.id(),
            name: string(row, "name")?,
            description: optional_string(row, "description"),
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}

/// One value of an attribute, e.g. "Large". Deleted with its attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeValue {
    pub id: i64,
    pub attribute_value: String,
    pub attribute: i64,
}

impl Model for AttributeValue {
    const ENTITY: &'static str = "AttributeValue";

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Self {
            id: row.id(),
            attribute_value: string(row, "attribute_value")?,
            attribute: int(row, "attribute")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}
