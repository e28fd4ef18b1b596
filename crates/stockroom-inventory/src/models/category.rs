use stockroom_core::{Error, Row};

use super::{boolean, int32, optional_int, string, Model};

/// A node of the category tree.
///
/// A category with children cannot be deleted; products in a deleted
/// category lose their category instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub is_active: bool,
    pub level: i32,
    pub parent: Option<i64>,
}

impl Model for Category {
    const ENTITY: &'static str = "Category";

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Self {
            id: row.id(),
            name: string(row, "name")?,
            slug: string(row, "slug")?,
            is_active: boolean(row, "is_active")?,
            level: int32(row, "level")?,
            parent: optional_int(row, "parent"),
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}
