use chrono::{DateTime, Utc};
use stockroom_core::{Error, Row};

use super::{string, timestamp, Model};

/// A promotion window products can be attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalEvent {
    pub id: i64,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl Model for SeasonalEvent {
    const ENTITY: &'static str = "SeasonalEvent";

    fn from_row(row: &Row) -> Result<Self, Error> {
        Ok(Self {
            id: row.id(),
            name: string(row, "name")?,
            start_date: timestamp(row, "start_date")?,
            end_date: timestamp(row, "end_date")?,
        })
    }

    fn id(&self) -> i64 {
        self.id
    }
}
