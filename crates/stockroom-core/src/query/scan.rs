//! Row reads through a transaction.

use super::{decode_row, Filter};
use crate::error::Error;
use crate::row::Row;
use crate::storage::key::{decode_row_key, encode_row_key, table_tree};
use crate::storage::Transaction;
use crate::value::Value;

/// Read one row by id.
pub fn read_row(tx: &Transaction<'_>, entity: &str, id: i64) -> Result<Option<Row>, Error> {
    match tx.get(&table_tree(entity), &encode_row_key(id))? {
        Some(bytes) => Ok(Some(Row::new(entity, id, decode_row(&bytes)?))),
        None => Ok(None),
    }
}

/// Read every row of an entity matching a filter, ordered by id.
pub fn scan_rows(tx: &Transaction<'_>, entity: &str, filter: &Filter) -> Result<Vec<Row>, Error> {
    let mut rows = Vec::new();
    for (key, value) in tx.scan_prefix(&table_tree(entity), &[])? {
        let id = decode_row_key(&key)
            .ok_or_else(|| Error::InvalidData(format!("malformed row key in {}", entity)))?;
        let row = Row::new(entity, id, decode_row(&value)?);
        if filter.matches(&row) {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Ids of the rows whose `field` holds `target_id`.
pub fn referencing_ids(
    tx: &Transaction<'_>,
    entity: &str,
    field: &str,
    target_id: i64,
) -> Result<Vec<i64>, Error> {
    let filter = Filter::all().eq(field, Value::Int(target_id));
    Ok(scan_rows(tx, entity, &filter)?
        .into_iter()
        .map(|row| row.id())
        .collect())
}
