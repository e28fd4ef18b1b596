//! Key and tree name encoding.

/// Tree holding unique constraint entries.
pub const UNIQUE_INDEX_TREE: &str = "index:unique";

/// Prefix of per-entity data trees.
pub const TABLE_PREFIX: &str = "table:";

/// Size of an encoded row key.
pub const ROW_KEY_SIZE: usize = 8;

/// Name of the tree holding rows of an entity.
pub fn table_tree(entity: &str) -> String {
    format!("{}{}", TABLE_PREFIX, entity)
}

/// Encode a row id as a tree key.
///
/// Big-endian encoding keeps positive ids in numeric order under
/// lexicographic comparison, so table scans return rows by id.
pub fn encode_row_key(id: i64) -> [u8; ROW_KEY_SIZE] {
    id.to_be_bytes()
}

/// Decode a row id from a tree key.
pub fn decode_row_key(bytes: &[u8]) -> Option<i64> {
    let buf: [u8; ROW_KEY_SIZE] = bytes.try_into().ok()?;
    Some(i64::from_be_bytes(buf))
}
