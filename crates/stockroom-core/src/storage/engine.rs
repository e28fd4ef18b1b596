//! Storage engine implementation.

use super::key::{encode_row_key, table_tree, UNIQUE_INDEX_TREE};
use super::{StorageConfig, Transaction};
use crate::error::Error;
use sled::{Db, Tree};
use tracing::info;

/// The main storage engine wrapping sled.
///
/// Rows of each entity live in their own tree keyed by id; unique
/// constraint entries share one index tree.
pub struct StorageEngine {
    /// The underlying sled database.
    db: Db,

    /// Tree for unique constraint entries.
    unique_tree: Tree,
}

impl StorageEngine {
    /// Open or create a storage engine with the given configuration.
    pub fn open(config: StorageConfig) -> Result<Self, Error> {
        let sled_config = config.to_sled_config();
        let db = sled_config.open()?;
        let unique_tree = db.open_tree(UNIQUE_INDEX_TREE)?;

        info!(
            path = %config.path.display(),
            temporary = config.temporary,
            recovered = db.was_recovered(),
            "Storage opened"
        );

        Ok(Self { db, unique_tree })
    }

    /// Check if the database was recovered from a previous run.
    pub fn was_recovered(&self) -> bool {
        self.db.was_recovered()
    }

    /// Access the underlying sled database.
    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Open a tree by name.
    pub fn tree(&self, name: &str) -> Result<Tree, Error> {
        if name == UNIQUE_INDEX_TREE {
            return Ok(self.unique_tree.clone());
        }
        Ok(self.db.open_tree(name)?)
    }

    /// Open the row tree of an entity.
    pub fn table(&self, entity: &str) -> Result<Tree, Error> {
        self.tree(&table_tree(entity))
    }

    /// Get the unique index tree.
    pub fn unique_tree(&self) -> &Tree {
        &self.unique_tree
    }

    /// Read the committed bytes of a row.
    pub fn get_row(&self, entity: &str, id: i64) -> Result<Option<sled::IVec>, Error> {
        Ok(self.table(entity)?.get(encode_row_key(id))?)
    }

    /// Number of committed rows of an entity.
    pub fn row_count(&self, entity: &str) -> Result<usize, Error> {
        Ok(self.table(entity)?.len())
    }

    /// Allocate the next row id.
    ///
    /// Ids are unique across the whole store and strictly increasing;
    /// ids handed to rolled-back transactions are not reused.
    pub fn next_id(&self) -> Result<i64, Error> {
        let id = self.db.generate_id()?;
        i64::try_from(id + 1).map_err(|_| Error::InvalidData("id sequence exhausted".into()))
    }

    /// Begin a new transaction.
    pub fn transaction(&self) -> Transaction<'_> {
        Transaction::new(self)
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_engine() -> StorageEngine {
        StorageEngine::open(StorageConfig::temporary()).unwrap()
    }

    #[test]
    fn test_next_id_increases() {
        let engine = test_engine();
        let a = engine.next_id().unwrap();
        let b = engine.next_id().unwrap();

        assert!(a >= 1);
        assert!(b > a);
    }

    #[test]
    fn test_table_trees_are_separate() {
        let engine = test_engine();
        engine
            .table("Attribute")
            .unwrap()
            .insert(encode_row_key(1), b"row".to_vec())
            .unwrap();

        assert!(engine.get_row("Attribute", 1).unwrap().is_some());
        assert!(engine.get_row("Category", 1).unwrap().is_none());
        assert_eq!(engine.row_count("Attribute").unwrap(), 1);
    }

    #[test]
    fn test_persistence() {
        let dir = tempfile::tempdir().unwrap();

        {
            let engine = StorageEngine::open(StorageConfig::new(dir.path())).unwrap();
            engine
                .table("Category")
                .unwrap()
                .insert(encode_row_key(7), b"row".to_vec())
                .unwrap();
            engine.flush().unwrap();
        }

        let engine = StorageEngine::open(StorageConfig::new(dir.path())).unwrap();
        assert!(engine.get_row("Category", 7).unwrap().is_some());
    }
}
