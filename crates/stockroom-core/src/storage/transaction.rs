//! Transaction support for atomic multi-tree operations.

use std::collections::BTreeMap;

use super::StorageEngine;
use crate::error::Error;
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionalTree};
use sled::{Transactional, Tree};
use tracing::debug;

/// A buffered write transaction.
///
/// Writes are collected in a local cache keyed by tree and key, and are
/// visible to reads through the same transaction. Nothing reaches the
/// store until [`Transaction::commit`], which applies every write in one
/// sled multi-tree transaction. Dropping the transaction discards it.
pub struct Transaction<'a> {
    engine: &'a StorageEngine,
    /// Local cache for uncommitted writes ((tree, key) -> value or tombstone).
    write_cache: BTreeMap<(String, Vec<u8>), Option<Vec<u8>>>,
}

impl<'a> Transaction<'a> {
    /// Create a new transaction.
    pub(crate) fn new(engine: &'a StorageEngine) -> Self {
        Self {
            engine,
            write_cache: BTreeMap::new(),
        }
    }

    /// Get the engine this transaction writes to.
    pub fn engine(&self) -> &'a StorageEngine {
        self.engine
    }

    /// Read a value, seeing this transaction's own writes.
    pub fn get(&self, tree: &str, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        if let Some(cached) = self.write_cache.get(&(tree.to_string(), key.to_vec())) {
            return Ok(cached.clone());
        }
        Ok(self.engine.tree(tree)?.get(key)?.map(|v| v.to_vec()))
    }

    /// Queue an insert or overwrite.
    pub fn insert(&mut self, tree: &str, key: impl Into<Vec<u8>>, value: Vec<u8>) -> &mut Self {
        self.write_cache
            .insert((tree.to_string(), key.into()), Some(value));
        self
    }

    /// Queue a removal.
    pub fn remove(&mut self, tree: &str, key: impl Into<Vec<u8>>) -> &mut Self {
        self.write_cache.insert((tree.to_string(), key.into()), None);
        self
    }

    /// Scan all entries of a tree whose key starts with `prefix`, in key order.
    ///
    /// Committed entries are merged with this transaction's writes.
    pub fn scan_prefix(&self, tree: &str, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, Error> {
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = BTreeMap::new();
        for item in self.engine.tree(tree)?.scan_prefix(prefix) {
            let (key, value) = item?;
            merged.insert(key.to_vec(), value.to_vec());
        }

        for ((cached_tree, key), value) in &self.write_cache {
            if cached_tree != tree || !key.starts_with(prefix) {
                continue;
            }
            match value {
                Some(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        Ok(merged.into_iter().collect())
    }

    /// Number of pending writes.
    pub fn pending_writes(&self) -> usize {
        self.write_cache.len()
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.write_cache.is_empty()
    }

    /// Commit the transaction atomically.
    ///
    /// All writes succeed or none do.
    pub fn commit(self) -> Result<(), Error> {
        if self.write_cache.is_empty() {
            return Ok(());
        }

        let mut names: Vec<&str> = self
            .write_cache
            .keys()
            .map(|(tree, _)| tree.as_str())
            .collect();
        names.dedup();

        let trees = names
            .iter()
            .map(|name| self.engine.tree(name))
            .collect::<Result<Vec<Tree>, Error>>()?;

        let result: Result<(), TransactionError<Error>> =
            trees.as_slice().transaction(|views: &Vec<TransactionalTree>| {
                for ((tree, key), value) in &self.write_cache {
                    let index = names.iter().position(|n| *n == tree.as_str()).ok_or_else(|| {
                        ConflictableTransactionError::Abort(Error::InvalidData(format!(
                            "tree '{}' not opened for commit",
                            tree
                        )))
                    })?;
                    let view = &views[index];
                    match value {
                        Some(value) => {
                            view.insert(key.as_slice(), value.as_slice())?;
                        }
                        None => {
                            view.remove(key.as_slice())?;
                        }
                    }
                }
                Ok(())
            });

        match result {
            Ok(()) => {
                debug!(writes = self.write_cache.len(), trees = names.len(), "Transaction committed");
                Ok(())
            }
            Err(TransactionError::Abort(e)) => Err(e),
            Err(TransactionError::Storage(e)) => Err(Error::Storage(e)),
        }
    }
}
