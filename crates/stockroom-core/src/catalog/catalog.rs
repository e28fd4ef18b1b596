//! Catalog manager for the schema a store was created with.

use super::SchemaRegistry;
use crate::error::Error;
use sled::{Batch, Db, Tree};
use tracing::info;

/// Tree name for catalog metadata.
pub const META_TREE: &str = "meta";

/// Key for the schema fingerprint in the meta tree.
const FINGERPRINT_KEY: &[u8] = b"schema_fingerprint";

/// Key for the schema version in the meta tree.
const VERSION_KEY: &[u8] = b"schema_version";

/// Key for the encoded registry in the meta tree.
const SCHEMA_KEY: &[u8] = b"schema";

/// Binds a store to one schema registry.
///
/// The first attach records the registry fingerprint, version and encoded
/// schema in one batch; later attaches must present a registry with the
/// same fingerprint.
pub struct Catalog {
    meta_tree: Tree,
    fingerprint: String,
    version: u64,
}

impl Catalog {
    /// Attach a registry to the store, recording it on first use.
    pub fn attach(db: &Db, registry: &SchemaRegistry) -> Result<Self, Error> {
        let meta_tree = db.open_tree(META_TREE)?;
        let expected = registry.fingerprint()?;

        match Self::read_fingerprint(&meta_tree)? {
            Some(stored) if stored != expected => {
                return Err(Error::SchemaMismatch { stored, expected });
            }
            Some(_) => {
                info!(fingerprint = %expected, version = registry.version, "Catalog attached");
            }
            None => {
                let mut batch = Batch::default();
                batch.insert(FINGERPRINT_KEY, expected.as_bytes());
                batch.insert(VERSION_KEY, registry.version.to_be_bytes().to_vec());
                batch.insert(SCHEMA_KEY, registry.to_bytes()?);
                meta_tree.apply_batch(batch)?;
                meta_tree.flush()?;
                info!(fingerprint = %expected, version = registry.version, "Catalog initialized");
            }
        }

        Ok(Self {
            meta_tree,
            fingerprint: expected,
            version: registry.version,
        })
    }

    /// Read the fingerprint recorded in a store, if any.
    pub fn stored_fingerprint(db: &Db) -> Result<Option<String>, Error> {
        let meta_tree = db.open_tree(META_TREE)?;
        Self::read_fingerprint(&meta_tree)
    }

    /// Read the registry recorded in a store, if any.
    pub fn stored_schema(db: &Db) -> Result<Option<SchemaRegistry>, Error> {
        let meta_tree = db.open_tree(META_TREE)?;
        match meta_tree.get(SCHEMA_KEY)? {
            Some(bytes) => Ok(Some(SchemaRegistry::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    fn read_fingerprint(meta_tree: &Tree) -> Result<Option<String>, Error> {
        match meta_tree.get(FINGERPRINT_KEY)? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| Error::InvalidData(format!("schema fingerprint: {}", e))),
            None => Ok(None),
        }
    }

    /// Fingerprint of the attached registry.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Version of the attached registry.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Flush catalog metadata to disk.
    pub fn flush(&self) -> Result<(), Error> {
        self.meta_tree.flush()?;
        Ok(())
    }
}
