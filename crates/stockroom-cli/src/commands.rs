//! Command implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use stockroom_core::catalog::{Catalog, EntityDef};
use stockroom_core::{Error, Repository, StorageConfig, StorageEngine};
use stockroom_inventory::inventory_schema;
use tracing::info;

use crate::error::CliError;
use crate::formatter::Formatter;

/// Outcome of checking a data directory.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub path: PathBuf,
    pub fingerprint: String,
    pub version: u64,
    pub recovered: bool,
    /// Row count per entity, in schema order.
    pub counts: Vec<(String, usize)>,
}

/// Load a storage configuration, falling back to defaults without a file.
pub fn load_config(path: Option<&Path>) -> Result<StorageConfig, CliError> {
    let Some(path) = path else {
        return Ok(StorageConfig::default());
    };

    let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Render the schema, or a single entity of it.
pub fn schema(formatter: &dyn Formatter, entity: Option<&str>) -> Result<String, CliError> {
    let schema = inventory_schema();

    let entities: Vec<&EntityDef> = match entity {
        Some(name) => vec![schema
            .get_entity(name)
            .ok_or_else(|| CliError::UnknownEntity(name.to_string()))?],
        None => schema.entities.iter().collect(),
    };

    Ok(formatter.format_schema(&schema, &entities))
}

/// Open an existing store, verify its schema fingerprint and count rows.
pub fn check(formatter: &dyn Formatter, config: StorageConfig) -> Result<String, CliError> {
    let report = check_store(config)?;
    Ok(formatter.format_check(&report))
}

fn check_store(config: StorageConfig) -> Result<CheckReport, CliError> {
    if !config.temporary && !config.path.exists() {
        return Err(CliError::MissingStore(config.path));
    }
    let path = config.path.clone();

    let schema = inventory_schema();
    let expected = schema.fingerprint()?;

    let engine = StorageEngine::open(config)?;
    let recovered = engine.was_recovered();
    if let Some(stored) = Catalog::stored_fingerprint(engine.db())? {
        if stored != expected {
            return Err(Error::SchemaMismatch { stored, expected }.into());
        }
    }

    let repo = Repository::with_engine(engine, Arc::new(schema))?;
    let counts = repo
        .registry()
        .entity_names()
        .into_iter()
        .map(|name| Ok((name.to_string(), repo.count(name)?)))
        .collect::<Result<Vec<_>, Error>>()?;

    info!(path = %path.display(), entities = counts.len(), "Store checked");

    Ok(CheckReport {
        path,
        fingerprint: repo.catalog().fingerprint().to_string(),
        version: repo.catalog().version(),
        recovered,
        counts,
    })
}
