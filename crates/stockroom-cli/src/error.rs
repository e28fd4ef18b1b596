//! CLI errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("no store at {}", .0.display())]
    MissingStore(PathBuf),

    #[error("cannot read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Store(#[from] stockroom_core::Error),
}
