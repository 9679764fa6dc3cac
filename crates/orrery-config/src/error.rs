//! Configuration error types.

use std::path::PathBuf;

/// Errors that can occur when loading, saving, or parsing settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the settings file.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create the settings directory or write the file.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid RON for [`Config`](crate::Config).
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// Failed to serialize settings to RON.
    #[error("failed to serialize config: {0}")]
    Serialize(#[source] ron::Error),
}
