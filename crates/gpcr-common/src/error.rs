//! Error types shared across the GPCR workspace

use std::path::Path;

use thiserror::Error;

/// Result type alias for shared GPCR operations
pub type Result<T> = std::result::Result<T, GpcrError>;

/// Main error type for file and configuration handling
#[derive(Error, Debug)]
pub enum GpcrError {
    #[error("Failed to read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GpcrError {
    /// Wrap an IO error with the path that caused it
    pub fn file(path: &Path, source: std::io::Error) -> Self {
        Self::File {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
