//! Error types for reading and writing crawl artifacts.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while storing or loading artifacts.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configured output root does not exist.
    #[error("output root {} does not exist", .0.display())]
    MissingOutputRoot(PathBuf),

    /// Manifest content is inconsistent with the files on disk.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// Run configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// Whether this is a usage precondition failure rather than an I/O or
    /// data failure.
    pub fn is_precondition(&self) -> bool {
        matches!(self, StoreError::MissingOutputRoot(_))
    }
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
