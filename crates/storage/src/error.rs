//! Error types for the storage crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while fetching a document.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Object store error: {0}")]
    ObjectStore(String),

    #[error("Invalid URI: {0}")]
    InvalidUri(String),

    #[error("Failed to create client: {0}")]
    Client(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
