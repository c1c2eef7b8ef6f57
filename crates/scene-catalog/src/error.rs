//! Error types for the scene catalog crate.

use std::path::PathBuf;
use thiserror::Error;

use storage::StorageError;

/// Errors that stop a whole crawl.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("No source paths given")]
    NoRoots,

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Invalid filter pattern '{pattern}': {message}")]
    InvalidFilter { pattern: String, message: String },

    #[error("Failed to read manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("STAC search failed: {0}")]
    StacSearch(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for run-level operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Coarse classification of a per-item failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// The document could not be read.
    Fetch,
    /// The document was read but is not valid YAML/JSON/XML.
    Parse,
    /// A required section, band or field is absent or has the wrong type.
    Schema,
    /// The document is well formed but describes nothing this product catalogs.
    NotApplicable,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Fetch => "fetch",
            FailureKind::Parse => "parse",
            FailureKind::Schema => "schema",
            FailureKind::NotApplicable => "not_applicable",
        }
    }
}

/// Errors that drop a single catalog item.
#[derive(Error, Debug)]
pub enum ItemError {
    #[error("Failed to fetch document: {0}")]
    Fetch(#[from] StorageError),

    #[error("Failed to parse document: {0}")]
    Parse(String),

    #[error("Missing required section: {0}")]
    MissingSection(String),

    #[error("Band '{band}' not found{}", fallback_note(.fallback))]
    MissingBand {
        band: String,
        fallback: Option<&'static str>,
    },

    #[error("Invalid value for '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Nothing to catalog: {0}")]
    NotApplicable(String),
}

fn fallback_note(fallback: &Option<&'static str>) -> String {
    match fallback {
        Some(name) => format!(" (also tried '{}')", name),
        None => String::new(),
    }
}

impl ItemError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ItemError::Fetch(_) => FailureKind::Fetch,
            ItemError::Parse(_) => FailureKind::Parse,
            ItemError::MissingSection(_)
            | ItemError::MissingBand { .. }
            | ItemError::InvalidField { .. } => FailureKind::Schema,
            ItemError::NotApplicable(_) => FailureKind::NotApplicable,
        }
    }

    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ItemError::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
