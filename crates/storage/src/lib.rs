//! Storage access for scene sidecar documents.
//!
//! Provides a single fetch interface over:
//! - Local files
//! - HTTP(S) URLs
//! - S3 objects (optionally requester-pays)

pub mod error;
pub mod fetcher;
pub mod http;
pub mod locator;
pub mod object_store;

pub use self::object_store::{ObjectStorage, ObjectStorageConfig};
pub use error::{Result, StorageError};
pub use fetcher::{DocumentFetcher, SourceFetcher};
pub use http::{HttpClient, HttpResponse};
pub use locator::Locator;
