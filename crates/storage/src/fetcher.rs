//! Unified document fetching across local, HTTP and S3 locators.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

use crate::{HttpClient, Locator, ObjectStorage, ObjectStorageConfig, Result, StorageError};

/// Trait for sources that can return a sidecar document's raw bytes.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Read the whole document behind `locator`.
    async fn fetch(&self, locator: &Locator) -> Result<Bytes>;
}

/// Fetcher dispatching on the locator kind.
///
/// S3 clients are created lazily, one per bucket, and reused for the rest of
/// the run.
pub struct SourceFetcher {
    http: HttpClient,
    s3_config: ObjectStorageConfig,
    buckets: Mutex<HashMap<String, Arc<ObjectStorage>>>,
}

impl SourceFetcher {
    pub fn new(s3_config: ObjectStorageConfig) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new()?,
            s3_config,
            buckets: Mutex::new(HashMap::new()),
        })
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    fn storage_for(&self, bucket: &str) -> Result<Arc<ObjectStorage>> {
        let mut buckets = self
            .buckets
            .lock()
            .map_err(|_| StorageError::Client("bucket client cache poisoned".to_string()))?;

        if let Some(storage) = buckets.get(bucket) {
            return Ok(storage.clone());
        }

        debug!(bucket = %bucket, requester_pays = self.s3_config.requester_pays, "Creating S3 client");
        let storage = Arc::new(ObjectStorage::for_bucket(bucket, &self.s3_config)?);
        buckets.insert(bucket.to_string(), storage.clone());
        Ok(storage)
    }
}

#[async_trait]
impl DocumentFetcher for SourceFetcher {
    #[instrument(skip(self), fields(locator = %locator))]
    async fn fetch(&self, locator: &Locator) -> Result<Bytes> {
        match locator {
            Locator::Local(path) => tokio::fs::read(path)
                .await
                .map(Bytes::from)
                .map_err(|source| StorageError::Io {
                    path: path.clone(),
                    source,
                }),
            Locator::Http(url) => self.http.get(url).await,
            Locator::S3 { bucket, key } => self.storage_for(bucket)?.get(key).await,
            Locator::Embedded(_) => Err(StorageError::InvalidUri(
                "embedded documents are already in memory".to_string(),
            )),
        }
    }
}
