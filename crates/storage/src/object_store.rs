//! Object storage access for sidecar documents on S3.

use bytes::Bytes;
use object_store::{aws::AmazonS3Builder, path::Path, ObjectStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{Result, StorageError};

/// Configuration for S3 connections.
///
/// Unset credentials fall back to the standard AWS environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectStorageConfig {
    /// Custom endpoint (MinIO, LocalStack); AWS when absent
    pub endpoint: Option<String>,
    /// AWS region
    pub region: String,
    /// Access key ID
    pub access_key_id: Option<String>,
    /// Secret access key
    pub secret_access_key: Option<String>,
    /// Allow HTTP (for local endpoints)
    pub allow_http: bool,
    /// Send the requester-pays header with every request
    pub requester_pays: bool,
}

impl Default for ObjectStorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: "ap-southeast-2".to_string(),
            access_key_id: None,
            secret_access_key: None,
            allow_http: false,
            requester_pays: false,
        }
    }
}

/// Read-only client for one bucket.
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectStorage {
    /// Create a client for `bucket` from config.
    pub fn for_bucket(bucket: &str, config: &ObjectStorageConfig) -> Result<Self> {
        if bucket.is_empty() {
            return Err(StorageError::InvalidUri("empty bucket name".to_string()));
        }

        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(&config.region);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        if let Some(key_id) = &config.access_key_id {
            builder = builder.with_access_key_id(key_id);
        }
        if let Some(secret) = &config.secret_access_key {
            builder = builder.with_secret_access_key(secret);
        }
        if config.allow_http {
            builder = builder.with_allow_http(true);
        }
        if config.requester_pays {
            builder = builder.with_request_payer(true);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::Client(format!("Failed to create S3 client: {}", e)))?;

        Ok(Self {
            store: Arc::new(store),
            bucket: bucket.to_string(),
        })
    }

    /// Wrap an existing store, e.g. an in-memory one.
    pub fn from_store(bucket: &str, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
        }
    }

    /// Read the whole object at `key`.
    #[instrument(skip(self), fields(bucket = %self.bucket, key = %key))]
    pub async fn get(&self, key: &str) -> Result<Bytes> {
        if key.is_empty() {
            return Err(StorageError::InvalidUri(format!(
                "s3://{}/ has no object key",
                self.bucket
            )));
        }
        // Keys are taken verbatim, without percent-encoding.
        let location = Path::parse(key)
            .map_err(|e| StorageError::InvalidUri(format!("s3://{}/{}: {}", self.bucket, key, e)))?;

        let result = self.store.get(&location).await.map_err(|e| {
            StorageError::ObjectStore(format!("Failed to read s3://{}/{}: {}", self.bucket, key, e))
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::ObjectStore(format!("Failed to read bytes: {}", e)))?;

        debug!(size = bytes.len(), "Read object");
        Ok(bytes)
    }
}
