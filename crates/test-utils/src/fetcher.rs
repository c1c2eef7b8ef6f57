//! In-memory document fetcher.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use storage::{DocumentFetcher, Locator, Result, StorageError};

/// Serves documents from a map keyed by locator URI and records each request.
///
/// Local locators missing from the map are read from disk; other unknown URIs
/// fail like a 404 from an HTTP server.
#[derive(Default)]
pub struct MemoryFetcher {
    documents: HashMap<String, Bytes>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, uri: &str, body: impl Into<Bytes>) -> Self {
        self.documents.insert(uri.to_string(), body.into());
        self
    }

    /// URIs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DocumentFetcher for MemoryFetcher {
    async fn fetch(&self, locator: &Locator) -> Result<Bytes> {
        let uri = locator.uri();
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(uri.clone());
        }
        if let Some(body) = self.documents.get(&uri) {
            return Ok(body.clone());
        }
        match locator {
            Locator::Local(path) => tokio::fs::read(path)
                .await
                .map(Bytes::from)
                .map_err(|source| StorageError::Io {
                    path: path.clone(),
                    source,
                }),
            _ => Err(StorageError::HttpStatus { url: uri, status: 404 }),
        }
    }
}
