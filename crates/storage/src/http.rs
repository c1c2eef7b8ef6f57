//! HTTP access for sidecar documents and search APIs.

use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client};
use tracing::{debug, instrument};

use crate::{Result, StorageError};

/// Raw response of a request whose status the caller inspects itself.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Thin wrapper over a shared reqwest client.
///
/// No request timeout is set: document downloads block until the server
/// finishes or the connection drops.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("scene-catalog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StorageError::Client(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// GET a URL, failing on any non-success status.
    #[instrument(skip(self))]
    pub async fn get(&self, url: &str) -> Result<Bytes> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(StorageError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        debug!(size = bytes.len(), "Downloaded document");
        Ok(bytes)
    }

    /// POST a JSON body and hand back status, content type and body.
    #[instrument(skip(self, body))]
    pub async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<HttpResponse> {
        let response = self.client.post(url).json(body).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        debug!(status, size = body.len(), "POST completed");
        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}
