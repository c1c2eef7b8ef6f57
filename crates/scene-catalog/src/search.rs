//! STAC API search: turn a search query into in-memory features.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use storage::{HttpClient, Locator};
use tracing::{info, instrument};

use crate::error::{CatalogError, Result};

/// Search request read from a configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct StacSearchConfig {
    /// Base URL of the STAC API
    pub api: String,
    /// Body posted to the search endpoint; `{}` when absent
    #[serde(default)]
    pub query: Option<Value>,
    /// Output key to STAC attribute mapping, replacing the default
    #[serde(default)]
    pub attribute_dict: Option<BTreeMap<String, String>>,
}

impl StacSearchConfig {
    pub fn search_url(&self) -> String {
        if self.api.ends_with('/') {
            format!("{}search", self.api)
        } else {
            format!("{}/search", self.api)
        }
    }
}

/// Run one search and return each feature as an embedded locator.
///
/// Anything other than a 200 GeoJSON `FeatureCollection` fails the search.
#[instrument(skip(client, config), fields(api = %config.api))]
pub async fn search(client: &HttpClient, config: &StacSearchConfig) -> Result<Vec<Locator>> {
    let body = config
        .query
        .clone()
        .unwrap_or_else(|| Value::Object(Default::default()));
    let response = client.post_json(&config.search_url(), &body).await?;

    if response.status != 200 {
        return Err(CatalogError::StacSearch(format!(
            "search returned status {}",
            response.status
        )));
    }
    let content_type = response
        .content_type
        .as_deref()
        .map(|ct| ct.to_ascii_lowercase().replace(' ', ""))
        .unwrap_or_default();
    if !is_json_content_type(&content_type) {
        return Err(CatalogError::StacSearch(format!(
            "unexpected content type '{}'",
            content_type
        )));
    }

    let features = parse_feature_collection(&response.body)?;
    info!(count = features.len(), "STAC search returned features");
    Ok(features)
}

fn is_json_content_type(content_type: &str) -> bool {
    content_type.starts_with("application/json") || content_type.starts_with("application/geo+json")
}

/// Features of a GeoJSON `FeatureCollection`.
pub fn parse_feature_collection(body: &[u8]) -> Result<Vec<Locator>> {
    let collection: Value = serde_json::from_slice(body)
        .map_err(|e| CatalogError::StacSearch(format!("invalid JSON: {}", e)))?;

    if collection.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(CatalogError::StacSearch(
            "response is not a FeatureCollection".to_string(),
        ));
    }

    Ok(collection
        .get("features")
        .and_then(Value::as_array)
        .map(|features| {
            features
                .iter()
                .map(|f| Locator::Embedded(Arc::new(f.clone())))
                .collect()
        })
        .unwrap_or_default())
}
