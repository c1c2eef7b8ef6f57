//! Metadata reading: fetch a sidecar and parse it into a document.

use std::sync::Arc;

use storage::{DocumentFetcher, Locator};
use tracing::{debug, instrument, warn};

use crate::document::{lookup, MetadataDocument};
use crate::error::ItemError;
use crate::product::{BuilderKind, ProductSpec};
use crate::rpc::RpcModel;

/// A parsed sidecar plus the companion files its builder needs.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub document: MetadataDocument,
    /// Camera model from the `.rpb` file next to a single-scene sidecar
    pub rpc: Option<RpcModel>,
}

/// Reads sidecars through a fetcher and checks their top-level shape.
#[derive(Clone)]
pub struct MetadataReader {
    product: &'static ProductSpec,
    fetcher: Arc<dyn DocumentFetcher>,
}

impl MetadataReader {
    pub fn new(product: &'static ProductSpec, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { product, fetcher }
    }

    /// Fetch and parse one sidecar.
    ///
    /// Composite products must carry `image.bands`; a document without it is
    /// a schema failure for this locator only.
    #[instrument(skip(self), fields(product = self.product.name, locator = %locator))]
    pub async fn read(&self, locator: &Locator) -> Result<SourceDocument, ItemError> {
        let document = match locator {
            Locator::Embedded(value) => MetadataDocument::Tree(value.as_ref().clone()),
            _ => {
                let bytes = self.fetcher.fetch(locator).await?;
                MetadataDocument::parse(&bytes, self.product.format)?
            }
        };

        if self.product.builder == BuilderKind::Composite {
            require_bands(&document)?;
        }

        let rpc = match self.product.builder {
            BuilderKind::SingleScene => self.read_rpc(locator).await,
            _ => None,
        };

        Ok(SourceDocument { document, rpc })
    }

    /// The `.rpb` companion, if it exists and parses.
    async fn read_rpc(&self, locator: &Locator) -> Option<RpcModel> {
        let rpb = locator.with_extension("rpb")?;
        let bytes = match self.fetcher.fetch(&rpb).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(rpb = %rpb, error = %e, "RPC file unavailable; scene has no geodata transform");
                return None;
            }
        };
        match RpcModel::parse(&String::from_utf8_lossy(&bytes)) {
            Ok(model) => {
                debug!(rpb = %rpb, "Read RPC model");
                Some(model)
            }
            Err(e) => {
                warn!(rpb = %rpb, error = %e, "Ignoring malformed RPC file");
                None
            }
        }
    }
}

fn require_bands(document: &MetadataDocument) -> Result<(), ItemError> {
    let tree = document
        .as_tree()
        .ok_or_else(|| ItemError::Parse("expected a key-value document".to_string()))?;
    if lookup(tree, "image").is_none() {
        return Err(ItemError::MissingSection("image".to_string()));
    }
    if lookup(tree, "image.bands").is_none() {
        return Err(ItemError::MissingSection("image.bands".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::DocumentFormat;

    fn tree(yaml: &str) -> MetadataDocument {
        MetadataDocument::parse(yaml.as_bytes(), DocumentFormat::Yaml).unwrap()
    }

    #[test]
    fn test_require_bands() {
        assert!(require_bands(&tree("image:\n  bands:\n    blue: {path: b.tif}\n")).is_ok());
        assert!(matches!(
            require_bands(&tree("id: x\n")),
            Err(ItemError::MissingSection(s)) if s == "image"
        ));
        assert!(matches!(
            require_bands(&tree("image:\n  other: 1\n")),
            Err(ItemError::MissingSection(s)) if s == "image.bands"
        ));
    }
}
