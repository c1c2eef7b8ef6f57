//! Descriptor assembly: turn one item and its document into a record.

mod composite;
mod scene;
mod stac;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::ItemError;
use crate::item::CatalogItem;
use crate::mrf::DEFAULT_CACHE_ROOT;
use crate::product::{BuilderKind, ProductSpec};
use crate::reader::SourceDocument;
use crate::record::OutputRecord;

pub use stac::default_attribute_dict;

/// Builds descriptors for one product family.
///
/// Building is a pure function of the item and its document, so the same
/// inputs always give the same record.
#[derive(Debug, Clone)]
pub struct DescriptorAssembler {
    product: &'static ProductSpec,
    cache_root: String,
    attribute_dict: BTreeMap<String, String>,
}

impl DescriptorAssembler {
    pub fn new(product: &'static ProductSpec) -> Self {
        Self {
            product,
            cache_root: DEFAULT_CACHE_ROOT.to_string(),
            attribute_dict: default_attribute_dict(),
        }
    }

    /// Root directory for MRF cache files.
    pub fn with_cache_root(mut self, cache_root: impl Into<String>) -> Self {
        self.cache_root = cache_root.into();
        self
    }

    /// Output key to STAC attribute mapping; replaces the default mapping.
    pub fn with_attribute_dict(mut self, attribute_dict: BTreeMap<String, String>) -> Self {
        self.attribute_dict = attribute_dict;
        self
    }

    pub fn product(&self) -> &'static ProductSpec {
        self.product
    }

    pub fn build(&self, item: &CatalogItem, source: &SourceDocument) -> Result<OutputRecord, ItemError> {
        match self.product.builder {
            BuilderKind::Composite => {
                composite::build(self.product, &self.cache_root, item, &source.document)
            }
            BuilderKind::SingleScene => {
                scene::build(self.product, item, &source.document, source.rpc.as_ref())
            }
            BuilderKind::Stac => stac::build(self.product, &self.attribute_dict, item, &source.document),
        }
    }
}

/// First ring of a GeoJSON-style coordinate list, if every vertex is numeric.
pub(crate) fn ring(value: &Value) -> Option<Vec<[f64; 2]>> {
    value
        .as_array()?
        .iter()
        .map(|vertex| {
            let pair = vertex.as_array()?;
            match (pair.first()?.as_f64(), pair.get(1)?.as_f64()) {
                (Some(x), Some(y)) => Some([x, y]),
                _ => None,
            }
        })
        .collect()
}
