//! Scene catalog pipeline.
//!
//! Turns source roots into catalog descriptors in four steps:
//! - [`PathDiscoverer`] yields sidecar locators from directories, manifests and URIs
//! - [`VariantExpander`] pairs each locator with the product's variant tags
//! - [`MetadataReader`] fetches and parses each sidecar once
//! - [`DescriptorAssembler`] builds one [`OutputRecord`] per item
//!
//! [`Crawler`] drives the four steps as one ordered stream.

pub mod assemble;
pub mod crawler;
pub mod discover;
pub mod document;
pub mod error;
pub mod expand;
pub mod item;
pub mod mrf;
pub mod product;
pub mod products;
pub mod reader;
pub mod record;
pub mod rpc;
pub mod search;

pub use assemble::{default_attribute_dict, DescriptorAssembler};
pub use crawler::{CrawlReport, CrawlSummary, Crawler, ItemFailure, ItemOutcome};
pub use discover::{DiscoveryOptions, PathDiscoverer};
pub use document::{MetadataDocument, XmlElement};
pub use error::{CatalogError, FailureKind, ItemError, Result};
pub use expand::{expand_from_document, Expansion, VariantExpander};
pub use item::CatalogItem;
pub use product::ProductSpec;
pub use products::{all_products, product_by_name};
pub use reader::{MetadataReader, SourceDocument};
pub use record::{BandReference, OutputRecord, RasterDescriptor, RasterInfo};
pub use search::StacSearchConfig;
pub use storage::Locator;
