//! Static description of a product family.
//!
//! Everything that differs between product families (sidecar format, tag
//! policy, composite templates, band geometry) is data in a [`ProductSpec`].
//! Adding a variant means adding a table entry, not a code path.

use scene_common::PixelType;

use crate::document::MetadataDocument;
use crate::error::ItemError;

/// Serialisation of a product's sidecar documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
    Xml,
}

/// Which assembler turns a document into a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderKind {
    /// Band files listed under `image.bands`, stacked by a composite function.
    Composite,
    /// One raster file per document with RPC georeferencing.
    SingleScene,
    /// GeoJSON feature with band assets.
    Stac,
}

/// How display and group names are derived from a locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
    /// Sidecar file name up to the first `.`.
    FileStem,
    /// Name of the directory holding the sidecar.
    ParentDir,
    /// File name without its last extension, grouped by parent directory.
    Scene,
}

/// Result of choosing tags from a parsed document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentSelection {
    pub tags: Vec<&'static str>,
    pub product_name: Option<String>,
}

/// How a locator is expanded into variant tags.
#[derive(Clone, Copy)]
pub enum TagSelection {
    /// Every template, in table order.
    Enumerate,
    /// One tag chosen from the sidecar file name.
    FileName(fn(&str) -> Option<&'static str>),
    /// Tags chosen from the parsed document.
    Document(fn(&MetadataDocument) -> DocumentSelection),
}

impl std::fmt::Debug for TagSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagSelection::Enumerate => write!(f, "Enumerate"),
            TagSelection::FileName(_) => write!(f, "FileName"),
            TagSelection::Document(_) => write!(f, "Document"),
        }
    }
}

/// Declared layout of a remote band's cache descriptor.
///
/// Fixed per product and resolution; never read from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLayout {
    pub cols: u32,
    pub rows: u32,
    pub bands: u32,
    pub data_type: Option<&'static str>,
    pub no_data: Option<&'static str>,
}

/// Raster geometry declared for one band slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandGeometry {
    pub pixel_type: PixelType,
    pub cols: u32,
    pub rows: u32,
    pub bands: u32,
    pub cache: CacheLayout,
}

impl BandGeometry {
    /// Square single-band geometry whose cache layout matches the raster.
    pub const fn square(
        pixel_type: PixelType,
        size: u32,
        data_type: Option<&'static str>,
        no_data: Option<&'static str>,
    ) -> Self {
        Self {
            pixel_type,
            cols: size,
            rows: size,
            bands: 1,
            cache: CacheLayout {
                cols: size,
                rows: size,
                bands: 1,
                data_type,
                no_data,
            },
        }
    }
}

/// One band of a composite template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandSlot {
    /// Key under `image.bands`, or the asset name for STAC items
    pub name: &'static str,
    /// Alternate key tried when `name` is absent
    pub fallback: Option<&'static str>,
    /// Declared geometry; bands without one carry no raster info block
    pub geometry: Option<BandGeometry>,
}

impl BandSlot {
    pub const fn new(name: &'static str, geometry: BandGeometry) -> Self {
        Self {
            name,
            fallback: None,
            geometry: Some(geometry),
        }
    }

    pub const fn with_fallback(
        name: &'static str,
        fallback: &'static str,
        geometry: BandGeometry,
    ) -> Self {
        Self {
            name,
            fallback: Some(fallback),
            geometry: Some(geometry),
        }
    }

    /// A band referenced by name only.
    pub const fn asset(name: &'static str) -> Self {
        Self {
            name,
            fallback: None,
            geometry: None,
        }
    }
}

/// A scalar copied from the document into the descriptor's key properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataField {
    /// Key in the output
    pub key: &'static str,
    /// Dotted path in the document
    pub path: &'static str,
}

/// Fields common to Open Data Cube style sidecars.
pub const ODC_FIELDS: &[MetadataField] = &[
    MetadataField { key: "Instrument", path: "instrument.name" },
    MetadataField { key: "Platform", path: "platform.code" },
    MetadataField { key: "ProductType", path: "product_type" },
    MetadataField { key: "ID", path: "id" },
];

/// Composite template selected by a variant tag.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub tag: &'static str,
    /// Composite function stacking the bands; single-raster templates have none
    pub raster_function: Option<&'static str>,
    /// Product name reported for items of this tag, when fixed
    pub product_name: Option<&'static str>,
    pub bands: &'static [BandSlot],
}

impl Template {
    /// Composite function stacking the bands; required by the composite builders.
    pub fn composite_function(&self) -> Result<&'static str, ItemError> {
        self.raster_function.ok_or_else(|| {
            ItemError::invalid(
                "rasterFunction",
                format!("template '{}' has no composite function", self.tag),
            )
        })
    }
}

/// Everything the pipeline needs to know about one product family.
#[derive(Debug)]
pub struct ProductSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub format: DocumentFormat,
    pub builder: BuilderKind,
    /// Suffixes a sidecar file name must end with
    pub extensions: &'static [&'static str],
    /// `;`-separated glob patterns used for non-recursive directory scans
    pub default_filter: &'static str,
    pub selection: TagSelection,
    pub templates: &'static [Template],
    /// Scalars copied into key properties, in addition to the acquisition time
    pub fields: &'static [MetadataField],
    pub naming: Naming,
    pub requester_pays: bool,
    /// Sub-directory of the cache root holding this product's caches
    pub cache_subdir: Option<&'static str>,
    pub sensor_name: Option<&'static str>,
    /// File-name tokens whose swapped sibling is yielded alongside a direct root
    pub paired_tokens: Option<(&'static str, &'static str)>,
}

impl ProductSpec {
    pub fn template(&self, tag: &str) -> Option<&'static Template> {
        self.templates.iter().find(|t| t.tag == tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.templates.iter().map(|t| t.tag)
    }

    /// Whether a file name carries one of the sidecar extensions.
    pub fn is_sidecar_name(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        self.extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_ascii_lowercase()))
    }
}
