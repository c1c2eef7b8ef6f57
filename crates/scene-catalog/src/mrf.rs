//! Band file resolution and MRF cache descriptors for remote rasters.
//!
//! Remote band files are not referenced directly. Each one is wrapped in a
//! small MRF document that points at the remote file through a GDAL virtual
//! filesystem prefix and declares a local LERC cache for it. The declared
//! size and data type come from the product table, not from the document.

use std::fmt::Write;
use std::path::Path;

use scene_common::{BoundingBox, SpatialReference};
use storage::Locator;

use crate::error::ItemError;
use crate::product::{BandGeometry, CacheLayout};

/// Cache root used when none is configured.
pub const DEFAULT_CACHE_ROOT: &str = "z:/mrfcache";

const PAGE_SIZE: u32 = 512;

/// Virtual filesystem location of a remote document's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    /// GDAL prefix without the leading `/`, e.g. `vsicurl/https://`
    pub protocol: &'static str,
    /// Document URI without its scheme, up to the last `/`
    pub input_dir: String,
    /// `input_dir` with the S3 website host suffix removed
    pub cache_path: String,
}

impl RemoteSource {
    pub fn for_locator(locator: &Locator) -> Option<Self> {
        let (protocol, rest) = match locator {
            Locator::Http(url) => {
                if let Some(rest) = url.strip_prefix("https://") {
                    ("vsicurl/https://", rest.to_string())
                } else {
                    ("vsicurl/http://", url.strip_prefix("http://")?.to_string())
                }
            }
            Locator::S3 { bucket, key } => ("vsis3/", format!("{}/{}", bucket, key)),
            Locator::Local(_) | Locator::Embedded(_) => return None,
        };

        let input_dir = match rest.rfind('/') {
            Some(idx) => rest[..idx].to_string(),
            None => rest,
        };
        let cache_path = input_dir.replace(".s3.amazonaws.com", "");
        Some(Self {
            protocol,
            input_dir,
            cache_path,
        })
    }

    /// Virtual path of a file next to the document.
    pub fn virtual_path(&self, file: &str) -> String {
        format!("/{}{}/{}", self.protocol, self.input_dir, file)
    }
}

/// One MRF cache descriptor, ready to render.
#[derive(Debug, Clone)]
pub struct CacheDescriptor<'a> {
    pub source: &'a RemoteSource,
    /// Band file path relative to the document directory
    pub file: &'a str,
    pub layout: &'a CacheLayout,
    pub extent: &'a BoundingBox,
    pub spatial_reference: &'a SpatialReference,
    pub cache_root: &'a str,
    pub cache_subdir: Option<&'a str>,
}

impl CacheDescriptor<'_> {
    /// Location of the local cache file.
    pub fn cache_file(&self) -> String {
        let stem = match self.file.rfind('.') {
            Some(idx) if idx > 0 => &self.file[..idx],
            _ => self.file,
        };
        let mut path = self.cache_root.trim_end_matches('/').to_string();
        if let Some(subdir) = self.cache_subdir {
            path.push('/');
            path.push_str(subdir.trim_matches('/'));
        }
        format!("{}/{}/{}.mrf_cache", path, self.source.cache_path, stem)
    }

    pub fn render(&self) -> String {
        let cache_file = self.cache_file();
        let mut out = String::with_capacity(768);

        // Writing to a String cannot fail.
        let _ = writeln!(out, "<MRF_META>");
        let _ = writeln!(out, "  <CachedSource>");
        let _ = writeln!(out, "    <Source>{}</Source>", self.source.virtual_path(self.file));
        let _ = writeln!(out, "  </CachedSource>");
        let _ = writeln!(out, "  <Raster>");
        let _ = writeln!(
            out,
            "    <Size c=\"{}\" x=\"{}\" y=\"{}\"/>",
            self.layout.bands, self.layout.cols, self.layout.rows
        );
        let _ = writeln!(
            out,
            "    <PageSize c=\"1\" x=\"{}\" y=\"{}\"/>",
            PAGE_SIZE, PAGE_SIZE
        );
        let _ = writeln!(out, "    <Compression>LERC</Compression>");
        if let Some(data_type) = self.layout.data_type {
            let _ = writeln!(out, "    <DataType>{}</DataType>", data_type);
        }
        if let Some(no_data) = self.layout.no_data {
            let _ = writeln!(out, "    <DataValues NoData=\"{}\"/>", no_data);
        }
        let _ = writeln!(
            out,
            "    <DataFile>{0}</DataFile><IndexFile>{0}</IndexFile></Raster>",
            cache_file
        );
        let _ = writeln!(out, "  <Rsets model=\"uniform\" scale=\"2\"/>");
        let _ = writeln!(out, "  <GeoTags>");
        let _ = writeln!(
            out,
            "    <BoundingBox maxx=\"{}\" maxy=\"{}\" minx=\"{}\" miny=\"{}\"/>",
            format_coord(self.extent.max_x),
            format_coord(self.extent.max_y),
            format_coord(self.extent.min_x),
            format_coord(self.extent.min_y)
        );
        let _ = writeln!(out, "    <Projection>{}</Projection>", self.spatial_reference);
        let _ = writeln!(out, "  </GeoTags>");
        let _ = writeln!(out, "  <Options>V2=ON</Options>");
        out.push_str("</MRF_META>");
        out
    }
}

/// Decimal form of a coordinate; whole numbers keep one decimal place.
pub fn format_coord(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Per-document inputs shared by all of a record's bands.
#[derive(Debug, Clone, Copy)]
pub struct BandContext<'a> {
    pub locator: &'a Locator,
    pub extent: &'a BoundingBox,
    pub spatial_reference: &'a SpatialReference,
    pub cache_root: &'a str,
    pub cache_subdir: Option<&'a str>,
}

impl BandContext<'_> {
    /// URI a consumer opens for one band.
    ///
    /// - an absolute remote URI is used as-is
    /// - local documents join the band path onto their directory
    /// - remote documents get a cache descriptor when the band declares a
    ///   geometry, or a bare virtual path otherwise
    pub fn resolve(&self, band_path: &str, geometry: Option<&BandGeometry>) -> Result<String, ItemError> {
        let band_path = band_path.trim();
        if band_path.is_empty() {
            return Err(ItemError::invalid("path", "empty band path"));
        }
        if Locator::is_remote_uri(band_path) {
            return Ok(band_path.to_string());
        }
        match (RemoteSource::for_locator(self.locator), geometry) {
            (Some(source), Some(geometry)) => Ok(CacheDescriptor {
                source: &source,
                file: band_path,
                layout: &geometry.cache,
                extent: self.extent,
                spatial_reference: self.spatial_reference,
                cache_root: self.cache_root,
                cache_subdir: self.cache_subdir,
            }
            .render()),
            _ => Ok(resolve_href(self.locator, band_path)),
        }
    }
}

/// A path written relative to a document, made openable on its own.
///
/// Remote documents yield a GDAL virtual path; absolute URIs and hrefs of
/// in-memory documents are returned unchanged.
pub fn resolve_href(locator: &Locator, href: &str) -> String {
    if Locator::is_remote_uri(href) {
        return href.to_string();
    }
    match locator {
        Locator::Local(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            dir.join(href).to_string_lossy().into_owned()
        }
        Locator::Http(_) | Locator::S3 { .. } => match RemoteSource::for_locator(locator) {
            Some(source) => source.virtual_path(href),
            None => href.to_string(),
        },
        Locator::Embedded(_) => href.to_string(),
    }
}
