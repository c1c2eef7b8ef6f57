//! Assembled descriptors and their JSON rendering.
//!
//! Key names and nesting follow what the mosaic consumer reads, so the
//! rendering is written out by hand rather than derived.

use std::collections::BTreeMap;

use scene_common::{BoundingBox, PixelType, SpatialReference};
use serde_json::{json, Map, Value};

use crate::item::CatalogItem;

/// Geometry of one raster as declared by the product table.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterInfo {
    pub pixel_type: PixelType,
    pub ncols: u32,
    pub nrows: u32,
    pub nbands: u32,
    pub spatial_reference: SpatialReference,
    pub extent: BoundingBox,
}

impl RasterInfo {
    fn to_json(&self) -> Value {
        json!({
            "pixelType": self.pixel_type,
            "ncols": self.ncols,
            "nRows": self.nrows,
            "nBands": self.nbands,
            "spatialReference": self.spatial_reference,
            "xMin": self.extent.min_x,
            "yMin": self.extent.min_y,
            "xMax": self.extent.max_x,
            "yMax": self.extent.max_y,
        })
    }
}

/// One resolved band of a composite.
#[derive(Debug, Clone, PartialEq)]
pub struct BandReference {
    /// Logical band name from the template
    pub name: String,
    /// Path, URI or cache descriptor text
    pub uri: String,
    pub raster_info: Option<RasterInfo>,
}

/// Geometry block of a single-raster scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneRasterInfo {
    pub pixel_type: PixelType,
    pub ncols: u32,
    pub nrows: u32,
    pub nbands: u32,
    pub spatial_reference: SpatialReference,
    /// Serialized RPC transform, when the scene ships one
    pub geodata_xform: Option<String>,
    pub extent: BoundingBox,
}

/// What the consumer opens for a record.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterDescriptor {
    /// Bands stacked by a named raster function.
    Composite {
        raster_function: String,
        bands: Vec<BandReference>,
    },
    /// A single raster file.
    Single { uri: String, info: SceneRasterInfo },
}

impl RasterDescriptor {
    fn to_json(&self) -> Value {
        match self {
            RasterDescriptor::Composite {
                raster_function,
                bands,
            } => {
                let mut arguments = Map::new();
                for (idx, band) in bands.iter().enumerate() {
                    let key = format!("Raster{}", idx + 1);
                    if let Some(info) = &band.raster_info {
                        arguments.insert(format!("{}_rasterInfo", key), info.to_json());
                    }
                    arguments.insert(key, Value::String(band.uri.clone()));
                }
                json!({
                    "functionDataset": {
                        "rasterFunction": raster_function,
                        "rasterFunctionArguments": arguments,
                    }
                })
            }
            RasterDescriptor::Single { uri, info } => {
                let mut raster_info = json!({
                    "pixelType": info.pixel_type,
                    "nCols": info.ncols,
                    "nRows": info.nrows,
                    "nBands": info.nbands,
                    "spatialReference": info.spatial_reference,
                    "XMin": info.extent.min_x,
                    "YMin": info.extent.min_y,
                    "XMax": info.extent.max_x,
                    "YMax": info.extent.max_y,
                });
                if let (Some(xform), Some(map)) = (&info.geodata_xform, raster_info.as_object_mut()) {
                    map.insert("geodataXform".to_string(), Value::String(xform.clone()));
                }
                json!({ "uri": uri, "rasterInfo": raster_info })
            }
        }
    }
}

/// The descriptor produced for one catalog item.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub raster: RasterDescriptor,
    pub spatial_reference: Option<SpatialReference>,
    pub variables: BTreeMap<String, Value>,
    pub item: CatalogItem,
    pub key_properties: BTreeMap<String, Value>,
    /// First ring of the valid-data polygon
    pub footprint: Option<Vec<[f64; 2]>>,
    pub no_data: Option<Vec<f64>>,
}

impl OutputRecord {
    /// Bands of a composite record, empty for single rasters.
    pub fn bands(&self) -> &[BandReference] {
        match &self.raster {
            RasterDescriptor::Composite { bands, .. } => bands,
            RasterDescriptor::Single { .. } => &[],
        }
    }

    pub fn raster_function(&self) -> Option<&str> {
        match &self.raster {
            RasterDescriptor::Composite {
                raster_function, ..
            } => Some(raster_function),
            RasterDescriptor::Single { .. } => None,
        }
    }

    /// Render the descriptor. Maps are key-sorted, so equal records render
    /// to identical text.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("raster".to_string(), self.raster.to_json());
        if let Some(srs) = &self.spatial_reference {
            out.insert("spatialReference".to_string(), json!(srs));
        }
        if !self.variables.is_empty() {
            out.insert("variables".to_string(), json!(self.variables));
        }
        out.insert("itemUri".to_string(), self.item.to_json());
        out.insert("keyProperties".to_string(), json!(self.key_properties));
        if let Some(footprint) = &self.footprint {
            out.insert("footprint".to_string(), json!(footprint));
        }
        if let Some(no_data) = &self.no_data {
            out.insert("noData".to_string(), json!(no_data));
        }
        Value::Object(out)
    }
}
