//! Single-raster descriptors for SuperView-1 XML and DIMAP sidecars.

use std::collections::BTreeMap;
use std::str::FromStr;

use scene_common::{normalize_acquisition_time, BoundingBox, PixelType, SpatialReference};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::document::{MetadataDocument, XmlElement};
use crate::error::ItemError;
use crate::item::CatalogItem;
use crate::product::ProductSpec;
use crate::products::product_level;
use crate::record::{OutputRecord, RasterDescriptor, SceneRasterInfo};
use crate::rpc::RpcModel;

const MS_BAND_NAMES: [&str; 4] = ["Blue", "Green", "Red", "NearInfrared"];

/// Facts read from either sidecar flavour.
struct Scene {
    uri: String,
    pixel_type: PixelType,
    max_input: u32,
    ncols: u32,
    nrows: u32,
    nbands: u32,
    spatial_reference: SpatialReference,
    extent: BoundingBox,
    footprint: Option<Vec<[f64; 2]>>,
    key_properties: BTreeMap<String, Value>,
}

pub(super) fn build(
    product: &'static ProductSpec,
    item: &CatalogItem,
    document: &MetadataDocument,
    rpc: Option<&RpcModel>,
) -> Result<OutputRecord, ItemError> {
    let root = document
        .as_xml()
        .ok_or_else(|| ItemError::Parse("expected an XML document".to_string()))?;

    let is_dimap = item.locator.extension().as_deref() == Some("dim") || root.name == "Dimap_Document";
    let mut scene = if is_dimap {
        read_dimap(item, root)?
    } else {
        read_scene_xml(item, root)?
    };

    if let Some(sensor) = product.sensor_name {
        scene.key_properties.insert("SensorName".to_string(), json!(sensor));
    }
    if let Some(level) = product_level(root) {
        scene.key_properties.insert("ProductType".to_string(), json!(level));
    }
    if let Some(model) = rpc {
        scene.key_properties.insert("CONSTANTZ".to_string(), json!(model.height_offset()));
    }

    let variables = BTreeMap::from([
        ("DefaultMaximumInput".to_string(), json!(scene.max_input)),
        ("DefaultGamma".to_string(), json!(1)),
    ]);

    Ok(OutputRecord {
        raster: RasterDescriptor::Single {
            uri: scene.uri,
            info: SceneRasterInfo {
                pixel_type: scene.pixel_type,
                ncols: scene.ncols,
                nrows: scene.nrows,
                nbands: scene.nbands,
                spatial_reference: scene.spatial_reference.clone(),
                geodata_xform: rpc.map(RpcModel::geodata_xform),
                extent: scene.extent,
            },
        },
        spatial_reference: Some(scene.spatial_reference),
        variables,
        item: item.clone(),
        key_properties: scene.key_properties,
        footprint: scene.footprint,
        no_data: Some(vec![0.0]),
    })
}

// ---------------------------------------------------------------------------
// Plain XML
// ---------------------------------------------------------------------------

fn read_scene_xml(item: &CatalogItem, root: &XmlElement) -> Result<Scene, ItemError> {
    let nbands: u32 = required(root, "Bands")?;
    let ncols: u32 = required(root, "WidthInPixels")?;
    let nrows: u32 = required(root, "HeightInPixels")?;
    let (pixel_type, max_input) = pixel_depth(required(root, "PixelBits")?)?;

    let corner = |name: &str| root.parse_text::<f64>(name);
    let corners = [
        (corner("TopLeftLongitude"), corner("TopLeftLatitude")),
        (corner("TopRightLongitude"), corner("TopRightLatitude")),
        (corner("BottomRightLongitude"), corner("BottomRightLatitude")),
        (corner("BottomLeftLongitude"), corner("BottomLeftLatitude")),
    ];
    let footprint: Option<Vec<[f64; 2]>> = corners
        .iter()
        .map(|(x, y)| Some([(*x)?, (*y)?]))
        .collect();

    let (spatial_reference, extent) = if product_level(root) == Some("LEVEL1B") {
        let corners = footprint
            .as_ref()
            .ok_or_else(|| ItemError::MissingSection("TopLeftLatitude".to_string()))?;
        // Level 1B has no map projection; the corner coordinates bound it.
        let (tl, br) = (corners[0], corners[2]);
        (
            SpatialReference::Epsg(scene_common::crs::WGS84),
            BoundingBox::new(tl[0], br[1], br[0], tl[1]),
        )
    } else {
        let lat: f64 = required(root, "CenterLatitude")?;
        let lon: f64 = required(root, "CenterLongitude")?;
        let srs = SpatialReference::utm_for(lon, lat)
            .map_err(|e| ItemError::invalid("CenterLongitude", e.to_string()))?;
        let extent = BoundingBox::new(
            required(root, "TopLeftMapX")?,
            required(root, "BottomRightMapY")?,
            required(root, "BottomRightMapX")?,
            required(root, "TopLeftMapY")?,
        );
        (srs, extent)
    };

    let mut props = BTreeMap::new();
    if let Some(band_properties) = gain_band_properties(root) {
        props.insert("bandProperties".to_string(), Value::Array(band_properties));
    }
    if let Some(time) = root.text("CenterTime") {
        props.insert("AcquisitionDate".to_string(), json!(acquisition_time(time)));
    }
    put(&mut props, "SunElevation", root.parse_text("SolarZenith"));
    put(&mut props, "SunAzimuth", root.parse_text("SolarAzimuth"));
    put(&mut props, "SensorElevation", root.parse_text("SatelliteZenith"));
    put(&mut props, "SensorAzimuth", root.parse_text("SatelliteAzimuth"));
    if let (Some(pitch), Some(roll)) = (
        root.parse_text::<f64>("PitchSatelliteAngle"),
        root.parse_text::<f64>("RollSatelliteAngle"),
    ) {
        props.insert("OffNadir".to_string(), json!(pitch.hypot(roll)));
    }
    put(&mut props, "CloudCover", root.parse_text("CloudPercent"));
    if let Some(path) = root.parse_text::<i64>("ScenePath") {
        props.insert("ScenePath".to_string(), json!(path));
    }
    if let Some(row) = root.parse_text::<i64>("SceneRow") {
        props.insert("SceneRow".to_string(), json!(row));
    }

    let uri = item
        .locator
        .with_extension("tiff")
        .map(|l| l.uri())
        .ok_or_else(|| ItemError::invalid("path", "sidecar has no file name"))?;

    Ok(Scene {
        uri,
        pixel_type,
        max_input,
        ncols,
        nrows,
        nbands,
        spatial_reference,
        extent,
        footprint,
        key_properties: props,
    })
}

/// Radiance calibration from the `Gain` and `Offset` lists.
fn gain_band_properties(root: &XmlElement) -> Option<Vec<Value>> {
    let parse_list = |text: &str| -> Option<Vec<f64>> {
        text.split(',').map(|v| v.trim().parse().ok()).collect()
    };
    let gains = parse_list(root.text("Gain")?)?;
    let offsets = parse_list(root.text("Offset")?)?;

    Some(
        gains
            .iter()
            .zip(&offsets)
            .enumerate()
            .map(|(idx, (gain, offset))| {
                let name = if gains.len() == 1 {
                    "Panchromatic".to_string()
                } else {
                    MS_BAND_NAMES
                        .get(idx)
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| format!("Band{}", idx + 1))
                };
                json!({ "bandName": name, "RadianceGain": gain, "RadianceBias": offset })
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// DIMAP
// ---------------------------------------------------------------------------

const SCENE_SOURCE: &str = "Dataset_Sources/Source_Information/Scene_Source";

fn read_dimap(item: &CatalogItem, root: &XmlElement) -> Result<Scene, ItemError> {
    let wkt = root
        .text("Coordinate_Reference_System/PROJECTION")
        .or_else(|| root.text("Dataset_Sources/Source_Information/Coordinate_Reference_System/Projection_OGCWKT"))
        .ok_or_else(|| ItemError::MissingSection("Coordinate_Reference_System".to_string()))?;
    let spatial_reference = SpatialReference::parse(wkt)
        .map_err(|e| ItemError::invalid("Coordinate_Reference_System", e.to_string()))?;

    let href = root
        .find("Data_Access/Data_File/DATA_FILE_PATH")
        .and_then(|e| e.attr("href"))
        .ok_or_else(|| ItemError::MissingSection("Data_Access/Data_File/DATA_FILE_PATH".to_string()))?;
    let uri = item
        .locator
        .sibling(href)
        .map(|l| l.uri())
        .ok_or_else(|| ItemError::invalid("DATA_FILE_PATH", "cannot resolve data file"))?;

    let vertices: Vec<[f64; 2]> = root
        .find("Dataset_Frame")
        .map(|frame| {
            frame
                .children_named("Vertex")
                .filter_map(|v| Some([v.parse_text("FRAME_LON")?, v.parse_text("FRAME_LAT")?]))
                .collect()
        })
        .unwrap_or_default();
    let extent = BoundingBox::enclosing(vertices.iter().copied())
        .map_err(|_| ItemError::MissingSection("Dataset_Frame".to_string()))?;

    let (pixel_type, max_input) = pixel_depth(required(root, "Raster_Encoding/NBITS")?)?;
    let ncols: u32 = required(root, "Raster_Dimensions/NCOLS")?;
    let nrows: u32 = required(root, "Raster_Dimensions/NROWS")?;
    let nbands: u32 = required(root, "Raster_Dimensions/NBANDS")?;

    let mut props = BTreeMap::new();
    let band_properties = spectral_band_properties(root);
    if !band_properties.is_empty() {
        props.insert("bandProperties".to_string(), Value::Array(band_properties));
    }

    if let Some(source) = root.find(SCENE_SOURCE) {
        put(&mut props, "SunElevation", source.parse_text("SUN_ELEVATION"));
        if let Some(time) = source.text("STOP_TIME") {
            props.insert("AcquisitionDate".to_string(), json!(acquisition_time(time)));
        }
        put(&mut props, "OffNadir", source.parse_text("VIEWING_ANGLE"));
        if let Some(instrument) = source.text("INSTRUMENT") {
            props.insert("Instrument".to_string(), json!(instrument));
        }
        put(&mut props, "SunAzimuth", source.parse_text("SUN_AZIMUTH"));
        put(&mut props, "SunDistance", source.parse_text("EARTH_SUN_DISTANCE"));
    }
    put(&mut props, "CloudCover", dimap_cloud_cover(root));

    Ok(Scene {
        uri,
        pixel_type,
        max_input,
        ncols,
        nrows,
        nbands,
        spatial_reference,
        extent,
        footprint: (!vertices.is_empty()).then_some(vertices),
        key_properties: props,
    })
}

fn spectral_band_properties(root: &XmlElement) -> Vec<Value> {
    let Some(interpretation) = root.find("Image_Interpretation") else {
        return Vec::new();
    };
    let statistics: Vec<&XmlElement> = root
        .find("Image_Display")
        .map(|display| display.children_named("Band_Statistics").collect())
        .unwrap_or_default();

    interpretation
        .children_named("Spectral_Band_Info")
        .map(|info| {
            let mut band = Map::new();
            if let Some(desc) = info.text("BAND_DESCRIPTION") {
                let name = if desc == "NIR" { "NearInfrared" } else { desc };
                band.insert("bandName".to_string(), json!(name));
            }
            if let Some(gain) = info.parse_text::<f64>("PHYSICAL_GAIN") {
                band.insert("RadianceGain".to_string(), json!(gain));
            }
            if let Some(bias) = info.parse_text::<f64>("PHYSICAL_BIAS") {
                band.insert("RadianceBias".to_string(), json!(bias));
            }
            if let Some(unit) = info.text("PHYSICAL_UNIT") {
                band.insert("unit".to_string(), json!(unit));
            }

            let index = info.parse_text::<u32>("BAND_INDEX");
            let stats = statistics
                .iter()
                .find(|s| index.is_some() && s.parse_text::<u32>("BAND_INDEX") == index);
            if let Some(stats) = stats {
                if let (Some(min), Some(max), Some(mean), Some(stdv)) = (
                    stats.parse_text::<f64>("STX_MIN"),
                    stats.parse_text::<f64>("STX_MAX"),
                    stats.parse_text::<f64>("STX_MEAN"),
                    stats.parse_text::<f64>("STX_STDV"),
                ) {
                    band.insert(
                        "statistics".to_string(),
                        json!({ "minimum": min, "maximum": max, "mean": mean, "standardDeviation": stdv }),
                    );
                }
            }
            Value::Object(band)
        })
        .collect()
}

fn dimap_cloud_cover(root: &XmlElement) -> Option<f64> {
    root.find("Dataset_Sources/Source_Information/Quality_Assessment")?
        .children_named("Quality_Parameter")
        .find(|param| {
            param
                .children
                .iter()
                .any(|c| c.name.ends_with("CODE") && c.text.trim() == "CLOUD_COVER_PERCENTAGE")
        })
        .and_then(|param| {
            param
                .children
                .iter()
                .find(|c| c.name.ends_with("VALUE"))
                .and_then(|c| c.text.trim().parse().ok())
        })
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn required<T: FromStr>(root: &XmlElement, path: &str) -> Result<T, ItemError> {
    let text = root
        .text(path)
        .ok_or_else(|| ItemError::MissingSection(path.to_string()))?;
    text.parse()
        .map_err(|_| ItemError::invalid(path, format!("cannot parse '{}'", text)))
}

/// Pixel type and default stretch maximum for a sensor bit depth.
fn pixel_depth(bits: u32) -> Result<(PixelType, u32), ItemError> {
    let unsupported = || ItemError::invalid("PixelBits", format!("unsupported depth {}", bits));
    let pixel_type = PixelType::from_bit_depth(bits).map_err(|_| unsupported())?;
    match pixel_type {
        PixelType::U16 => Ok((pixel_type, 2048)),
        PixelType::U8 => Ok((pixel_type, 256)),
        _ => Err(unsupported()),
    }
}

fn acquisition_time(raw: &str) -> String {
    normalize_acquisition_time(raw).unwrap_or_else(|e| {
        warn!(value = %raw, error = %e, "Keeping acquisition time as written");
        raw.to_string()
    })
}

fn put(props: &mut BTreeMap<String, Value>, key: &str, value: Option<f64>) {
    if let Some(value) = value {
        props.insert(key.to_string(), json!(value));
    }
}
