//! Composite descriptors for Open Data Cube style YAML sidecars.

use std::collections::BTreeMap;

use scene_common::{normalize_acquisition_time, BoundingBox, SpatialReference};
use serde_json::{json, Value};
use tracing::debug;

use super::ring;
use crate::document::{as_f64, lookup, MetadataDocument};
use crate::error::ItemError;
use crate::item::CatalogItem;
use crate::mrf::BandContext;
use crate::product::{BandSlot, ProductSpec};
use crate::record::{BandReference, OutputRecord, RasterDescriptor, RasterInfo};

const GEO_REF_POINTS: &str = "grid_spatial.projection.geo_ref_points";
const SPATIAL_REFERENCE: &str = "grid_spatial.projection.spatial_reference";
const VALID_DATA: &str = "grid_spatial.projection.valid_data.coordinates";

pub(super) fn build(
    product: &'static ProductSpec,
    cache_root: &str,
    item: &CatalogItem,
    document: &MetadataDocument,
) -> Result<OutputRecord, ItemError> {
    let tree = document
        .as_tree()
        .ok_or_else(|| ItemError::Parse("expected a key-value document".to_string()))?;
    let template = product.template(item.tag).ok_or_else(|| {
        ItemError::NotApplicable(format!("tag '{}' has no template in {}", item.tag, product.name))
    })?;

    lookup(tree, "image").ok_or_else(|| ItemError::MissingSection("image".to_string()))?;
    let bands = lookup(tree, "image.bands")
        .ok_or_else(|| ItemError::MissingSection("image.bands".to_string()))?;

    let extent = geo_ref_extent(tree)?;
    let spatial_reference = spatial_reference(tree)?;

    let context = BandContext {
        locator: &item.locator,
        extent: &extent,
        spatial_reference: &spatial_reference,
        cache_root,
        cache_subdir: product.cache_subdir,
    };

    let band_refs = template
        .bands
        .iter()
        .map(|slot| {
            let path = band_path(bands, slot)?;
            Ok(BandReference {
                name: slot.name.to_string(),
                uri: context.resolve(path, slot.geometry.as_ref())?,
                raster_info: slot.geometry.map(|g| RasterInfo {
                    pixel_type: g.pixel_type,
                    ncols: g.cols,
                    nrows: g.rows,
                    nbands: g.bands,
                    spatial_reference: spatial_reference.clone(),
                    extent,
                }),
            })
        })
        .collect::<Result<Vec<_>, ItemError>>()?;

    let mut key_properties = BTreeMap::new();
    for field in product.fields {
        if let Some(value) = lookup(tree, field.path).filter(|v| v.is_string() || v.is_number()) {
            key_properties.insert(field.key.to_string(), value.clone());
        }
    }
    if let Some(center) = lookup(tree, "extent.center_dt").and_then(Value::as_str) {
        match normalize_acquisition_time(center) {
            Ok(time) => {
                key_properties.insert("AcquisitionDate".to_string(), Value::String(time));
            }
            Err(e) => debug!(value = %center, error = %e, "Skipping unreadable acquisition time"),
        }
    }
    if let Some(sensor) = product.sensor_name {
        key_properties.insert("SensorName".to_string(), json!(sensor));
    }
    let band_properties: Vec<Value> = template
        .bands
        .iter()
        .map(|slot| json!({ "bandName": slot.name }))
        .collect();
    key_properties.insert("bandProperties".to_string(), Value::Array(band_properties));

    Ok(OutputRecord {
        raster: RasterDescriptor::Composite {
            raster_function: template.composite_function()?.to_string(),
            bands: band_refs,
        },
        spatial_reference: Some(spatial_reference),
        variables: BTreeMap::new(),
        item: item.clone(),
        key_properties,
        footprint: lookup(tree, VALID_DATA)
            .and_then(|rings| rings.get(0))
            .and_then(ring),
        no_data: None,
    })
}

/// Relative path of a band, trying the slot's fallback name second.
fn band_path<'a>(bands: &'a Value, slot: &BandSlot) -> Result<&'a str, ItemError> {
    let path_of = |name: &str| {
        bands
            .get(name)
            .and_then(|band| band.get("path"))
            .and_then(Value::as_str)
    };
    path_of(slot.name)
        .or_else(|| slot.fallback.and_then(path_of))
        .ok_or_else(|| ItemError::MissingBand {
            band: slot.name.to_string(),
            fallback: slot.fallback,
        })
}

/// Extent from the four corner points.
fn geo_ref_extent(tree: &Value) -> Result<BoundingBox, ItemError> {
    let points = lookup(tree, GEO_REF_POINTS)
        .ok_or_else(|| ItemError::MissingSection(GEO_REF_POINTS.to_string()))?;
    let coord = |corner: &str, axis: &str| {
        points
            .get(corner)
            .and_then(|p| p.get(axis))
            .and_then(as_f64)
            .ok_or_else(|| {
                ItemError::invalid(
                    &format!("{}.{}.{}", GEO_REF_POINTS, corner, axis),
                    "missing or non-numeric coordinate",
                )
            })
    };

    Ok(BoundingBox::new(
        coord("ll", "x")?,
        coord("ll", "y")?,
        coord("lr", "x")?,
        coord("ur", "y")?,
    ))
}

fn spatial_reference(tree: &Value) -> Result<SpatialReference, ItemError> {
    let text = lookup(tree, SPATIAL_REFERENCE)
        .ok_or_else(|| ItemError::MissingSection(SPATIAL_REFERENCE.to_string()))?
        .as_str()
        .ok_or_else(|| ItemError::invalid(SPATIAL_REFERENCE, "expected a string"))?;
    SpatialReference::parse(text).map_err(|e| ItemError::invalid(SPATIAL_REFERENCE, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::DocumentFormat;
    use crate::products::{DATACUBE_LANDSAT, GA_LANDSAT};
    use storage::Locator;

    const DOC: &str = r#"
id: 5a6f-scene
product_type: ls8_nbart_scene
platform: {code: LANDSAT_8}
instrument: {name: OLI_TIRS}
extent:
  center_dt: '2019-03-04T23:51:20.5Z'
grid_spatial:
  projection:
    spatial_reference: EPSG:32755
    geo_ref_points:
      ll: {x: 500000.0, y: 6000000.0}
      lr: {x: 600000.0, y: 6000000.0}
      ul: {x: 500000.0, y: 6100000.0}
      ur: {x: 600000.0, y: 6100000.0}
    valid_data:
      coordinates:
        - [[500000.0, 6000000.0], [600000.0, 6000000.0], [600000.0, 6100000.0]]
image:
  bands:
    blue: {path: B2.tif}
    green: {path: B3.tif}
    red: {path: B4.tif}
    nir: {path: B5.tif}
    swir1: {path: B6.tif}
    swir2: {path: B7.tif}
"#;

    fn document(text: &str) -> MetadataDocument {
        MetadataDocument::parse(text.as_bytes(), DocumentFormat::Yaml).unwrap()
    }

    fn item(product: &'static ProductSpec, uri: &str, tag: &'static str) -> CatalogItem {
        CatalogItem::new(product, Locator::parse(uri), tag, None)
    }

    #[test]
    fn test_local_composite() {
        let item = item(&GA_LANDSAT, "/data/scene/sceneA.yaml", "NBART");
        let record = build(&GA_LANDSAT, "z:/mrfcache", &item, &document(DOC)).unwrap();

        assert_eq!(record.raster_function(), Some("GS_Composite.rft.xml"));
        let bands = record.bands();
        assert_eq!(bands.len(), 6);
        assert_eq!(bands[0].name, "blue");
        assert_eq!(bands[0].uri, "/data/scene/B2.tif");
        let info = bands[5].raster_info.as_ref().unwrap();
        assert_eq!(info.ncols, 4000);
        assert_eq!(info.extent, BoundingBox::new(500000.0, 6000000.0, 600000.0, 6100000.0));
        assert_eq!(record.spatial_reference, Some(SpatialReference::Epsg(32755)));
        assert_eq!(record.key_properties["AcquisitionDate"], "2019-03-04 23:51:20");
        assert_eq!(record.key_properties["Platform"], "LANDSAT_8");
        assert_eq!(record.key_properties["Instrument"], "OLI_TIRS");
        assert_eq!(record.key_properties["SensorName"], "Geoscience");
        assert_eq!(record.footprint.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn test_missing_band_fails_whole_item() {
        let item = item(&DATACUBE_LANDSAT, "/data/sceneA.yaml", "DataCube_L8_MS_QA");
        let err = build(&DATACUBE_LANDSAT, "z:/mrfcache", &item, &document(DOC)).unwrap_err();
        assert!(matches!(
            err,
            ItemError::MissingBand { ref band, fallback: Some("atmos_opacity") } if band == "aerosol_qa"
        ));
    }

    #[test]
    fn test_missing_geo_ref_points() {
        let text = DOC.replace("geo_ref_points", "corners");
        let item = item(&GA_LANDSAT, "/data/sceneA.yaml", "NBART");
        let err = build(&GA_LANDSAT, "z:/mrfcache", &item, &document(&text)).unwrap_err();
        assert!(matches!(err, ItemError::MissingSection(s) if s == GEO_REF_POINTS));
    }

    #[test]
    fn test_wkt_spatial_reference_carried() {
        let text = DOC.replace("EPSG:32755", "PROJCS[\"GDA94 / Australian Albers\"]");
        let item = item(&GA_LANDSAT, "/data/sceneA.yaml", "NBART");
        let record = build(&GA_LANDSAT, "z:/mrfcache", &item, &document(&text)).unwrap();
        assert!(matches!(record.spatial_reference, Some(SpatialReference::Wkt(_))));
    }

    #[test]
    fn test_remote_bands_get_cache_descriptors() {
        let item = item(&GA_LANDSAT, "s3://dea-public-data/L2/x/sceneA.yaml", "NBART");
        let record = build(&GA_LANDSAT, "/cache", &item, &document(DOC)).unwrap();
        let uri = &record.bands()[0].uri;
        assert!(uri.starts_with("<MRF_META>"));
        assert!(uri.contains("<Source>/vsis3/dea-public-data/L2/x/B2.tif</Source>"));
        assert!(uri.contains("/cache/Geoscience/Landsat/dea-public-data/L2/x/B2.mrf_cache"));
        assert!(uri.contains("<Projection>EPSG:32755</Projection>"));
    }
}
