//! Composite descriptors for STAC items.

use std::collections::BTreeMap;

use scene_common::{crs::WGS84, normalize_acquisition_time, SpatialReference};
use serde_json::{json, Value};
use tracing::debug;

use super::ring;
use crate::document::{as_f64, MetadataDocument};
use crate::error::ItemError;
use crate::item::CatalogItem;
use crate::mrf::resolve_href;
use crate::product::{BandSlot, ProductSpec};
use crate::record::{BandReference, OutputRecord, RasterDescriptor};

/// Output keys whose values must be numbers.
const NUMERIC_KEYS: &[&str] = &["OffNadir", "SunElevation", "SunAzimuth", "CloudCover"];

/// Default mapping from output key to STAC attribute.
pub fn default_attribute_dict() -> BTreeMap<String, String> {
    [
        ("OffNadir", "view:off_nadir"),
        ("SunElevation", "view:sun_elevation"),
        ("AcquisitionDate", "datetime"),
        ("Instrument", "instruments"),
        ("SunAzimuth", "view:sun_azimuth"),
        ("CloudCover", "eo:cloud_cover"),
        ("SensorName", "platform"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub(super) fn build(
    product: &'static ProductSpec,
    attribute_dict: &BTreeMap<String, String>,
    item: &CatalogItem,
    document: &MetadataDocument,
) -> Result<OutputRecord, ItemError> {
    let feature = document
        .as_tree()
        .ok_or_else(|| ItemError::Parse("expected a JSON feature".to_string()))?;
    let template = product.template(item.tag).ok_or_else(|| {
        ItemError::NotApplicable(format!("tag '{}' has no template in {}", item.tag, product.name))
    })?;

    let bands = template
        .bands
        .iter()
        .map(|slot| {
            let href = asset_href(feature, slot)?;
            Ok(BandReference {
                name: slot.name.to_string(),
                uri: resolve_href(&item.locator, href),
                raster_info: None,
            })
        })
        .collect::<Result<Vec<_>, ItemError>>()?;

    let properties = feature.get("properties");
    let epsg = properties
        .and_then(|p| p.get("proj:epsg"))
        .and_then(Value::as_u64)
        .and_then(|code| u32::try_from(code).ok())
        .unwrap_or(WGS84);

    let footprint = feature
        .get("geometry")
        .and_then(|g| g.get("coordinates"))
        .and_then(|rings| rings.get(0))
        .and_then(ring);

    Ok(OutputRecord {
        raster: RasterDescriptor::Composite {
            raster_function: template.composite_function()?.to_string(),
            bands,
        },
        spatial_reference: Some(SpatialReference::Epsg(epsg)),
        variables: BTreeMap::new(),
        item: item.clone(),
        key_properties: project_attributes(feature, attribute_dict),
        footprint,
        no_data: None,
    })
}

/// Href of a band from `assets`, else from a link whose `rel` names it.
fn asset_href<'a>(feature: &'a Value, slot: &BandSlot) -> Result<&'a str, ItemError> {
    let from_assets = feature
        .get("assets")
        .and_then(|assets| assets.get(slot.name))
        .and_then(|asset| asset.get("href"))
        .and_then(Value::as_str);
    let from_links = || {
        feature
            .get("links")?
            .as_array()?
            .iter()
            .find(|link| link.get("rel").and_then(Value::as_str) == Some(slot.name))?
            .get("href")?
            .as_str()
    };
    from_assets.or_else(from_links).ok_or_else(|| ItemError::MissingBand {
        band: slot.name.to_string(),
        fallback: None,
    })
}

/// Key properties read through the attribute mapping.
///
/// Attributes are looked up at the top level first, then under `properties`.
/// Missing or mistyped values are left out.
fn project_attributes(feature: &Value, attribute_dict: &BTreeMap<String, String>) -> BTreeMap<String, Value> {
    let mut projected = BTreeMap::new();
    for (key, attribute) in attribute_dict {
        let raw = feature
            .get(attribute)
            .or_else(|| feature.get("properties").and_then(|p| p.get(attribute)))
            .filter(|v| !v.is_null());
        let Some(raw) = raw else {
            continue;
        };

        let value = if NUMERIC_KEYS.contains(&key.as_str()) {
            as_f64(raw).map(|n| json!(n))
        } else if key == "AcquisitionDate" {
            raw.as_str().map(|text| {
                json!(normalize_acquisition_time(text).unwrap_or_else(|_| text.to_string()))
            })
        } else {
            match raw {
                Value::String(_) | Value::Number(_) => Some(raw.clone()),
                Value::Array(items) => {
                    let joined: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                    (!joined.is_empty()).then(|| json!(joined.join(",")))
                }
                _ => None,
            }
        };

        match value {
            Some(value) => {
                projected.insert(key.clone(), value);
            }
            None => debug!(key = %key, attribute = %attribute, "Omitting mistyped attribute"),
        }
    }
    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::STAC;
    use std::sync::Arc;
    use storage::Locator;

    fn feature() -> Value {
        let assets: serde_json::Map<String, Value> = (1..=10)
            .map(|n| (format!("B{}", n), json!({ "href": format!("https://host/LC08/B{}.TIF", n) })))
            .collect();
        json!({
            "type": "Feature",
            "id": "LC08_L1TP_001",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[10.0, 20.0], [11.0, 20.0], [11.0, 21.0], [10.0, 20.0]]]
            },
            "properties": {
                "datetime": "2020-01-02T03:04:05Z",
                "proj:epsg": 32633,
                "eo:cloud_cover": 7.5,
                "view:sun_elevation": "not a number",
                "instruments": ["oli", "tirs"],
                "platform": "landsat-8"
            },
            "assets": assets,
            "links": [{ "rel": "B11", "href": "B11.TIF" }]
        })
    }

    fn build_feature(value: Value) -> Result<OutputRecord, ItemError> {
        let doc = MetadataDocument::Tree(value.clone());
        let item = CatalogItem::new(&STAC, Locator::Embedded(Arc::new(value)), "AllBands", None);
        build(&STAC, &default_attribute_dict(), &item, &doc)
    }

    #[test]
    fn test_stac_feature() {
        let record = build_feature(feature()).unwrap();
        assert_eq!(record.spatial_reference, Some(SpatialReference::Epsg(32633)));
        assert_eq!(record.bands().len(), 11);
        assert_eq!(record.bands()[0].uri, "https://host/LC08/B1.TIF");
        assert_eq!(record.bands()[10].uri, "B11.TIF");
        assert!(record.bands()[0].raster_info.is_none());
        assert_eq!(record.item.display_name, "LC08_L1TP_001");

        let props = &record.key_properties;
        assert_eq!(props["AcquisitionDate"], "2020-01-02 03:04:05");
        assert_eq!(props["CloudCover"], 7.5);
        assert_eq!(props["Instrument"], "oli,tirs");
        assert_eq!(props["SensorName"], "landsat-8");
        assert!(!props.contains_key("SunElevation"));
        assert!(!props.contains_key("OffNadir"));
        assert_eq!(record.footprint.as_ref().map(Vec::len), Some(4));
    }

    #[test]
    fn test_missing_asset() {
        let mut value = feature();
        value["links"] = json!([]);
        assert!(matches!(
            build_feature(value),
            Err(ItemError::MissingBand { ref band, .. }) if band == "B11"
        ));
    }

    #[test]
    fn test_default_crs_is_wgs84() {
        let mut value = feature();
        value["properties"]
            .as_object_mut()
            .unwrap()
            .remove("proj:epsg");
        let record = build_feature(value).unwrap();
        assert_eq!(record.spatial_reference, Some(SpatialReference::Epsg(4326)));
    }

    #[test]
    fn test_custom_attribute_dict() {
        let value = feature();
        let dict = BTreeMap::from([("Platform".to_string(), "platform".to_string())]);
        let projected = project_attributes(&value, &dict);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected["Platform"], "landsat-8");
    }
}
