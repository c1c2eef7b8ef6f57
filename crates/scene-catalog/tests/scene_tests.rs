//! End-to-end crawls over single-scene and STAC products.

use std::collections::BTreeMap;
use std::sync::Arc;

use scene_catalog::products::{STAC, SUPERVIEW};
use scene_catalog::search::parse_feature_collection;
use scene_catalog::{
    CrawlReport, Crawler, DescriptorAssembler, DiscoveryOptions, FailureKind, MetadataReader,
    PathDiscoverer, ProductSpec,
};
use scene_common::{BoundingBox, PixelType, SpatialReference};
use serde_json::Value;
use test_utils::{assert_json_approx_eq, fixtures, MemoryFetcher, SceneDir};

async fn crawl_roots(product: &'static ProductSpec, roots: &[&str]) -> CrawlReport {
    let discoverer = PathDiscoverer::new(product, roots.iter().copied(), DiscoveryOptions::default()).unwrap();
    Crawler::new(
        MetadataReader::new(product, Arc::new(MemoryFetcher::new())),
        DescriptorAssembler::new(product),
    )
    .collect(discoverer)
    .await
    .unwrap()
}

// ============================================================================
// SuperView-1
// ============================================================================

const MUX: &str = "SV1-01_20190612_L1B0001_MUX";
const PAN: &str = "SV1-01_20190612_L1B0001_PAN";

#[tokio::test]
async fn test_superview_pair_with_rpc() {
    let scenes = SceneDir::new().unwrap();
    let mux = scenes
        .write(&format!("L1B/{}.xml", MUX), fixtures::superview_xml("LEVEL1B", 4))
        .unwrap();
    scenes
        .write(&format!("L1B/{}.rpb", MUX), fixtures::rpb_text(35.0))
        .unwrap();
    scenes
        .write(&format!("L1B/{}.xml", PAN), fixtures::superview_xml("LEVEL1B", 1))
        .unwrap();

    let report = crawl_roots(&SUPERVIEW, &[&mux.to_string_lossy()]).await;
    assert_eq!(report.summary.built, 2);

    let records: Vec<_> = report.records().collect();
    let (ms, pan) = (records[0], records[1]);
    assert_eq!(ms.item.tag, "MS");
    assert_eq!(ms.item.display_name, MUX);
    assert_eq!(ms.item.group_name, "L1B");
    assert_eq!(ms.item.product_name.as_deref(), Some("LEVEL1B"));
    assert_eq!(pan.item.tag, "Pan");

    let out = ms.to_json();
    let info = &out["raster"]["rasterInfo"];
    assert!(out["raster"]["uri"].as_str().unwrap().ends_with(&format!("L1B/{}.tiff", MUX)));
    assert_eq!(info["pixelType"], PixelType::U16.code());
    assert_eq!(info["nCols"], 4500);
    assert_eq!(info["nBands"], 4);
    assert_eq!(info["spatialReference"], 4326);
    assert_eq!(info["XMin"], 114.21);
    assert_eq!(info["YMax"], 30.62);

    let xform: Value = serde_json::from_str(info["geodataXform"].as_str().unwrap()).unwrap();
    let coeff = &xform["GeodataTransforms"][0]["geodataTransformArguments"]["coeff"];
    assert_eq!(coeff.as_array().unwrap().len(), 90);
    assert_eq!(coeff[4], 35.0);

    let props = &out["keyProperties"];
    assert_eq!(props["CONSTANTZ"], 35.0);
    assert_json_approx_eq!(props["SunElevation"], 22.5, 1e-9);
    assert_json_approx_eq!(props["SensorElevation"], 12.0, 1e-9);
    assert_json_approx_eq!(props["OffNadir"], 5.0, 1e-9);
    assert_eq!(props["AcquisitionDate"], "2019-06-12 02:41:37");
    assert_eq!(props["ScenePath"], 214);
    assert_eq!(props["bandProperties"][0]["bandName"], "Blue");
    assert_eq!(out["variables"]["DefaultMaximumInput"], 2048);
    assert_eq!(out["noData"][0], 0.0);
    assert_eq!(out["footprint"].as_array().unwrap().len(), 4);

    // The PAN half has no camera model file.
    let pan_out = pan.to_json();
    assert!(pan_out["raster"]["rasterInfo"].get("geodataXform").is_none());
    assert!(pan_out["keyProperties"].get("CONSTANTZ").is_none());
    assert_eq!(pan_out["keyProperties"]["bandProperties"][0]["bandName"], "Panchromatic");
}

#[tokio::test]
async fn test_superview_projected_level() {
    let scenes = SceneDir::new().unwrap();
    scenes
        .write("SV1-02_20190612_L2A0001_MUX.xml", fixtures::superview_xml("LEVEL2A", 4))
        .unwrap();

    let report = crawl_roots(&SUPERVIEW, &[&scenes.root()]).await;
    let record = report.records().next().unwrap();

    assert_eq!(record.spatial_reference, Some(SpatialReference::Epsg(32650)));
    let out = record.to_json();
    assert_eq!(out["raster"]["rasterInfo"]["XMin"], 223500.0);
    assert_eq!(out["raster"]["rasterInfo"]["YMin"], 3375600.0);
    assert_eq!(out["keyProperties"]["ProductType"], "LEVEL2A");
}

#[tokio::test]
async fn test_superview_dimap() {
    let scenes = SceneDir::new().unwrap();
    scenes
        .write("SW1_20190612_MUX.dim", fixtures::superview_dim("SW1_20190612_MUX.tif"))
        .unwrap();

    let report = crawl_roots(&SUPERVIEW, &[&scenes.root()]).await;
    assert_eq!(report.summary.built, 1);
    let record = report.records().next().unwrap();
    assert_eq!(record.item.product_name.as_deref(), Some("LEVEL2A"));

    let expected_extent = BoundingBox::new(114.21, 30.48, 114.39, 30.62);
    let out = record.to_json();
    let info = &out["raster"]["rasterInfo"];
    assert_eq!(
        out["raster"]["uri"],
        scenes.path().join("SW1_20190612_MUX.tif").to_string_lossy().into_owned()
    );
    assert_eq!(info["pixelType"], PixelType::U8.code());
    assert_eq!(info["nBands"], 4);
    assert_eq!(info["XMin"], expected_extent.min_x);
    assert_eq!(info["YMax"], expected_extent.max_y);
    assert_eq!(out["spatialReference"], 32650);
    assert_eq!(out["variables"]["DefaultMaximumInput"], 256);

    let props = &out["keyProperties"];
    assert_eq!(props["CloudCover"], 4.5);
    assert_eq!(props["SunElevation"], 65.2);
    assert_eq!(props["OffNadir"], 7.4);
    assert_eq!(props["SunDistance"], 1.0157);
    assert_eq!(props["Instrument"], "MUX");
    assert_eq!(props["bandProperties"][0]["bandName"], "NearInfrared");
    assert_eq!(props["bandProperties"][0]["statistics"]["mean"], 80.25);
    assert_eq!(props["bandProperties"][0]["statistics"]["standardDeviation"], 12.5);
    assert_eq!(props["bandProperties"][1]["bandName"], "RED");
    assert!(props["bandProperties"][1].get("statistics").is_none());
}

#[tokio::test]
async fn test_other_sensors_not_applicable() {
    let scenes = SceneDir::new().unwrap();
    let xml = fixtures::superview_xml("LEVEL1B", 4).replace("SV1-01", "GF2");
    scenes.write("SV_looks_like_superview.xml", xml).unwrap();

    let report = crawl_roots(&SUPERVIEW, &[&scenes.root()]).await;
    assert_eq!(report.summary.built, 0);
    assert_eq!(report.summary.failed[&FailureKind::NotApplicable], 1);
}

// ============================================================================
// STAC
// ============================================================================

#[tokio::test]
async fn test_stac_search_results() {
    let body = fixtures::feature_collection(vec![
        fixtures::stac_item("LC08_A", "https://host/c/a"),
        fixtures::stac_item("LC08_B", "https://host/c/b"),
    ]);
    let locators = parse_feature_collection(body.to_string().as_bytes()).unwrap();

    let crawler = Crawler::new(
        MetadataReader::new(&STAC, Arc::new(MemoryFetcher::new())),
        DescriptorAssembler::new(&STAC),
    );
    let report = crawler.collect(locators.into_iter().map(Ok)).await.unwrap();

    assert_eq!(report.summary.built, 2);
    let records: Vec<_> = report.records().collect();
    assert_eq!(records[1].item.display_name, "LC08_B");
    assert_eq!(records[1].item.locator.uri(), "embedded:LC08_B");
    assert_eq!(records[0].bands().len(), 11);
    assert_eq!(records[0].bands()[0].uri, "https://host/c/a/LC08_A_B1.TIF");
    assert_eq!(records[0].bands()[10].uri, "https://host/c/a/LC08_A_B11.TIF");
    assert_eq!(records[0].spatial_reference, Some(SpatialReference::Epsg(32655)));

    let props = &records[0].key_properties;
    assert_eq!(props["AcquisitionDate"], "2020-08-01 23:53:12");
    assert_eq!(props["Instrument"], "oli,tirs");
    assert_eq!(props["SensorName"], "landsat-8");
    assert_eq!(props["OffNadir"], 0.0);
    assert_eq!(props["CloudCover"], 12.34);
}

#[tokio::test]
async fn test_stac_local_item_with_custom_mapping() {
    let mut item = fixtures::stac_item("LC08_C", "https://host/c");
    for n in 1..=10 {
        item["assets"][format!("B{}", n)]["href"] = Value::String(format!("LC08_C_B{}.TIF", n));
    }
    let scenes = SceneDir::new().unwrap();
    scenes.write("LC08_C.json", item.to_string()).unwrap();

    let dict = BTreeMap::from([("Platform".to_string(), "platform".to_string())]);
    let discoverer = PathDiscoverer::new(&STAC, [scenes.root()], DiscoveryOptions::default()).unwrap();
    let report = Crawler::new(
        MetadataReader::new(&STAC, Arc::new(MemoryFetcher::new())),
        DescriptorAssembler::new(&STAC).with_attribute_dict(dict),
    )
    .collect(discoverer)
    .await
    .unwrap();

    let record = report.records().next().unwrap();
    assert_eq!(
        record.bands()[2].uri,
        scenes.path().join("LC08_C_B3.TIF").to_string_lossy().into_owned()
    );
    assert_eq!(record.key_properties.len(), 1);
    assert_eq!(record.key_properties["Platform"], "landsat-8");
}
