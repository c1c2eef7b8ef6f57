//! End-to-end crawls over composite products.

use std::sync::Arc;

use scene_catalog::products::{DATACUBE_LANDSAT, GA_SENTINEL2, GEOSCIENCE};
use scene_catalog::{
    CrawlReport, Crawler, DescriptorAssembler, DiscoveryOptions, FailureKind, ItemError, Locator,
    MetadataReader, PathDiscoverer, ProductSpec,
};
use test_utils::fixtures::{self, LANDSAT_MS_BANDS};
use test_utils::{MemoryFetcher, SceneDir};

fn crawler(product: &'static ProductSpec, fetcher: Arc<MemoryFetcher>) -> Crawler {
    Crawler::new(
        MetadataReader::new(product, fetcher),
        DescriptorAssembler::new(product),
    )
}

fn discover(product: &'static ProductSpec, roots: &[&str], recurse: bool) -> PathDiscoverer {
    PathDiscoverer::new(
        product,
        roots.iter().copied(),
        DiscoveryOptions {
            recurse,
            filter: None,
        },
    )
    .unwrap()
}

async fn crawl(product: &'static ProductSpec, fetcher: Arc<MemoryFetcher>, roots: &[&str]) -> CrawlReport {
    crawler(product, fetcher)
        .collect(discover(product, roots, false))
        .await
        .unwrap()
}

fn tags(report: &CrawlReport) -> Vec<&'static str> {
    report.records().map(|r| r.item.tag).collect()
}

// ============================================================================
// Local scenes
// ============================================================================

#[tokio::test]
async fn test_one_scene_four_tags() {
    let scenes = SceneDir::new().unwrap();
    let doc = scenes.write("sceneA.yaml", fixtures::landsat_scene_yaml()).unwrap();
    let fetcher = Arc::new(MemoryFetcher::new());

    let report = crawl(&DATACUBE_LANDSAT, fetcher.clone(), &[&scenes.root()]).await;

    assert_eq!(
        tags(&report),
        vec!["DataCube_L8_MS", "DataCube_L8_MS_QA", "DataCube_L7_MS", "DataCube_L7_MS_QA"]
    );
    assert_eq!(report.summary.built, 4);
    assert_eq!(report.summary.total_failed(), 0);
    // One read serves every tag of the locator.
    assert_eq!(fetcher.requests(), vec![doc.to_string_lossy().into_owned()]);

    let records: Vec<_> = report.records().collect();
    let dir = scenes.path().to_string_lossy().into_owned();
    for record in &records {
        assert_eq!(record.item.display_name, "sceneA");
        for (band, expected) in record.bands().iter().zip(LANDSAT_MS_BANDS) {
            assert_eq!(band.name, *expected);
            assert_eq!(band.uri, format!("{}/{}.tif", dir, expected.to_uppercase()));
        }
    }
    assert_eq!(records[0].bands().len(), 6);
    assert_eq!(records[1].bands().len(), 10);
    assert_eq!(records[0].raster_function(), Some("DataCube_MS_Composite.rft.xml"));
    assert_eq!(records[1].raster_function(), Some("DataCube_MS_QA_Composite.rft.xml"));

    // Landsat 8 QA names resolve through their Landsat 7 synonyms.
    let qa = records[1].bands();
    assert_eq!(qa[6].name, "aerosol_qa");
    assert_eq!(qa[6].uri, format!("{}/ATMOS_OPACITY.tif", dir));
    assert_eq!(qa[7].name, "coastal_aerosol");
    assert_eq!(qa[7].uri, format!("{}/CLOUD_QA.tif", dir));
}

#[tokio::test]
async fn test_missing_qa_bands_fail_only_their_tags() {
    let scenes = SceneDir::new().unwrap();
    scenes
        .write("sceneA.yaml", fixtures::odc_scene_yaml(LANDSAT_MS_BANDS, ""))
        .unwrap();

    let report = crawl(&DATACUBE_LANDSAT, Arc::new(MemoryFetcher::new()), &[&scenes.root()]).await;

    assert_eq!(tags(&report), vec!["DataCube_L8_MS", "DataCube_L7_MS"]);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].tags, vec!["DataCube_L8_MS_QA"]);
    assert!(matches!(
        &failures[0].error,
        ItemError::MissingBand { band, fallback: Some("atmos_opacity") } if band == "aerosol_qa"
    ));
    assert_eq!(report.summary.failed[&FailureKind::Schema], 2);
}

#[tokio::test]
async fn test_document_without_bands_fails_every_tag() {
    let scenes = SceneDir::new().unwrap();
    scenes
        .write("broken.yaml", "id: broken\nimage:\n  other: 1\n")
        .unwrap();
    scenes
        .write("sceneB.yaml", fixtures::landsat_scene_yaml())
        .unwrap();

    let report = crawl(&DATACUBE_LANDSAT, Arc::new(MemoryFetcher::new()), &[&scenes.root()]).await;

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].tags.len(), 4);
    assert!(matches!(&failures[0].error, ItemError::MissingSection(s) if s == "image.bands"));
    assert!(report.records().all(|r| r.item.display_name == "sceneB"));
    assert_eq!(report.summary.built, 4);
    assert_eq!(report.summary.failed[&FailureKind::Schema], 4);
}

#[tokio::test]
async fn test_malformed_document_does_not_abort() {
    let scenes = SceneDir::new().unwrap();
    scenes.write("a.yaml", "image: [unclosed").unwrap();
    scenes.write("b.yaml", fixtures::landsat_scene_yaml()).unwrap();

    let report = crawl(&DATACUBE_LANDSAT, Arc::new(MemoryFetcher::new()), &[&scenes.root()]).await;

    assert_eq!(report.failures().count(), 1);
    assert_eq!(report.summary.failed[&FailureKind::Parse], 4);
    assert_eq!(report.summary.built, 4);
}

#[tokio::test]
async fn test_building_twice_is_identical() {
    let scenes = SceneDir::new().unwrap();
    scenes.write("sceneA.yaml", fixtures::landsat_scene_yaml()).unwrap();

    let first = crawl(&DATACUBE_LANDSAT, Arc::new(MemoryFetcher::new()), &[&scenes.root()]).await;
    let second = crawl(&DATACUBE_LANDSAT, Arc::new(MemoryFetcher::new()), &[&scenes.root()]).await;

    let render = |report: &CrawlReport| {
        report
            .records()
            .map(|r| r.to_json().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(render(&first), render(&second));
}

#[tokio::test]
async fn test_concurrency_preserves_order() {
    let scenes = SceneDir::new().unwrap();
    for name in ["a", "b", "c", "d", "e"] {
        scenes
            .write(&format!("{}.yaml", name), fixtures::landsat_scene_yaml())
            .unwrap();
    }

    let report = crawler(&DATACUBE_LANDSAT, Arc::new(MemoryFetcher::new()))
        .with_concurrency(4)
        .collect(discover(&DATACUBE_LANDSAT, &[&scenes.root()], false))
        .await
        .unwrap();

    let names: Vec<String> = report
        .records()
        .map(|r| r.item.display_name.clone())
        .collect();
    assert_eq!(names.len(), 20);
    assert_eq!(names[0], "a");
    assert_eq!(names[4], "b");
    assert_eq!(names[19], "e");
}

// ============================================================================
// Remote scenes
// ============================================================================

#[tokio::test]
async fn test_manifest_s3_row_fetched_from_object_store() {
    let scenes = SceneDir::new().unwrap();
    let manifest = scenes
        .write_manifest("list.csv", None, &["s3://bucket/key/doc.yaml"])
        .unwrap();
    let manifest = manifest.to_string_lossy().into_owned();

    let found: Vec<Locator> = discover(&DATACUBE_LANDSAT, &[&manifest], false)
        .collect::<scene_catalog::Result<_>>()
        .unwrap();
    assert_eq!(
        found,
        vec![Locator::S3 {
            bucket: "bucket".to_string(),
            key: "key/doc.yaml".to_string()
        }]
    );

    let fetcher = Arc::new(
        MemoryFetcher::new().with_document("s3://bucket/key/doc.yaml", fixtures::landsat_scene_yaml()),
    );
    let report = crawl(&DATACUBE_LANDSAT, fetcher.clone(), &[&manifest]).await;

    assert_eq!(fetcher.requests(), vec!["s3://bucket/key/doc.yaml"]);
    let first = report.records().next().unwrap();
    let blue = &first.bands()[0].uri;
    assert!(blue.starts_with("<MRF_META>"));
    assert!(blue.contains("<Source>/vsis3/bucket/key/BLUE.tif</Source>"));
    assert!(blue.contains("<DataFile>z:/mrfcache/bucket/key/BLUE.mrf_cache</DataFile>"));
    assert!(blue.contains("<Projection>EPSG:32655</Projection>"));
}

#[tokio::test]
async fn test_http_document_uses_band_synonym() {
    let url = "http://dea-public-data.s3.amazonaws.com/L2/scene/doc.yaml";
    let mut bands: Vec<&str> = LANDSAT_MS_BANDS.to_vec();
    bands.extend(["atmos_opacity", "coastal_aerosol", "pixel_qa", "radsat_qa"]);
    let fetcher = Arc::new(MemoryFetcher::new().with_document(url, fixtures::odc_scene_yaml(&bands, "")));

    let report = crawl(&DATACUBE_LANDSAT, fetcher, &[url]).await;

    let qa = report
        .records()
        .find(|r| r.item.tag == "DataCube_L8_MS_QA")
        .unwrap();
    assert_eq!(qa.bands()[6].name, "aerosol_qa");
    assert!(qa.bands()[6]
        .uri
        .contains("<Source>/vsicurl/http://dea-public-data.s3.amazonaws.com/L2/scene/ATMOS_OPACITY.tif</Source>"));
    assert!(qa.bands()[6]
        .uri
        .contains("z:/mrfcache/dea-public-data/L2/scene/ATMOS_OPACITY.mrf_cache"));
}

#[tokio::test]
async fn test_unreachable_document_is_fetch_failure() {
    let report = crawl(
        &DATACUBE_LANDSAT,
        Arc::new(MemoryFetcher::new()),
        &["https://host/missing.yaml"],
    )
    .await;

    assert_eq!(report.summary.built, 0);
    assert_eq!(report.summary.failed[&FailureKind::Fetch], 4);
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn test_recursive_walk_finds_whole_subtree() {
    let scenes = SceneDir::new().unwrap();
    scenes.write("a.yaml", "").unwrap();
    scenes.write("notes.txt", "").unwrap();
    scenes.write("sub/b.yaml", "").unwrap();
    scenes.write("sub/deep/c.yaml", "").unwrap();

    let names = |recurse: bool| -> Vec<String> {
        discover(&DATACUBE_LANDSAT, &[&scenes.root()], recurse)
            .map(|l| l.unwrap().file_name().unwrap_or_default().to_string())
            .collect()
    };
    assert_eq!(names(true), vec!["a.yaml", "b.yaml", "c.yaml"]);
    assert_eq!(names(false), vec!["a.yaml"]);
}

#[test]
fn test_manifest_raster_column_only() {
    let scenes = SceneDir::new().unwrap();
    let manifest = scenes
        .write_manifest(
            "list.csv",
            Some("id,RASTER,note"),
            &["1,s3://bucket/a.yaml,s3://bucket/ignored.yaml", "2,https://host/b.yaml,x"],
        )
        .unwrap();

    let found: Vec<String> = discover(&DATACUBE_LANDSAT, &[&manifest.to_string_lossy()], false)
        .map(|l| l.unwrap().uri())
        .collect();
    assert_eq!(found, vec!["s3://bucket/a.yaml", "https://host/b.yaml"]);
}

#[test]
fn test_manifest_local_rows_must_exist() {
    let scenes = SceneDir::new().unwrap();
    let present = scenes.write("present.yaml", "").unwrap();
    let present = present.to_string_lossy().into_owned();
    let missing = scenes.path().join("missing.yaml").to_string_lossy().into_owned();
    let manifest = scenes
        .write_manifest("list.csv", None, &[&present, &missing])
        .unwrap();

    let found: Vec<String> = discover(&DATACUBE_LANDSAT, &[&manifest.to_string_lossy()], false)
        .map(|l| l.unwrap().uri())
        .collect();
    assert_eq!(found, vec![present]);
}

// ============================================================================
// Product-specific tag selection
// ============================================================================

#[tokio::test]
async fn test_sentinel2_level2_selects_six_tags() {
    let mut bands: Vec<&str> = GA_SENTINEL2
        .templates
        .iter()
        .flat_map(|t| t.bands.iter().map(|b| b.name))
        .collect();
    bands.sort_unstable();
    bands.dedup();
    let yaml = fixtures::odc_scene_yaml(&bands, "processing_level: Level-2\n")
        .replace("ls8_usgs_sr_scene", "ga_s2a_ard_nbar_granule");

    let scenes = SceneDir::new().unwrap();
    scenes
        .write("S2A_OPER_T55HFA/ARD-METADATA.yaml", yaml)
        .unwrap();
    let root = scenes.path().join("S2A_OPER_T55HFA");

    let report = crawl(
        &GA_SENTINEL2,
        Arc::new(MemoryFetcher::new()),
        &[&root.to_string_lossy()],
    )
    .await;

    assert_eq!(report.summary.total_failed(), 0);
    assert_eq!(
        tags(&report),
        vec!["MS", "Supplementary", "Lambertian", "QA", "NBART", "NBAR"]
    );
    for record in report.records() {
        assert_eq!(record.item.group_name, "S2A_OPER_T55HFA");
        assert_eq!(record.item.product_name.as_deref(), Some("ga_s2a_ard_nbar_granule"));
        assert_eq!(record.key_properties["SensorName"], "Geoscience");
    }
}

#[tokio::test]
async fn test_file_name_selection_reports_unmatched() {
    let scenes = SceneDir::new().unwrap();
    scenes
        .write("FC_LS8_3577_15_-40.yaml", fixtures::odc_scene_yaml(&["BS", "PV", "NPV", "UE"], ""))
        .unwrap();
    scenes.write("unrelated.yaml", "id: x\n").unwrap();

    let report = crawl(&GEOSCIENCE, Arc::new(MemoryFetcher::new()), &[&scenes.root()]).await;

    assert_eq!(tags(&report), vec!["fc"]);
    assert_eq!(report.summary.failed[&FailureKind::NotApplicable], 1);
}
