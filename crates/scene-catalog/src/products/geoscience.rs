//! Geoscience Australia analysis-ready products.

use scene_common::PixelType;

use crate::document::MetadataDocument;
use crate::product::{
    BandGeometry, BandSlot, BuilderKind, DocumentFormat, DocumentSelection, MetadataField, Naming,
    ProductSpec, TagSelection, Template, ODC_FIELDS,
};

// ---------------------------------------------------------------------------
// Landsat NBART
// ---------------------------------------------------------------------------

const GA_LS: BandGeometry = BandGeometry::square(PixelType::S16, 4000, Some("Int16"), None);

pub static GA_LANDSAT: ProductSpec = ProductSpec {
    name: "ga-landsat",
    description: "Geoscience Australia Landsat NBART tiles",
    format: DocumentFormat::Yaml,
    builder: BuilderKind::Composite,
    extensions: &[".yaml"],
    default_filter: "*.yaml",
    selection: TagSelection::Enumerate,
    templates: &[Template {
        tag: "NBART",
        raster_function: Some("GS_Composite.rft.xml"),
        product_name: None,
        bands: &[
            BandSlot::new("blue", GA_LS),
            BandSlot::new("green", GA_LS),
            BandSlot::new("red", GA_LS),
            BandSlot::new("nir", GA_LS),
            BandSlot::new("swir1", GA_LS),
            BandSlot::new("swir2", GA_LS),
        ],
    }],
    fields: ODC_FIELDS,
    naming: Naming::FileStem,
    requester_pays: false,
    cache_subdir: Some("Geoscience/Landsat"),
    sensor_name: Some("Geoscience"),
    paired_tokens: None,
};

// ---------------------------------------------------------------------------
// Sentinel-2 ARD
// ---------------------------------------------------------------------------

const R10: BandGeometry = BandGeometry::square(PixelType::S16, 10980, Some("Int16"), Some("-999"));
const R20: BandGeometry = BandGeometry::square(PixelType::S16, 5490, Some("Int16"), Some("-999"));
const R60: BandGeometry = BandGeometry::square(PixelType::S16, 1830, Some("Int16"), Some("-999"));
const ANGLE: BandGeometry = BandGeometry::square(PixelType::F64, 5490, Some("Float32"), Some("-999"));
const MASK: BandGeometry = BandGeometry::square(PixelType::U8, 5490, None, None);
const FMASK: BandGeometry = BandGeometry::square(PixelType::U8, 5490, None, Some("0"));

const SUPPLEMENTARY: &[BandSlot] = &[
    BandSlot::new("azimuthal_exiting", ANGLE),
    BandSlot::new("azimuthal_incident", ANGLE),
    BandSlot::new("exiting", ANGLE),
    BandSlot::new("incident", ANGLE),
    BandSlot::new("relative_azimuth", ANGLE),
    BandSlot::new("relative_slope", ANGLE),
    BandSlot::new("satellite_azimuth", ANGLE),
    BandSlot::new("satellite_view", ANGLE),
    BandSlot::new("solar_azimuth", ANGLE),
    BandSlot::new("solar_zenith", ANGLE),
    BandSlot::new("timedelta", ANGLE),
];

const QA: &[BandSlot] = &[
    BandSlot::new("fmask", FMASK),
    BandSlot::new("lambertian_contiguity", MASK),
    BandSlot::new("nbar_contiguity", MASK),
    BandSlot::new("nbart_contiguity", MASK),
    BandSlot::new("terrain_shadow", MASK),
];

const LAMBERTIAN: &[BandSlot] = &[
    BandSlot::new("lambertian_coastal_aerosol", R60),
    BandSlot::new("lambertian_blue", R10),
    BandSlot::new("lambertian_green", R10),
    BandSlot::new("lambertian_red", R10),
    BandSlot::new("lambertian_red_edge_1", R20),
    BandSlot::new("lambertian_red_edge_2", R20),
    BandSlot::new("lambertian_red_edge_3", R20),
    BandSlot::new("lambertian_nir_1", R10),
    BandSlot::new("lambertian_nir_2", R20),
    BandSlot::new("lambertian_swir_2", R20),
    BandSlot::new("lambertian_swir_3", R20),
];

const NBAR: &[BandSlot] = &[
    BandSlot::new("nbar_coastal_aerosol", R60),
    BandSlot::new("nbar_blue", R10),
    BandSlot::new("nbar_green", R10),
    BandSlot::new("nbar_red", R10),
    BandSlot::new("nbar_red_edge_1", R20),
    BandSlot::new("nbar_red_edge_2", R20),
    BandSlot::new("nbar_red_edge_3", R20),
    BandSlot::new("nbar_nir_1", R10),
    BandSlot::new("nbar_nir_2", R20),
    BandSlot::new("nbar_swir_2", R20),
    BandSlot::new("nbar_swir_3", R20),
];

const NBART: &[BandSlot] = &[
    BandSlot::new("nbart_coastal_aerosol", R60),
    BandSlot::new("nbart_blue", R10),
    BandSlot::new("nbart_green", R10),
    BandSlot::new("nbart_red", R10),
    BandSlot::new("nbart_red_edge_1", R20),
    BandSlot::new("nbart_red_edge_2", R20),
    BandSlot::new("nbart_red_edge_3", R20),
    BandSlot::new("nbart_nir_1", R10),
    BandSlot::new("nbart_nir_2", R20),
    BandSlot::new("nbart_swir_2", R20),
    BandSlot::new("nbart_swir_3", R20),
];

/// Every band of a Level-2 package, sorted by name.
const ALL_BANDS: &[BandSlot] = &[
    BandSlot::new("azimuthal_exiting", ANGLE),
    BandSlot::new("azimuthal_incident", ANGLE),
    BandSlot::new("exiting", ANGLE),
    BandSlot::new("fmask", FMASK),
    BandSlot::new("incident", ANGLE),
    BandSlot::new("lambertian_blue", R10),
    BandSlot::new("lambertian_coastal_aerosol", R60),
    BandSlot::new("lambertian_contiguity", MASK),
    BandSlot::new("lambertian_green", R10),
    BandSlot::new("lambertian_nir_1", R10),
    BandSlot::new("lambertian_nir_2", R20),
    BandSlot::new("lambertian_red", R10),
    BandSlot::new("lambertian_red_edge_1", R20),
    BandSlot::new("lambertian_red_edge_2", R20),
    BandSlot::new("lambertian_red_edge_3", R20),
    BandSlot::new("lambertian_swir_2", R20),
    BandSlot::new("lambertian_swir_3", R20),
    BandSlot::new("nbar_blue", R10),
    BandSlot::new("nbar_coastal_aerosol", R60),
    BandSlot::new("nbar_contiguity", MASK),
    BandSlot::new("nbar_green", R10),
    BandSlot::new("nbar_nir_1", R10),
    BandSlot::new("nbar_nir_2", R20),
    BandSlot::new("nbar_red", R10),
    BandSlot::new("nbar_red_edge_1", R20),
    BandSlot::new("nbar_red_edge_2", R20),
    BandSlot::new("nbar_red_edge_3", R20),
    BandSlot::new("nbar_swir_2", R20),
    BandSlot::new("nbar_swir_3", R20),
    BandSlot::new("nbart_blue", R10),
    BandSlot::new("nbart_coastal_aerosol", R60),
    BandSlot::new("nbart_contiguity", MASK),
    BandSlot::new("nbart_green", R10),
    BandSlot::new("nbart_nir_1", R10),
    BandSlot::new("nbart_nir_2", R20),
    BandSlot::new("nbart_red", R10),
    BandSlot::new("nbart_red_edge_1", R20),
    BandSlot::new("nbart_red_edge_2", R20),
    BandSlot::new("nbart_red_edge_3", R20),
    BandSlot::new("nbart_swir_2", R20),
    BandSlot::new("nbart_swir_3", R20),
    BandSlot::new("relative_azimuth", ANGLE),
    BandSlot::new("relative_slope", ANGLE),
    BandSlot::new("satellite_azimuth", ANGLE),
    BandSlot::new("satellite_view", ANGLE),
    BandSlot::new("solar_azimuth", ANGLE),
    BandSlot::new("solar_zenith", ANGLE),
    BandSlot::new("terrain_shadow", MASK),
    BandSlot::new("timedelta", ANGLE),
];

const LEVEL_2_TAGS: &[&str] = &["MS", "Supplementary", "Lambertian", "QA", "NBART", "NBAR"];

/// Level-2 packages expose every template; anything else only the full stack.
fn select_sentinel2(document: &MetadataDocument) -> DocumentSelection {
    let tags = match document.get_str("processing_level") {
        Some("Level-2") => LEVEL_2_TAGS.to_vec(),
        _ => vec!["MS"],
    };
    DocumentSelection {
        tags,
        product_name: document.get_str("product_type").map(str::to_string),
    }
}

pub static GA_SENTINEL2: ProductSpec = ProductSpec {
    name: "ga-sentinel2",
    description: "Geoscience Australia Sentinel-2 ARD packages",
    format: DocumentFormat::Yaml,
    builder: BuilderKind::Composite,
    extensions: &[".yaml"],
    default_filter: "*.yaml",
    selection: TagSelection::Document(select_sentinel2),
    templates: &[
        Template {
            tag: "MS",
            raster_function: Some("Geoscience_ALL_Composite.rft.xml"),
            product_name: None,
            bands: ALL_BANDS,
        },
        Template {
            tag: "Supplementary",
            raster_function: Some("GS_Composite.rft.xml"),
            product_name: None,
            bands: SUPPLEMENTARY,
        },
        Template {
            tag: "Lambertian",
            raster_function: Some("GS_Composite.rft.xml"),
            product_name: None,
            bands: LAMBERTIAN,
        },
        Template {
            tag: "QA",
            raster_function: Some("GS_QA_Composite.rft.xml"),
            product_name: None,
            bands: QA,
        },
        Template {
            tag: "NBART",
            raster_function: Some("GS_Composite.rft.xml"),
            product_name: None,
            bands: NBART,
        },
        Template {
            tag: "NBAR",
            raster_function: Some("GS_Composite.rft.xml"),
            product_name: None,
            bands: NBAR,
        },
    ],
    fields: &[
        MetadataField { key: "Instrument", path: "instrument.name" },
        MetadataField { key: "Platform", path: "platform.code" },
        MetadataField { key: "PlatformCode", path: "platform.code" },
        MetadataField { key: "ProductType", path: "product_type" },
        MetadataField { key: "ProductName", path: "product_type" },
        MetadataField { key: "ProcessingLevel", path: "processing_level" },
        MetadataField { key: "ID", path: "id" },
    ],
    naming: Naming::ParentDir,
    requester_pays: false,
    cache_subdir: Some("Geoscience/Sentinel2"),
    sensor_name: Some("Geoscience"),
    paired_tokens: None,
};

// ---------------------------------------------------------------------------
// Derived products (barest earth, fractional cover, mangroves, water)
// ---------------------------------------------------------------------------

const BE: BandGeometry = BandGeometry::square(PixelType::S16, 1000, Some("Int16"), None);
const FC: BandGeometry = BandGeometry::square(PixelType::S8, 4000, None, None);
const MC: BandGeometry = BandGeometry::square(PixelType::S16, 4000, Some("Int16"), None);
const WOFS_FS: BandGeometry = BandGeometry::square(PixelType::F32, 4000, Some("Float32"), None);
const WOFS_COUNT: BandGeometry = BandGeometry::square(PixelType::S16, 4000, Some("Int16"), None);
const WOFS_FREQ: BandGeometry = BandGeometry::square(PixelType::F64, 4000, Some("Float32"), None);
const WOFS: BandGeometry = BandGeometry::square(PixelType::U8, 4000, Some("Int8"), None);

/// Tag for a derived-product sidecar, from its file name.
fn select_by_file_name(name: &str) -> Option<&'static str> {
    if name.starts_with("be") {
        Some("be")
    } else if name.contains("FC") {
        Some("fc")
    } else if name.starts_with("MANGROVE_COVER") {
        Some("mc")
    } else if name.starts_with("wofs_filtered_summary") {
        Some("wofs_fs")
    } else if name.ends_with("summary.yaml") {
        Some("wofs_ss")
    } else if name.starts_with("LS_WATER") || name.starts_with("WATER") {
        Some("wofs")
    } else {
        None
    }
}

pub static GEOSCIENCE: ProductSpec = ProductSpec {
    name: "geoscience",
    description: "Geoscience Australia derived products chosen by file name",
    format: DocumentFormat::Yaml,
    builder: BuilderKind::Composite,
    extensions: &[".yaml"],
    default_filter: "*.yaml",
    selection: TagSelection::FileName(select_by_file_name),
    templates: &[
        Template {
            tag: "be",
            raster_function: Some("GS_Composite_be.rft.xml"),
            product_name: Some("landsat8_barest_earth_mosaic"),
            bands: &[
                BandSlot::new("blue", BE),
                BandSlot::new("green", BE),
                BandSlot::new("red", BE),
                BandSlot::new("nir", BE),
                BandSlot::new("swir1", BE),
                BandSlot::new("swir2", BE),
            ],
        },
        Template {
            tag: "fc",
            raster_function: Some("GS_Composite_fc.rft.xml"),
            product_name: Some("fractional_cover"),
            bands: &[
                BandSlot::new("BS", FC),
                BandSlot::new("NPV", FC),
                BandSlot::new("PV", FC),
                BandSlot::new("UE", FC),
            ],
        },
        Template {
            tag: "mc",
            raster_function: Some("GS_Composite_mc.rft.xml"),
            product_name: Some("mangrove_extent_cover"),
            bands: &[
                BandSlot::new("canopy_cover_class", MC),
                BandSlot::new("extent", MC),
            ],
        },
        Template {
            tag: "wofs_fs",
            raster_function: Some("GS_Composite_wofs_fs.rft.xml"),
            product_name: Some("wofs_filtered_summary"),
            bands: &[
                BandSlot::new("confidence", WOFS_FS),
                BandSlot::new("wofs_filtered_summary", WOFS_FS),
            ],
        },
        Template {
            tag: "wofs_ss",
            raster_function: Some("GS_Composite_wofs_ss.rft.xml"),
            product_name: Some("wofs_statistical_summary"),
            bands: &[
                BandSlot::new("count_clear", WOFS_COUNT),
                BandSlot::new("count_wet", WOFS_COUNT),
                BandSlot::new("frequency", WOFS_FREQ),
            ],
        },
        Template {
            tag: "wofs",
            raster_function: Some("GS_Composite_wofs.rft.xml"),
            product_name: Some("wofs"),
            bands: &[BandSlot::new("water", WOFS)],
        },
    ],
    fields: ODC_FIELDS,
    naming: Naming::FileStem,
    requester_pays: false,
    cache_subdir: Some("Geoscience"),
    sensor_name: Some("Geoscience"),
    paired_tokens: None,
};
