//! Open Data Cube Landsat and Sentinel-1 products.

use scene_common::PixelType;

use crate::product::{
    BandGeometry, BandSlot, BuilderKind, CacheLayout, DocumentFormat, Naming, ProductSpec, TagSelection,
    Template, ODC_FIELDS,
};

const LANDSAT: BandGeometry = BandGeometry::square(PixelType::S16, 3500, Some("Int16"), Some("-9999"));

const L8_MS: &[BandSlot] = &[
    BandSlot::new("blue", LANDSAT),
    BandSlot::new("green", LANDSAT),
    BandSlot::new("red", LANDSAT),
    BandSlot::new("nir", LANDSAT),
    BandSlot::new("swir1", LANDSAT),
    BandSlot::new("swir2", LANDSAT),
];

const L8_QA: &[BandSlot] = &[
    BandSlot::new("blue", LANDSAT),
    BandSlot::new("green", LANDSAT),
    BandSlot::new("red", LANDSAT),
    BandSlot::new("nir", LANDSAT),
    BandSlot::new("swir1", LANDSAT),
    BandSlot::new("swir2", LANDSAT),
    BandSlot::with_fallback("aerosol_qa", "atmos_opacity", LANDSAT),
    BandSlot::with_fallback("coastal_aerosol", "cloud_qa", LANDSAT),
    BandSlot::new("pixel_qa", LANDSAT),
    BandSlot::new("radsat_qa", LANDSAT),
];

// Landsat 7 names its QA layers differently; the Landsat 8 names are the fallback.
const L7_QA: &[BandSlot] = &[
    BandSlot::new("blue", LANDSAT),
    BandSlot::new("green", LANDSAT),
    BandSlot::new("red", LANDSAT),
    BandSlot::new("nir", LANDSAT),
    BandSlot::new("swir1", LANDSAT),
    BandSlot::new("swir2", LANDSAT),
    BandSlot::with_fallback("atmos_opacity", "aerosol_qa", LANDSAT),
    BandSlot::with_fallback("cloud_qa", "coastal_aerosol", LANDSAT),
    BandSlot::new("pixel_qa", LANDSAT),
    BandSlot::new("radsat_qa", LANDSAT),
];

pub static DATACUBE_LANDSAT: ProductSpec = ProductSpec {
    name: "datacube-landsat",
    description: "Landsat 7/8 surface reflectance from an Open Data Cube",
    format: DocumentFormat::Yaml,
    builder: BuilderKind::Composite,
    extensions: &[".yaml"],
    default_filter: "*.yaml",
    selection: TagSelection::Enumerate,
    templates: &[
        Template {
            tag: "DataCube_L8_MS",
            raster_function: Some("DataCube_MS_Composite.rft.xml"),
            product_name: None,
            bands: L8_MS,
        },
        Template {
            tag: "DataCube_L8_MS_QA",
            raster_function: Some("DataCube_MS_QA_Composite.rft.xml"),
            product_name: None,
            bands: L8_QA,
        },
        Template {
            tag: "DataCube_L7_MS",
            raster_function: Some("DataCube_MS_Composite.rft.xml"),
            product_name: None,
            bands: L8_MS,
        },
        Template {
            tag: "DataCube_L7_MS_QA",
            raster_function: Some("DataCube_MS_QA_Composite.rft.xml"),
            product_name: None,
            bands: L7_QA,
        },
    ],
    fields: ODC_FIELDS,
    naming: Naming::FileStem,
    requester_pays: true,
    cache_subdir: None,
    sensor_name: None,
    paired_tokens: None,
};

const SAR: BandGeometry = BandGeometry {
    pixel_type: PixelType::F64,
    cols: 5535,
    rows: 5535,
    bands: 1,
    cache: CacheLayout {
        cols: 5529,
        rows: 5529,
        bands: 1,
        data_type: Some("Float32"),
        no_data: None,
    },
};

pub static DATACUBE_SENTINEL: ProductSpec = ProductSpec {
    name: "datacube-sentinel",
    description: "Sentinel-1 backscatter from an Open Data Cube",
    format: DocumentFormat::Yaml,
    builder: BuilderKind::Composite,
    extensions: &[".yaml"],
    default_filter: "*.yaml",
    selection: TagSelection::Enumerate,
    templates: &[Template {
        tag: "DataCube_S1_SAR",
        raster_function: Some("DataCube_SAR_Composite.rft.xml"),
        product_name: None,
        bands: &[BandSlot::new("vh", SAR), BandSlot::new("vv", SAR)],
    }],
    fields: ODC_FIELDS,
    naming: Naming::FileStem,
    requester_pays: false,
    cache_subdir: None,
    sensor_name: None,
    paired_tokens: None,
};
