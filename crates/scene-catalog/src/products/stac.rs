//! Generic STAC items with numbered band assets.

use crate::product::{
    BandSlot, BuilderKind, DocumentFormat, Naming, ProductSpec, TagSelection, Template,
};

pub static STAC: ProductSpec = ProductSpec {
    name: "stac",
    description: "STAC items from files or a STAC API search",
    format: DocumentFormat::Json,
    builder: BuilderKind::Stac,
    extensions: &[".json"],
    default_filter: "*.json",
    selection: TagSelection::Enumerate,
    templates: &[Template {
        tag: "AllBands",
        raster_function: Some("AllBands.rft.xml"),
        product_name: None,
        bands: &[
            BandSlot::asset("B1"),
            BandSlot::asset("B2"),
            BandSlot::asset("B3"),
            BandSlot::asset("B4"),
            BandSlot::asset("B5"),
            BandSlot::asset("B6"),
            BandSlot::asset("B7"),
            BandSlot::asset("B8"),
            BandSlot::asset("B9"),
            BandSlot::asset("B10"),
            BandSlot::asset("B11"),
        ],
    }],
    fields: &[],
    naming: Naming::FileStem,
    requester_pays: false,
    cache_subdir: None,
    sensor_name: None,
    paired_tokens: None,
};
