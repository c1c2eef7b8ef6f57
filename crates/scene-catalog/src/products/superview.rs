//! SuperView-1 scenes described by XML or DIMAP sidecars.

use crate::document::{MetadataDocument, XmlElement};
use crate::product::{
    BuilderKind, DocumentFormat, DocumentSelection, Naming, ProductSpec, TagSelection, Template,
};

/// Whether a parsed sidecar describes a SuperView-1 scene at all.
pub(crate) fn is_superview(root: &XmlElement) -> bool {
    root.text("SatelliteID")
        .map(|id| id.starts_with("SV1"))
        .unwrap_or(false)
        || root
            .text("Dataset_Sources/Scene_Source/MISSION")
            .map(|m| m.contains("SUPERVIEW"))
            .unwrap_or(false)
}

/// Processing level, e.g. `LEVEL1B`.
pub(crate) fn product_level(root: &XmlElement) -> Option<&str> {
    root.text("ProductLevel")
        .or_else(|| root.text("Production/PRODUCT_TYPE"))
}

/// Panchromatic for one band, multispectral for three or more.
fn select_superview(document: &MetadataDocument) -> DocumentSelection {
    let Some(root) = document.as_xml().filter(|root| is_superview(root)) else {
        return DocumentSelection::default();
    };
    let Some(product_name) = product_level(root) else {
        return DocumentSelection::default();
    };

    let bands = root
        .parse_text::<u32>("Bands")
        .or_else(|| root.parse_text::<u32>("Raster_Dimensions/NBANDS"));
    let tag = match bands {
        Some(1) => "Pan",
        Some(n) if n >= 3 => "MS",
        _ => return DocumentSelection::default(),
    };

    DocumentSelection {
        tags: vec![tag],
        product_name: Some(product_name.to_string()),
    }
}

pub static SUPERVIEW: ProductSpec = ProductSpec {
    name: "superview-1",
    description: "SuperView-1 panchromatic and multispectral scenes",
    format: DocumentFormat::Xml,
    builder: BuilderKind::SingleScene,
    extensions: &[".xml", ".dim"],
    default_filter: "SV*.xml;SW*.dim",
    selection: TagSelection::Document(select_superview),
    templates: &[
        Template {
            tag: "MS",
            raster_function: None,
            product_name: None,
            bands: &[],
        },
        Template {
            tag: "Pan",
            raster_function: None,
            product_name: None,
            bands: &[],
        },
    ],
    fields: &[],
    naming: Naming::Scene,
    requester_pays: false,
    cache_subdir: None,
    sensor_name: Some("SuperView-1"),
    paired_tokens: Some(("MUX", "PAN")),
};
