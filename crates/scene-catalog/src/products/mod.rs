//! Registry of the supported product families.

mod datacube;
mod geoscience;
mod stac;
mod superview;

pub use datacube::{DATACUBE_LANDSAT, DATACUBE_SENTINEL};
pub use geoscience::{GA_LANDSAT, GA_SENTINEL2, GEOSCIENCE};
pub use stac::STAC;
pub use superview::SUPERVIEW;

pub(crate) use superview::product_level;

use crate::error::{CatalogError, Result};
use crate::product::ProductSpec;

/// Every product family, in listing order.
pub fn all_products() -> [&'static ProductSpec; 7] {
    [
        &DATACUBE_LANDSAT,
        &DATACUBE_SENTINEL,
        &GA_LANDSAT,
        &GA_SENTINEL2,
        &GEOSCIENCE,
        &SUPERVIEW,
        &STAC,
    ]
}

/// Look up a product family by name (case-insensitive).
pub fn product_by_name(name: &str) -> Result<&'static ProductSpec> {
    all_products()
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| CatalogError::UnknownProduct(name.to_string()))
}
