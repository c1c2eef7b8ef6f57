//! Spatial reference handling for scene descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{SceneError, SceneResult};

/// EPSG code of WGS84 geographic coordinates.
pub const WGS84: u32 = 4326;

/// Spatial reference of a scene.
///
/// Sidecar documents either name an authority code ("EPSG:32755") or carry a
/// full WKT definition. WKT is passed through untouched since resolving it is
/// the consumer's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpatialReference {
    Epsg(u32),
    Wkt(String),
}

impl SpatialReference {
    /// Interpret a document's spatial reference string.
    ///
    /// Accepts formats like:
    /// - "EPSG:32755"
    /// - "epsg:4326"
    /// - any other non-empty text, kept as WKT
    pub fn parse(s: &str) -> SceneResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SceneError::InvalidSpatialReference(
                "empty spatial reference".to_string(),
            ));
        }

        if let Some((authority, code)) = trimmed.split_once(':') {
            if authority.eq_ignore_ascii_case("EPSG") {
                return code.trim().parse::<u32>().map(SpatialReference::Epsg).map_err(|_| {
                    SceneError::InvalidSpatialReference(format!("bad EPSG code in '{}'", trimmed))
                });
            }
        }

        Ok(SpatialReference::Wkt(trimmed.to_string()))
    }

    /// WGS84 UTM zone containing a longitude/latitude position.
    ///
    /// Zones are numbered `1 + floor((lon + 180) / 6)`; northern zones map to
    /// EPSG 326zz and southern zones to 327zz.
    pub fn utm_for(lon: f64, lat: f64) -> SceneResult<Self> {
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(SceneError::InvalidSpatialReference(format!(
                "position ({}, {}) outside geographic range",
                lon, lat
            )));
        }
        let zone = (1 + ((lon + 180.0) / 6.0).floor() as u32).min(60);
        let base = if lat >= 0.0 { 32600 } else { 32700 };
        Ok(SpatialReference::Epsg(base + zone))
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialReference::Epsg(code) => write!(f, "EPSG:{}", code),
            SpatialReference::Wkt(wkt) => write!(f, "{}", wkt),
        }
    }
}
