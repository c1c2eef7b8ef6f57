//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::{SceneError, SceneResult};

/// A geographic or projected bounding box.
///
/// Coordinates are in the units of the scene's spatial reference:
/// degrees for EPSG:4326, meters for UTM zones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest box enclosing every point.
    ///
    /// Fails on an empty point list or on non-finite coordinates.
    pub fn enclosing<I>(points: I) -> SceneResult<Self>
    where
        I: IntoIterator<Item = [f64; 2]>,
    {
        let mut bbox: Option<BoundingBox> = None;
        for [x, y] in points {
            if !x.is_finite() || !y.is_finite() {
                return Err(SceneError::InvalidBbox(format!(
                    "non-finite coordinate ({}, {})",
                    x, y
                )));
            }
            bbox = Some(match bbox {
                None => BoundingBox::new(x, y, x, y),
                Some(b) => BoundingBox::new(
                    b.min_x.min(x),
                    b.min_y.min(y),
                    b.max_x.max(x),
                    b.max_y.max(y),
                ),
            });
        }
        bbox.ok_or_else(|| SceneError::InvalidBbox("no points".to_string()))
    }
}
