//! Common types shared by the scene catalog crates.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod pixel;
pub mod time;

pub use bbox::BoundingBox;
pub use crs::SpatialReference;
pub use error::{SceneError, SceneResult};
pub use pixel::PixelType;
pub use time::normalize_acquisition_time;
