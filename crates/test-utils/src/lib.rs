//! Shared test utilities for the scene catalog workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Sample sidecar documents for each product family
//! - Scene directory builders on `tempfile`
//! - An in-memory document fetcher for remote locators
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, SceneDir};
//! ```

pub mod fetcher;
pub mod fixtures;
pub mod scenes;

pub use fetcher::MemoryFetcher;
pub use scenes::SceneDir;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Approximate equality of a JSON number and a float.
///
/// ```ignore
/// assert_json_approx_eq!(record["keyProperties"]["OffNadir"], 5.0, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_json_approx_eq {
    ($value:expr, $expected:expr, $epsilon:expr) => {{
        match $value.as_f64() {
            Some(actual) => $crate::assert_approx_eq!(actual, $expected, $epsilon),
            None => panic!("assertion failed: `{:?}` is not a number", $value),
        }
    }};
}
