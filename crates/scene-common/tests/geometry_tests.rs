//! Tests for the geometry value types used in descriptors.

use scene_common::bbox::BoundingBox;
use scene_common::crs::{SpatialReference, WGS84};

// ============================================================================
// BoundingBox tests
// ============================================================================

#[test]
fn test_bbox_new() {
    let bbox = BoundingBox::new(600000.0, 6090000.0, 709800.0, 6199800.0);
    assert_eq!(bbox.min_x, 600000.0);
    assert_eq!(bbox.min_y, 6090000.0);
    assert_eq!(bbox.max_x, 709800.0);
    assert_eq!(bbox.max_y, 6199800.0);
}

#[test]
fn test_bbox_copy() {
    let bbox1 = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let bbox2 = bbox1;
    assert_eq!(bbox1, bbox2);
}

#[test]
fn test_bbox_enclosing_single_point() {
    let bbox = BoundingBox::enclosing([[5.0, 6.0]]).unwrap();
    assert_eq!(bbox, BoundingBox::new(5.0, 6.0, 5.0, 6.0));
}

#[test]
fn test_bbox_enclosing_rejects_nan() {
    assert!(BoundingBox::enclosing([[f64::NAN, 0.0]]).is_err());
}

// ============================================================================
// SpatialReference tests
// ============================================================================

#[test]
fn test_spatial_reference_integer_text_is_wkt() {
    assert_eq!(
        SpatialReference::parse("32655").unwrap(),
        SpatialReference::Wkt("32655".into())
    );
}

#[test]
fn test_spatial_reference_wgs84_display() {
    assert_eq!(SpatialReference::Epsg(WGS84).to_string(), "EPSG:4326");
}

#[test]
fn test_utm_southern_hemisphere() {
    assert_eq!(
        SpatialReference::utm_for(-70.6, -33.4).unwrap(),
        SpatialReference::Epsg(32719)
    );
}

#[test]
fn test_utm_out_of_range() {
    assert!(SpatialReference::utm_for(200.0, 0.0).is_err());
    assert!(SpatialReference::utm_for(0.0, -91.0).is_err());
}
