//! Acquisition time normalisation.

use chrono::{DateTime, NaiveDateTime};

use crate::{SceneError, SceneResult};

const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Normalise a sidecar timestamp to whole seconds with a space separator.
///
/// "2019-01-03T23:46:37.293127Z" becomes "2019-01-03 23:46:37". Timestamps
/// with an offset are kept in their own offset, not converted to UTC.
pub fn normalize_acquisition_time(raw: &str) -> SceneResult<String> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local().format(OUTPUT_FORMAT).to_string());
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return Ok(dt.format(OUTPUT_FORMAT).to_string());
        }
    }

    // Fall back to plain truncation for timestamps chrono rejects, e.g.
    // offsets without a colon.
    let head: String = trimmed.chars().take(19).collect();
    match NaiveDateTime::parse_from_str(&head, "%Y-%m-%dT%H:%M:%S") {
        Ok(dt) => Ok(dt.format(OUTPUT_FORMAT).to_string()),
        Err(_) => Err(SceneError::InvalidTime(raw.to_string())),
    }
}
