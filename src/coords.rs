//! Coordinate normalization.
//!
//! Station coordinates arrive in heterogeneous string encodings: plain
//! decimal degrees, or one of several degree-minute-second textual forms
//! (`128°40'35.4"`, `128°20'.2"`, with or without the trailing seconds
//! fraction). This module turns any of them into decimal degrees.
//!
//! Patterns are tried strictly in order and the first match wins — there is
//! no fallback scoring between patterns. A string matching nothing is a
//! per-record error: the caller logs it, nulls that one axis and keeps the
//! reading for non-spatial statistics.

use crate::model::CoordParseError;
use regex::Regex;
use std::sync::LazyLock;

/// DMS patterns in trial order. Anchored at the start; the full-form
/// patterns (with the closing `"`) come before their loose variants so a
/// seconds fraction is never truncated.
static DMS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"^(\d+)°(\d+)'(\d+\.?\d*)""#,  // 128°40'35.4"
        r#"^(\d+)°(\d+)'\.(\d+\.?\d*)""#, // 128°20'.2" (stray dot before the seconds)
        r"^(\d+)°(\d+)'(\d+)",            // 128°40'35
        r"^(\d+)°(\d+)'\.(\d+)",          // 128°20'.2
    ]
    .iter()
    .map(|p| Regex::new(p).expect("coordinate pattern must compile"))
    .collect()
});

/// Parses one coordinate string into decimal degrees.
///
/// Decimal input is returned as-is; DMS input is converted as
/// `degrees + minutes/60 + seconds/3600`.
pub fn normalize(raw: &str) -> Result<f64, CoordParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoordParseError(raw.to_string()));
    }

    // Already a signed decimal number.
    if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() {
            return Ok(value);
        }
    }

    for pattern in DMS_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(trimmed) {
            let degrees: f64 = caps[1].parse().map_err(|_| CoordParseError(raw.to_string()))?;
            let minutes: f64 = caps[2].parse().map_err(|_| CoordParseError(raw.to_string()))?;
            let seconds: f64 = caps[3].parse().map_err(|_| CoordParseError(raw.to_string()))?;
            return Ok(degrees + minutes / 60.0 + seconds / 3600.0);
        }
    }

    Err(CoordParseError(raw.to_string()))
}

/// Normalizes one axis, logging the diagnostic on failure.
///
/// Each axis is normalized independently; a failure here nulls only this
/// axis, never the whole reading.
pub fn normalize_axis(raw: &str, axis: &str) -> Option<f64> {
    match normalize(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("{} unusable: {}", axis, err);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
