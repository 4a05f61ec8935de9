//! Core data types for the nutrient-runoff risk engine.
//!
//! This module defines the shared domain model imported by all other modules,
//! plus the typed error enums used at component boundaries. It contains no
//! I/O and no scoring logic — only types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Readings
// ---------------------------------------------------------------------------

/// A single measurement event from one monitoring station.
///
/// Produced by the acquirer from one external record (an API item, a
/// canonical cache row, or a legacy CSV row). Immutable after construction;
/// scoring produces a new [`ScoredReading`] rather than mutating in place.
///
/// Coordinates are decimal degrees after normalization. An axis that could
/// not be parsed is `None`; a value of exactly `0.0` means "unset", not
/// equator/prime-meridian. Readings without usable geometry stay in the set
/// for non-spatial statistics but are excluded from the spatial join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Stable station identifier (`ptNo` in the canonical schema).
    pub station_id: String,
    pub station_name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Total phosphorus, mg/L.
    pub phosphorus: Option<f64>,
    /// Total nitrogen, mg/L.
    pub nitrogen: Option<f64>,
    pub measured_at: Option<NaiveDate>,
}

impl Reading {
    /// True when both coordinates are present, non-zero and inside the
    /// WGS84 valid ranges. Only such readings enter the spatial join.
    pub fn has_geometry(&self) -> bool {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => {
                lat != 0.0
                    && lon != 0.0
                    && (-90.0..=90.0).contains(&lat)
                    && (-180.0..=180.0).contains(&lon)
            }
            _ => false,
        }
    }
}

/// A reading annotated with its risk score.
///
/// `weighted_index` is defined iff both pollutant values were present;
/// otherwise `alert_level` is [`AlertLevel::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredReading {
    #[serde(flatten)]
    pub reading: Reading,
    pub weighted_index: Option<f64>,
    pub alert_level: AlertLevel,
}

impl ScoredReading {
    /// Presentation color for the fixed-threshold level. Derived, never stored.
    pub fn color(&self) -> &'static str {
        self.alert_level.color()
    }
}

// ---------------------------------------------------------------------------
// Alert levels
// ---------------------------------------------------------------------------

/// Fixed-threshold risk classification of a weighted index, in ascending
/// order of severity. `Unknown` means the index was undefined (a missing
/// pollutant value), which renders gray — never to be confused with `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Unknown,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl AlertLevel {
    pub fn color(&self) -> &'static str {
        match self {
            AlertLevel::Low => "#2E8B57",
            AlertLevel::Medium => "#90EE90",
            AlertLevel::High => "#FFFF00",
            AlertLevel::VeryHigh => "#FF0000",
            AlertLevel::Unknown => "#808080",
        }
    }
}

// ---------------------------------------------------------------------------
// Region statistics
// ---------------------------------------------------------------------------

/// Per-administrative-region rollup produced by one aggregation run.
///
/// `region_name` is unique within a run after display-name normalization
/// (province prefix stripped). The region alert level is computed from the
/// region-level mean pollutant values, not from averaged per-point levels.
/// Discarded at the end of the run; every run recomputes from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    pub region_name: String,
    /// Means are taken over the values actually present in the region; a
    /// region whose stations all lack a pollutant carries `None`, not 0.
    pub mean_phosphorus: Option<f64>,
    pub mean_nitrogen: Option<f64>,
    pub mean_weighted_index: Option<f64>,
    pub alert_level: AlertLevel,
    /// 1..=5 percentile band over this run's *region* indices, when the
    /// caller asked for percentile classification. Region and point
    /// percentile pools are different populations and are never mixed.
    pub percentile_band: Option<u8>,
    pub station_count: usize,
}

// ---------------------------------------------------------------------------
// Source state
// ---------------------------------------------------------------------------

/// Which acquisition tier supplied the data for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTier {
    Remote,
    RefreshedCache,
    StaleCache,
    None,
}

/// Record of one acquisition call: the winning tier plus whatever made the
/// higher tiers fall through, so "nothing available" stays distinguishable
/// from "bug" without turning fallthrough into a fatal error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceState {
    pub tier: SourceTier,
    pub remote_error: Option<String>,
    pub cache_error: Option<String>,
    pub legacy_error: Option<String>,
}

impl SourceState {
    pub fn exhausted() -> Self {
        SourceState {
            tier: SourceTier::None,
            remote_error: None,
            cache_error: None,
            legacy_error: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from the remote tier. All of these trigger tier fallthrough; none
/// is surfaced as a fatal error to the caller of `collect()`.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("connectivity probe failed")]
    Probe,
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("malformed response envelope: {0}")]
    Envelope(String),
    /// Non-"00" resultCode in the envelope header — an API-level error
    /// distinct from HTTP failure.
    #[error("API error {code}: {message}")]
    ApiResult { code: String, message: String },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("remote service returned no rows")]
    Empty,
}

/// Errors reading or refreshing the canonical cache.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cache CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("canonical cache file not found: {0}")]
    Missing(String),
}

/// Errors merging the legacy category CSVs.
#[derive(Debug, Error)]
pub enum LegacyError {
    #[error("legacy I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("legacy CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{category}: missing column '{column}'")]
    MissingColumn { category: &'static str, column: String },
    #[error("no legacy source file produced any rows")]
    Empty,
}

/// A coordinate string that matched none of the supported encodings.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unrecognized coordinate: '{0}'")]
pub struct CoordParseError(pub String);

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
