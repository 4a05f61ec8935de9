//! Engine configuration.
//!
//! Weights, thresholds, standards, API settings and file paths live in one
//! explicit value object handed to each component's constructor. Nothing in
//! the crate reads configuration through a process-wide singleton, so tests
//! can substitute alternate weights or paths without global side effects.
//!
//! `EngineConfig::default()` carries the production values; an optional TOML
//! file overrides them field by field.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration, loadable from a TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub api: ApiConfig,
    pub scoring: ScoringConfig,
    pub paths: PathConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            api: ApiConfig::default(),
            scoring: ScoringConfig::default(),
            paths: PathConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a TOML file, falling back to defaults for
    /// any omitted section or field.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        toml::from_str(&text).map_err(|e| format!("failed to parse {}: {}", path.display(), e))
    }
}

// ---------------------------------------------------------------------------
// Remote service
// ---------------------------------------------------------------------------

/// Settings for the national water-quality open API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Issued service key, sent as the `serviceKey` query parameter. The
    /// `WQ_SERVICE_KEY` environment variable overrides this field.
    pub service_key: String,
    /// Measurement data endpoint (year/month selectors).
    pub measuring_endpoint: String,
    /// Station directory endpoint, also used by the connectivity probe.
    pub station_endpoint: String,
    /// Per-call row cap; fetches page until a short page comes back.
    pub rows_per_page: u32,
    /// How many days of history one collection run requests.
    pub days_back: i64,
    /// Delay between daily calls, to stay under the request-rate limit.
    pub throttle_ms: u64,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "http://apis.data.go.kr/1480523/WaterQualityService".to_string(),
            service_key: String::new(),
            measuring_endpoint: "/getWaterMeasuringList".to_string(),
            station_endpoint: "/listPoint".to_string(),
            rows_per_page: 1000,
            days_back: 30,
            throttle_ms: 100,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// The service key, preferring the environment over the config file so a
    /// checked-in config never has to carry the credential.
    pub fn resolved_service_key(&self) -> String {
        std::env::var("WQ_SERVICE_KEY").unwrap_or_else(|_| self.service_key.clone())
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Weights, classification thresholds and pollutant standards.
///
/// Phosphorus dominates the weighted index deliberately — it is the primary
/// driver of the eutrophication hazard being modeled. The ratio scale keeps
/// its own, slightly different weight pair; the two scales are independent
/// and callers stay on one of them within a run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub tp_weight: f64,
    pub tn_weight: f64,
    /// Ascending fixed-threshold breakpoints: low / medium / high.
    pub low_threshold: f64,
    pub medium_threshold: f64,
    pub high_threshold: f64,
    /// Pollutant standards for the ratio scale, mg/L.
    pub tp_standard: f64,
    pub tn_standard: f64,
    pub ratio_tp_weight: f64,
    pub ratio_tn_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            tp_weight: 0.99,
            tn_weight: 0.01,
            low_threshold: 0.5,
            medium_threshold: 1.0,
            high_threshold: 2.0,
            tp_standard: 0.1,
            tn_standard: 2.0,
            ratio_tp_weight: 0.99067,
            ratio_tn_weight: 0.00933,
        }
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// On-disk layout. The canonical cache pair lives under `raw/`, timestamped
/// backups under `backup/`, the legacy category CSVs wherever the historical
/// export was unpacked.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub data_dir: PathBuf,
    pub legacy_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        PathConfig {
            data_dir: PathBuf::from("data"),
            legacy_dir: PathBuf::from("Local_Water_CSV"),
            output_dir: PathBuf::from("data/output"),
        }
    }
}

impl PathConfig {
    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir.join("backup")
    }

    /// Canonical measurement cache.
    pub fn water_quality_path(&self) -> PathBuf {
        self.raw_dir().join("water_quality_data.csv")
    }

    /// Canonical station-directory extract.
    pub fn stations_path(&self) -> PathBuf {
        self.raw_dir().join("measurement_stations.csv")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
