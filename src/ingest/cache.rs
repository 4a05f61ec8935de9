//! Canonical CSV cache: the middle acquisition tier.
//!
//! Two files under `data/raw/` hold the last good remote batch in canonical
//! form: the measurement cache and a station-directory extract derived from
//! it. A refresh never destroys the previous state — every existing cache
//! file is copied into `data/backup/` with a timestamp suffix before being
//! overwritten, so a bad batch can always be rolled back by hand.

use crate::config::PathConfig;
use crate::model::{CacheError, Reading};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One row of the station-directory extract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub station_id: String,
    pub station_name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

/// True when the measurement cache exists and is non-empty on disk.
pub fn canonical_exists(paths: &PathConfig) -> bool {
    fs::metadata(paths.water_quality_path())
        .map(|m| m.len() > 0)
        .unwrap_or(false)
}

/// Loads the measurement cache.
pub fn read_canonical(paths: &PathConfig) -> Result<Vec<Reading>, CacheError> {
    let path = paths.water_quality_path();
    if !path.exists() {
        return Err(CacheError::Missing(path.display().to_string()));
    }
    read_readings(&path)
}

fn read_readings(path: &Path) -> Result<Vec<Reading>, CacheError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut readings = Vec::new();
    for row in reader.deserialize() {
        readings.push(row?);
    }
    Ok(readings)
}

// ---------------------------------------------------------------------------
// Write side
// ---------------------------------------------------------------------------

/// Derives the station directory from a measurement batch: one row per
/// distinct station id, first occurrence wins, ordered by id.
pub fn extract_stations(readings: &[Reading]) -> Vec<StationRecord> {
    let mut by_id: BTreeMap<&str, StationRecord> = BTreeMap::new();
    for reading in readings {
        if reading.station_id.is_empty() {
            continue;
        }
        by_id
            .entry(reading.station_id.as_str())
            .or_insert_with(|| StationRecord {
                station_id: reading.station_id.clone(),
                station_name: reading.station_name.clone(),
                address: reading.address.clone(),
                latitude: reading.latitude,
                longitude: reading.longitude,
            });
    }
    by_id.into_values().collect()
}

/// Copies `path` into the backup directory as `<stem>_<stamp>.csv` when it
/// already exists. Both cache files go through here so one refresh leaves
/// backups sharing a timestamp.
fn backup_existing(
    paths: &PathConfig,
    path: &Path,
    stem: &str,
    now: DateTime<Utc>,
) -> Result<(), CacheError> {
    if !path.exists() {
        return Ok(());
    }
    fs::create_dir_all(paths.backup_dir())?;
    let backup = paths
        .backup_dir()
        .join(format!("{stem}_{}.csv", now.format("%Y%m%d_%H%M%S")));
    fs::copy(path, &backup)?;
    log::info!("backed up previous cache to {}", backup.display());
    Ok(())
}

/// Replaces the cache with a fresh batch, backing up any previous cache
/// files first. `now` names the backups; callers pass wall-clock time,
/// tests pass a fixed instant.
pub fn refresh(
    paths: &PathConfig,
    readings: &[Reading],
    now: DateTime<Utc>,
) -> Result<(), CacheError> {
    fs::create_dir_all(paths.raw_dir())?;

    let canonical = paths.water_quality_path();
    backup_existing(paths, &canonical, "water_quality_data", now)?;
    backup_existing(paths, &paths.stations_path(), "measurement_stations", now)?;

    let mut writer = csv::Writer::from_path(&canonical)?;
    for reading in readings {
        writer.serialize(reading)?;
    }
    writer.flush()?;

    let mut writer = csv::Writer::from_path(paths.stations_path())?;
    for station in extract_stations(readings) {
        writer.serialize(station)?;
    }
    writer.flush()?;

    log::info!(
        "cache refreshed: {} readings, {} stations",
        readings.len(),
        extract_stations(readings).len()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
