//! End-to-end acquisition fallback without network access.
//!
//! The remote tier points at an unroutable loopback port with a one-second
//! timeout, so the probe fails fast and deterministically; everything below
//! it runs against a temp directory.

use chrono::{TimeZone, Utc};
use nutrimon_engine::config::{ApiConfig, EngineConfig, PathConfig};
use nutrimon_engine::ingest::{Collector, cache};
use nutrimon_engine::model::SourceTier;
use nutrimon_engine::regions::aggregate_by_bounds;
use nutrimon_engine::scoring::RiskScorer;
use nutrimon_engine::trend::{self, TrendAnalysis};
use std::fs;
use std::path::Path;

fn offline_config(dir: &Path) -> EngineConfig {
    EngineConfig {
        api: ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            throttle_ms: 0,
            ..ApiConfig::default()
        },
        paths: PathConfig {
            data_dir: dir.join("data"),
            legacy_dir: dir.join("Local_Water_CSV"),
            output_dir: dir.join("data").join("output"),
        },
        ..EngineConfig::default()
    }
}

fn seed_legacy_files(legacy_dir: &Path) {
    fs::create_dir_all(legacy_dir).unwrap();

    let river = "측정소코드,측정소명,년도,월,경도,위도,TN_mgL,TP_mgL\n\
ES01,낙동강상류,2025,6,128.7321,36.5512,1.82,0.044\n\
ES02,낙동강하류,2025,6,\"128°40'35.4\"\"\",\"35°22'11.0\"\"\",2.31,0.067\n";
    let urban = "분류번호,측정소명,년,월,경도,위도,TN(㎎/L),TP(㎎/L)\n\
U001,도심천A,2025,6,127.0421,37.5311,3.10,0.120\n\
U002,도심천B,2025,6,127.1002,37.4888,,\n";

    let (river_bytes, _, _) = encoding_rs::EUC_KR.encode(river);
    let (urban_bytes, _, _) = encoding_rs::EUC_KR.encode(urban);
    fs::write(
        legacy_dir.join("자료 조회_하천_20250806.csv"),
        river_bytes.into_owned(),
    )
    .unwrap();
    fs::write(legacy_dir.join("도시관류.csv"), urban_bytes.into_owned()).unwrap();
}

#[test]
fn test_fallback_chain_legacy_then_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = offline_config(dir.path());
    seed_legacy_files(&cfg.paths.legacy_dir);

    // First run: probe fails, no cache exists, legacy exports serve.
    let collector = Collector::new(&cfg);
    let first = collector.collect(Utc::now());
    assert_eq!(first.state.tier, SourceTier::StaleCache);
    assert_eq!(first.readings.len(), 3, "merged river + usable urban rows");
    assert!(first.state.remote_error.is_some());
    assert!(first.state.cache_error.is_some());

    // A refresh writes the canonical pair; the next run stops at the cache
    // and serves the same readings back bit-identical.
    let stamp = Utc.with_ymd_and_hms(2025, 8, 6, 9, 0, 0).unwrap();
    cache::refresh(&cfg.paths, &first.readings, stamp).unwrap();
    assert!(cfg.paths.stations_path().exists());

    let second = collector.collect(Utc::now());
    assert_eq!(second.state.tier, SourceTier::RefreshedCache);
    assert_eq!(second.readings, first.readings);
}

#[test]
fn test_refresh_backup_preserves_previous_canonical_file() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = offline_config(dir.path());
    seed_legacy_files(&cfg.paths.legacy_dir);

    let collector = Collector::new(&cfg);
    let outcome = collector.collect(Utc::now());
    let first_stamp = Utc.with_ymd_and_hms(2025, 8, 6, 9, 0, 0).unwrap();
    cache::refresh(&cfg.paths, &outcome.readings, first_stamp).unwrap();
    let original_bytes = fs::read(cfg.paths.water_quality_path()).unwrap();

    // Overwrite with a strict subset and check the timestamped backup holds
    // the pre-refresh content byte for byte.
    let subset: Vec<_> = outcome.readings.iter().take(1).cloned().collect();
    let second_stamp = Utc.with_ymd_and_hms(2025, 8, 7, 9, 0, 0).unwrap();
    cache::refresh(&cfg.paths, &subset, second_stamp).unwrap();

    let backup = cfg
        .paths
        .backup_dir()
        .join("water_quality_data_20250807_090000.csv");
    assert!(backup.exists());
    assert_eq!(fs::read(&backup).unwrap(), original_bytes);
    assert_ne!(
        fs::read(cfg.paths.water_quality_path()).unwrap(),
        original_bytes,
        "canonical file must differ when the source batch differed"
    );
}

#[test]
fn test_offline_run_still_produces_regional_rollup() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = offline_config(dir.path());
    seed_legacy_files(&cfg.paths.legacy_dir);

    let outcome = Collector::new(&cfg).collect(Utc::now());
    let scorer = RiskScorer::new(cfg.scoring.clone());
    let scored: Vec<_> = outcome
        .readings
        .into_iter()
        .map(|r| scorer.score_reading(r))
        .collect();

    let aggregated = aggregate_by_bounds(&scored, &scorer);
    assert_eq!(aggregated.skipped_no_geometry, 0);
    assert_eq!(aggregated.matched, 3);
    // 도심천A sits in the 강남구 rectangle; the river stations land in the
    // province-level rectangles.
    assert!(
        aggregated
            .regions
            .iter()
            .any(|r| r.region_name == "서울 강남구")
    );
}

#[test]
fn test_exhausted_sources_yield_an_empty_run_not_a_failure() {
    // No cache, no legacy exports, unreachable remote: every tier falls
    // through, and the downstream stages must treat the empty batch as a
    // no-op rather than an error.
    let dir = tempfile::tempdir().unwrap();
    let cfg = offline_config(dir.path());

    let outcome = Collector::new(&cfg).collect(Utc::now());
    assert_eq!(outcome.state.tier, SourceTier::None);
    assert!(outcome.readings.is_empty());

    let scorer = RiskScorer::new(cfg.scoring.clone());
    let scored: Vec<_> = outcome
        .readings
        .into_iter()
        .map(|r| scorer.score_reading(r))
        .collect();
    let aggregated = aggregate_by_bounds(&scored, &scorer);
    assert!(aggregated.regions.is_empty());
    assert_eq!(aggregated.matched, 0);

    assert!(matches!(
        trend::analyze(&trend::daily_stats(&scored)),
        TrendAnalysis::InsufficientData { days: 0 }
    ));
    assert_eq!(serde_json::to_string(&aggregated.regions).unwrap(), "[]");
}
