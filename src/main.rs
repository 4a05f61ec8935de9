//! Pipeline entry point: collect, score, aggregate, trend, write.

use chrono::Utc;
use nutrimon_engine::config::EngineConfig;
use nutrimon_engine::ingest::Collector;
use nutrimon_engine::model::{ScoredReading, SourceTier};
use nutrimon_engine::regions::aggregate_by_bounds;
use nutrimon_engine::scoring::{RiskScorer, band_color};
use nutrimon_engine::trend::{self, TrendAnalysis};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

const CONFIG_FILE: &str = "nutrimon.toml";

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = if Path::new(CONFIG_FILE).exists() {
        match EngineConfig::from_file(Path::new(CONFIG_FILE)) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::error!("{}", err);
                return ExitCode::FAILURE;
            }
        }
    } else {
        EngineConfig::default()
    };

    match run(&cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("pipeline failed: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cfg: &EngineConfig) -> Result<(), String> {
    let now = Utc::now();

    let outcome = Collector::new(cfg).collect(now);
    if outcome.state.tier == SourceTier::None {
        // Every tier exhausted: still emit the (empty) artifacts so
        // downstream consumers see a valid run with nothing in it.
        log::warn!("no data source available; writing empty output");
    } else {
        log::info!(
            "collected {} readings via {:?}",
            outcome.readings.len(),
            outcome.state.tier
        );
    }

    let scorer = RiskScorer::new(cfg.scoring.clone());
    let scored: Vec<ScoredReading> = outcome
        .readings
        .into_iter()
        .map(|reading| scorer.score_reading(reading))
        .collect();

    // No polygon source is wired in here; the rectangle table carries the
    // rollup.
    let aggregated = aggregate_by_bounds(&scored, &scorer);
    log::info!(
        "{} regions from {} matched readings ({} without geometry)",
        aggregated.regions.len(),
        aggregated.matched,
        aggregated.skipped_no_geometry
    );

    let daily = trend::daily_stats(&scored);
    let analysis = trend::analyze(&daily);

    fs::create_dir_all(&cfg.paths.output_dir)
        .map_err(|e| format!("cannot create output directory: {}", e))?;
    write_json(&cfg.paths.output_dir.join("scored_readings.json"), &scored)?;
    write_json(&cfg.paths.output_dir.join("region_stats.json"), &aggregated.regions)?;

    print_summary(&aggregated.regions, &analysis);
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("serialization failed: {}", e))?;
    fs::write(path, text).map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

fn print_summary(regions: &[nutrimon_engine::model::RegionStats], analysis: &TrendAnalysis) {
    println!("regions assessed: {}", regions.len());
    for region in regions {
        let band = region
            .percentile_band
            .map(|b| format!("band {} {}", b, band_color(b)))
            .unwrap_or_else(|| "no band".to_string());
        println!(
            "  {:<16} stations={:<3} level={:?} ({})",
            region.region_name, region.station_count, region.alert_level, band
        );
    }
    match analysis {
        TrendAnalysis::InsufficientData { days } => {
            println!("trend: insufficient data ({} distinct days)", days);
        }
        TrendAnalysis::Fit(fit) => {
            println!(
                "trend: {:?} (slope {:+.5}/day over {} days, mean {:.4}, range {:.4}..{:.4})",
                fit.direction,
                fit.slope,
                fit.total_days,
                fit.overall_mean,
                fit.min_daily_mean,
                fit.max_daily_mean
            );
        }
    }
}
