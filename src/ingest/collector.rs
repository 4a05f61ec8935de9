//! Tiered acquisition: remote API, then canonical cache, then legacy CSVs.
//!
//! The tiers short-circuit in that order and a lower tier is consulted only
//! when every higher one has failed. Exhausting all three yields an empty
//! outcome, never an error; the caller decides whether an empty run is
//! worth reporting.

use crate::config::EngineConfig;
use crate::ingest::{api::ApiClient, cache, legacy};
use crate::logging;
use crate::model::{Reading, SourceState, SourceTier};
use chrono::{DateTime, Utc};

/// What one acquisition run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectOutcome {
    pub readings: Vec<Reading>,
    pub state: SourceState,
}

pub struct Collector<'a> {
    cfg: &'a EngineConfig,
}

impl<'a> Collector<'a> {
    pub fn new(cfg: &'a EngineConfig) -> Self {
        Collector { cfg }
    }

    /// Runs the tiers in order. `now` stamps the cache backup and anchors
    /// the remote date window; callers pass wall-clock time, tests pass a
    /// fixed instant.
    pub fn collect(&self, now: DateTime<Utc>) -> CollectOutcome {
        let mut state = SourceState::exhausted();

        // Tier 1: remote API, refreshing the cache on success.
        match self.try_remote(now) {
            Ok(readings) => {
                if let Err(err) = cache::refresh(&self.cfg.paths, &readings, now) {
                    // The remote data is still good; only the cache is stale.
                    log::warn!("cache refresh failed, continuing with remote data: {}", err);
                }
                state.tier = SourceTier::Remote;
                return CollectOutcome { readings, state };
            }
            Err(err) => {
                logging::log_tier_fallthrough(SourceTier::Remote, &err);
                state.remote_error = Some(err.to_string());
            }
        }

        // Tier 2: the canonical cache from a previous successful run.
        match cache::read_canonical(&self.cfg.paths) {
            Ok(readings) if !readings.is_empty() => {
                log::info!("serving {} readings from the canonical cache", readings.len());
                state.tier = SourceTier::RefreshedCache;
                return CollectOutcome { readings, state };
            }
            Ok(_) => {
                state.cache_error = Some("canonical cache is empty".to_string());
            }
            Err(err) => {
                log::info!("canonical cache unavailable: {}", err);
                state.cache_error = Some(err.to_string());
            }
        }

        // Tier 3: the legacy category exports.
        match legacy::load_all(&self.cfg.paths.legacy_dir) {
            Ok(readings) => {
                log::info!("serving {} readings from legacy exports", readings.len());
                state.tier = SourceTier::StaleCache;
                return CollectOutcome { readings, state };
            }
            Err(err) => {
                log::error!("legacy exports unavailable: {}", err);
                state.legacy_error = Some(err.to_string());
            }
        }

        log::error!("all acquisition tiers exhausted; no data this run");
        CollectOutcome {
            readings: Vec::new(),
            state,
        }
    }

    fn try_remote(&self, now: DateTime<Utc>) -> Result<Vec<Reading>, crate::model::AcquisitionError> {
        let client = ApiClient::new(self.cfg.api.clone())?;
        if !client.probe() {
            return Err(crate::model::AcquisitionError::Probe);
        }
        client.collect_readings(now.date_naive())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
