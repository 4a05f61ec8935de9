//! Risk scoring.
//!
//! Three classification strategies live here and stay strictly apart:
//!
//! - **Fixed-threshold**: the weighted index compared against absolute
//!   breakpoints (mg/L-derived). Per-reading, population-independent.
//! - **Percentile**: each index ranked against the full population of the
//!   current run and bucketed into five 20% bands. Meaningless for a single
//!   reading in isolation; recomputed whenever the population changes.
//! - **Ratio**: per-pollutant ratio against configured standards, weighted
//!   and compared against percentage breakpoints. A different scale from the
//!   plain weighted index — callers choose one scale and stay on it.

use crate::config::ScoringConfig;
use crate::model::{AlertLevel, Reading, ScoredReading};
use serde::Serialize;

/// Computes weighted indices and classifies them. Construct once per run
/// from the run's configuration.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    cfg: ScoringConfig,
}

impl RiskScorer {
    pub fn new(cfg: ScoringConfig) -> Self {
        RiskScorer { cfg }
    }

    /// `tp * w_p + tn * w_n`. Defined iff both pollutant values are present.
    pub fn weighted_index(&self, tp: Option<f64>, tn: Option<f64>) -> Option<f64> {
        match (tp, tn) {
            (Some(tp), Some(tn)) => Some(tp * self.cfg.tp_weight + tn * self.cfg.tn_weight),
            _ => None,
        }
    }

    /// Fixed-threshold classification against ascending absolute breakpoints.
    pub fn classify(&self, index: Option<f64>) -> AlertLevel {
        match index {
            None => AlertLevel::Unknown,
            Some(v) if v <= self.cfg.low_threshold => AlertLevel::Low,
            Some(v) if v <= self.cfg.medium_threshold => AlertLevel::Medium,
            Some(v) if v <= self.cfg.high_threshold => AlertLevel::High,
            Some(_) => AlertLevel::VeryHigh,
        }
    }

    /// Index plus fixed-threshold level in one step.
    pub fn score(&self, tp: Option<f64>, tn: Option<f64>) -> (Option<f64>, AlertLevel) {
        let index = self.weighted_index(tp, tn);
        (index, self.classify(index))
    }

    /// Annotates a reading with its score. The reading itself is moved, not
    /// mutated — scoring always produces a new value.
    pub fn score_reading(&self, reading: Reading) -> ScoredReading {
        let (weighted_index, alert_level) = self.score(reading.phosphorus, reading.nitrogen);
        ScoredReading {
            reading,
            weighted_index,
            alert_level,
        }
    }

    /// Ratio-scale assessment against the configured pollutant standards.
    /// Returns `None` when either pollutant value is missing.
    pub fn ratio_assessment(&self, tp: Option<f64>, tn: Option<f64>) -> Option<RatioAssessment> {
        let (tp, tn) = (tp?, tn?);

        let tp_ratio = if self.cfg.tp_standard > 0.0 { tp / self.cfg.tp_standard } else { 0.0 };
        let tn_ratio = if self.cfg.tn_standard > 0.0 { tn / self.cfg.tn_standard } else { 0.0 };
        let weighted_ratio =
            tp_ratio * self.cfg.ratio_tp_weight + tn_ratio * self.cfg.ratio_tn_weight;

        Some(RatioAssessment {
            alert: RatioAlert::from_weighted_ratio(weighted_ratio),
            weighted_index: tp * self.cfg.ratio_tp_weight + tn * self.cfg.ratio_tn_weight,
            weighted_ratio,
            tp_ratio,
            tn_ratio,
            tp_weighted: tp * self.cfg.ratio_tp_weight,
            tn_weighted: tn * self.cfg.ratio_tn_weight,
        })
    }
}

// ---------------------------------------------------------------------------
// Percentile classification
// ---------------------------------------------------------------------------

/// Percentile band (1..=5) of `value` within `population`.
///
/// Rank is the fraction of the population at or below the value, times 100,
/// bucketed into five equal 20% bands. The value itself is normally a member
/// of the population, so the maximum always ranks 100%. An empty population
/// maps every value to band 1.
pub fn percentile_band(value: f64, population: &[f64]) -> u8 {
    if population.is_empty() {
        return 1;
    }
    let at_or_below = population.iter().filter(|&&v| v <= value).count();
    let percentile = at_or_below as f64 / population.len() as f64 * 100.0;
    if percentile <= 20.0 {
        1
    } else if percentile <= 40.0 {
        2
    } else if percentile <= 60.0 {
        3
    } else if percentile <= 80.0 {
        4
    } else {
        5
    }
}

/// Presentation color for a percentile band, green through red.
pub fn band_color(band: u8) -> &'static str {
    match band {
        1 => "#2E8B57",
        2 => "#90EE90",
        3 => "#FFFF00",
        4 => "#FFA500",
        _ => "#FF0000",
    }
}

// ---------------------------------------------------------------------------
// Ratio scale
// ---------------------------------------------------------------------------

/// Ratio-scale alert stage. `Normal` plus five escalating stages, decided by
/// ascending percentage breakpoints of the weighted ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioAlert {
    Normal,
    Stage1,
    Stage2,
    Stage3,
    Stage4,
    Stage5,
}

impl RatioAlert {
    /// Highest breakpoint the weighted ratio has reached wins.
    fn from_weighted_ratio(ratio: f64) -> Self {
        if ratio >= 1.0 {
            RatioAlert::Stage5
        } else if ratio >= 0.8 {
            RatioAlert::Stage4
        } else if ratio >= 0.6 {
            RatioAlert::Stage3
        } else if ratio >= 0.4 {
            RatioAlert::Stage2
        } else if ratio >= 0.2 {
            RatioAlert::Stage1
        } else {
            RatioAlert::Normal
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RatioAlert::Normal => "water quality is in good condition",
            RatioAlert::Stage1 => "water quality needs attention",
            RatioAlert::Stage2 => "water quality needs vigilance",
            RatioAlert::Stage3 => "water quality warrants an alert",
            RatioAlert::Stage4 => "water quality warrants a serious alert",
            RatioAlert::Stage5 => "water quality warrants a critical alert",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RatioAlert::Normal => "#2E8B57",
            RatioAlert::Stage1 => "#90EE90",
            RatioAlert::Stage2 => "#FFFF00",
            RatioAlert::Stage3 => "#FFA500",
            RatioAlert::Stage4 => "#FF6347",
            RatioAlert::Stage5 => "#FF0000",
        }
    }
}

/// Full ratio-scale result: the stage plus the per-pollutant ratios and
/// weighted contributions behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioAssessment {
    pub alert: RatioAlert,
    pub weighted_index: f64,
    pub weighted_ratio: f64,
    pub tp_ratio: f64,
    pub tn_ratio: f64,
    pub tp_weighted: f64,
    pub tn_weighted: f64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
