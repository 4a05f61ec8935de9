//! Day-over-day trend of the mean weighted index.
//!
//! A degree-1 least-squares fit over daily means, with the day offset from
//! the first observed date as the independent variable. The call is honest
//! about thin data: fewer than two distinct days is reported as
//! insufficient, never extrapolated.

use crate::model::ScoredReading;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Mean weighted index of all scored readings sharing one sampling date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub mean_index: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendFit {
    pub direction: TrendDirection,
    /// Index units per day.
    pub slope: f64,
    pub total_days: usize,
    pub overall_mean: f64,
    pub min_daily_mean: f64,
    pub max_daily_mean: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendAnalysis {
    InsufficientData { days: usize },
    Fit(TrendFit),
}

/// Collapses scored readings into one stat per distinct sampling date.
/// Undated readings and readings without an index contribute nothing.
pub fn daily_stats(readings: &[ScoredReading]) -> Vec<DailyStat> {
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for scored in readings {
        if let (Some(date), Some(index)) = (scored.reading.measured_at, scored.weighted_index) {
            by_date.entry(date).or_default().push(index);
        }
    }
    by_date
        .into_iter()
        .map(|(date, indices)| DailyStat {
            date,
            mean_index: indices.iter().sum::<f64>() / indices.len() as f64,
        })
        .collect()
}

/// Fits the daily means. Increasing iff the slope is strictly positive; a
/// perfectly flat series reads as not increasing.
pub fn analyze(stats: &[DailyStat]) -> TrendAnalysis {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for stat in stats {
        // Last write wins on a duplicated date; callers built from
        // daily_stats never hit this.
        by_date.insert(stat.date, stat.mean_index);
    }
    if by_date.len() < 2 {
        return TrendAnalysis::InsufficientData {
            days: by_date.len(),
        };
    }

    let first = *by_date.keys().next().unwrap();
    let xs: Vec<f64> = by_date
        .keys()
        .map(|d| (*d - first).num_days() as f64)
        .collect();
    let ys: Vec<f64> = by_date.values().copied().collect();
    let n = xs.len() as f64;

    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;
    let numerator: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum();
    let denominator: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
    let slope = numerator / denominator;

    let direction = if slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };

    TrendAnalysis::Fit(TrendFit {
        direction,
        slope,
        total_days: by_date.len(),
        overall_mean: y_mean,
        min_daily_mean: ys.iter().copied().fold(f64::INFINITY, f64::min),
        max_daily_mean: ys.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::model::Reading;
    use crate::scoring::RiskScorer;
    use approx::assert_relative_eq;

    fn stat(day: u32, mean_index: f64) -> DailyStat {
        DailyStat {
            date: NaiveDate::from_ymd_opt(2025, 8, day).unwrap(),
            mean_index,
        }
    }

    #[test]
    fn test_single_day_is_insufficient() {
        assert_eq!(
            analyze(&[stat(1, 0.5)]),
            TrendAnalysis::InsufficientData { days: 1 }
        );
        assert_eq!(analyze(&[]), TrendAnalysis::InsufficientData { days: 0 });
    }

    #[test]
    fn test_rising_series_is_increasing() {
        let stats = [stat(1, 0.2), stat(2, 0.4), stat(3, 0.9)];
        match analyze(&stats) {
            TrendAnalysis::Fit(fit) => {
                assert_eq!(fit.direction, TrendDirection::Increasing);
                assert!(fit.slope > 0.0);
                assert_eq!(fit.total_days, 3);
                assert_relative_eq!(fit.overall_mean, 0.5);
                assert_relative_eq!(fit.min_daily_mean, 0.2);
                assert_relative_eq!(fit.max_daily_mean, 0.9);
            }
            other => panic!("expected a fit, got {:?}", other),
        }
    }

    #[test]
    fn test_flat_series_is_not_increasing() {
        let stats = [stat(1, 0.5), stat(2, 0.5), stat(3, 0.5)];
        match analyze(&stats) {
            TrendAnalysis::Fit(fit) => {
                assert_eq!(fit.direction, TrendDirection::Decreasing);
                assert_relative_eq!(fit.slope, 0.0);
            }
            other => panic!("expected a fit, got {:?}", other),
        }
    }

    #[test]
    fn test_gapped_dates_use_elapsed_days_not_sample_order() {
        // Same rise over one day vs. over ten days must not fit the same
        // slope.
        let tight = [stat(1, 0.2), stat(2, 0.6)];
        let sparse = [stat(1, 0.2), stat(11, 0.6)];
        let slope_of = |stats: &[DailyStat]| match analyze(stats) {
            TrendAnalysis::Fit(fit) => fit.slope,
            other => panic!("expected a fit, got {:?}", other),
        };
        assert_relative_eq!(slope_of(&tight), 0.4, epsilon = 1e-12);
        assert_relative_eq!(slope_of(&sparse), 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_daily_stats_group_by_date_and_skip_undated() {
        let scorer = RiskScorer::new(ScoringConfig::default());
        let reading = |day: Option<u32>, tp: f64| {
            scorer.score_reading(Reading {
                station_id: "T1".to_string(),
                station_name: "test".to_string(),
                address: None,
                latitude: None,
                longitude: None,
                phosphorus: Some(tp),
                nitrogen: Some(1.0),
                measured_at: day.and_then(|d| NaiveDate::from_ymd_opt(2025, 8, d)),
            })
        };
        let readings = vec![
            reading(Some(1), 0.1),
            reading(Some(1), 0.3),
            reading(Some(2), 0.5),
            reading(None, 9.9),
        ];

        let stats = daily_stats(&readings);
        assert_eq!(stats.len(), 2);
        // Day 1: mean of 0.109 and 0.307.
        assert_relative_eq!(stats[0].mean_index, 0.208, epsilon = 1e-12);
        assert_relative_eq!(stats[1].mean_index, 0.505, epsilon = 1e-12);
    }
}
