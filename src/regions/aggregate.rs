//! Point-in-polygon aggregation of scored readings into region rollups.
//!
//! The region alert level comes from scoring the region's mean pollutant
//! values, never from averaging per-point levels; averaging ordinal levels
//! would let one clean station mask a hot one. Grouping runs over a
//! `BTreeMap` so rollup order is deterministic and a re-run over the same
//! inputs reproduces the same output.

use crate::model::{RegionStats, ScoredReading};
use crate::regions::{bounds, normalize_region_name};
use crate::scoring::{RiskScorer, percentile_band};
use geo::{Contains, MultiPolygon, Point};
use std::collections::BTreeMap;

/// One administrative region boundary in WGS84.
#[derive(Debug, Clone)]
pub struct RegionPolygon {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// Rollups plus the bookkeeping counters a run reports.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOutcome {
    pub regions: Vec<RegionStats>,
    /// Readings assigned to some region.
    pub matched: usize,
    /// Readings with usable geometry that fell inside no region.
    pub unmatched: usize,
    /// Readings excluded up front for missing or degenerate coordinates.
    pub skipped_no_geometry: usize,
}

/// Spatial-join path: containment against the supplied polygons, first
/// containing region wins. Unmatched points are counted and excluded from
/// every mean.
pub fn aggregate(
    readings: &[ScoredReading],
    polygons: &[RegionPolygon],
    scorer: &RiskScorer,
) -> AggregateOutcome {
    group_and_roll_up(readings, scorer, |point| {
        polygons
            .iter()
            .find(|region| region.geometry.contains(point))
            .map(|region| normalize_region_name(&region.name))
    })
}

/// Fallback path: the static bounding-rectangle table. Every point with
/// usable geometry lands somewhere, if only in the residual bucket.
pub fn aggregate_by_bounds(readings: &[ScoredReading], scorer: &RiskScorer) -> AggregateOutcome {
    group_and_roll_up(readings, scorer, |point| {
        Some(bounds::find_region(point.y(), point.x()))
    })
}

fn group_and_roll_up<F>(
    readings: &[ScoredReading],
    scorer: &RiskScorer,
    assign: F,
) -> AggregateOutcome
where
    F: Fn(&Point<f64>) -> Option<String>,
{
    let mut groups: BTreeMap<String, Vec<&ScoredReading>> = BTreeMap::new();
    let mut matched = 0usize;
    let mut unmatched = 0usize;
    let mut skipped_no_geometry = 0usize;

    for scored in readings {
        if !scored.reading.has_geometry() {
            skipped_no_geometry += 1;
            continue;
        }
        // has_geometry guarantees both axes.
        let point = Point::new(
            scored.reading.longitude.unwrap_or_default(),
            scored.reading.latitude.unwrap_or_default(),
        );
        match assign(&point) {
            Some(region) => {
                matched += 1;
                groups.entry(region).or_default().push(scored);
            }
            None => unmatched += 1,
        }
    }
    if unmatched > 0 {
        log::info!("{} readings fell inside no region boundary", unmatched);
    }

    let mut regions: Vec<RegionStats> = groups
        .into_iter()
        .map(|(region_name, members)| {
            let mean_phosphorus = mean_of(&members, |r| r.reading.phosphorus);
            let mean_nitrogen = mean_of(&members, |r| r.reading.nitrogen);
            let (mean_weighted_index, alert_level) =
                scorer.score(mean_phosphorus, mean_nitrogen);
            RegionStats {
                region_name,
                mean_phosphorus,
                mean_nitrogen,
                mean_weighted_index,
                alert_level,
                percentile_band: None,
                station_count: members.len(),
            }
        })
        .collect();
    assign_percentile_bands(&mut regions);

    AggregateOutcome {
        regions,
        matched,
        unmatched,
        skipped_no_geometry,
    }
}

fn mean_of<F>(members: &[&ScoredReading], value: F) -> Option<f64>
where
    F: Fn(&ScoredReading) -> Option<f64>,
{
    let present: Vec<f64> = members.iter().filter_map(|m| value(m)).collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// Ranks every region's mean index within this run's region population.
/// The population is region indices only; point-level indices would shift
/// every band.
fn assign_percentile_bands(regions: &mut [RegionStats]) {
    let population: Vec<f64> = regions
        .iter()
        .filter_map(|r| r.mean_weighted_index)
        .collect();
    for region in regions.iter_mut() {
        region.percentile_band = region
            .mean_weighted_index
            .map(|index| percentile_band(index, &population));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::model::{AlertLevel, Reading};
    use approx::assert_relative_eq;
    use geo::polygon;

    fn scorer() -> RiskScorer {
        RiskScorer::new(ScoringConfig::default())
    }

    fn scored(lat: Option<f64>, lon: Option<f64>, tp: Option<f64>, tn: Option<f64>) -> ScoredReading {
        scorer().score_reading(Reading {
            station_id: "T1".to_string(),
            station_name: "test".to_string(),
            address: None,
            latitude: lat,
            longitude: lon,
            phosphorus: tp,
            nitrogen: tn,
            measured_at: None,
        })
    }

    fn unit_square(name: &str, x0: f64, y0: f64) -> RegionPolygon {
        RegionPolygon {
            name: name.to_string(),
            geometry: MultiPolygon(vec![polygon![
                (x: x0, y: y0),
                (x: x0 + 1.0, y: y0),
                (x: x0 + 1.0, y: y0 + 1.0),
                (x: x0, y: y0 + 1.0),
            ]]),
        }
    }

    #[test]
    fn test_point_lands_in_its_containing_polygon() {
        let polygons = vec![
            unit_square("전라남도 목포시", 126.0, 34.0),
            unit_square("전라남도 여수시", 127.0, 34.0),
        ];
        let readings = vec![scored(Some(34.5), Some(126.5), Some(0.1), Some(2.0))];

        let outcome = aggregate(&readings, &polygons, &scorer());
        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.unmatched, 0);
        assert_eq!(outcome.regions.len(), 1);
        assert_eq!(outcome.regions[0].region_name, "목포시");
        assert_eq!(outcome.regions[0].station_count, 1);
    }

    #[test]
    fn test_unmatched_points_are_counted_and_excluded() {
        let polygons = vec![unit_square("목포시", 126.0, 34.0)];
        let readings = vec![
            scored(Some(34.5), Some(126.5), Some(0.1), Some(2.0)),
            scored(Some(40.0), Some(140.0), Some(9.9), Some(9.9)),
        ];

        let outcome = aggregate(&readings, &polygons, &scorer());
        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.unmatched, 1);
        let region = &outcome.regions[0];
        assert_relative_eq!(region.mean_phosphorus.unwrap(), 0.1);
    }

    #[test]
    fn test_missing_or_zero_geometry_is_skipped_up_front() {
        let polygons = vec![unit_square("목포시", 126.0, 34.0)];
        let readings = vec![
            scored(None, Some(126.5), Some(0.1), Some(2.0)),
            scored(Some(0.0), Some(0.0), Some(0.1), Some(2.0)),
        ];

        let outcome = aggregate(&readings, &polygons, &scorer());
        assert_eq!(outcome.skipped_no_geometry, 2);
        assert!(outcome.regions.is_empty());
    }

    #[test]
    fn test_region_level_means_are_scored_not_averaged_scores() {
        // Two stations whose individual indices straddle a threshold: the
        // region level must come from the mean values, not the mean levels.
        let polygons = vec![unit_square("목포시", 126.0, 34.0)];
        let readings = vec![
            scored(Some(34.2), Some(126.2), Some(0.2), Some(1.0)),
            scored(Some(34.8), Some(126.8), Some(1.0), Some(3.0)),
        ];

        let outcome = aggregate(&readings, &polygons, &scorer());
        let region = &outcome.regions[0];
        assert_relative_eq!(region.mean_phosphorus.unwrap(), 0.6, epsilon = 1e-12);
        assert_relative_eq!(region.mean_nitrogen.unwrap(), 2.0);
        // 0.6 * 0.99 + 2.0 * 0.01 = 0.614
        assert_relative_eq!(region.mean_weighted_index.unwrap(), 0.614, epsilon = 1e-12);
        assert_eq!(region.alert_level, AlertLevel::Medium);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let polygons = vec![
            unit_square("목포시", 126.0, 34.0),
            unit_square("여수시", 127.0, 34.0),
        ];
        let readings = vec![
            scored(Some(34.5), Some(126.5), Some(0.1), Some(2.0)),
            scored(Some(34.5), Some(127.5), Some(0.8), Some(4.0)),
            scored(Some(34.6), Some(127.2), Some(0.3), Some(1.5)),
        ];

        let first = aggregate(&readings, &polygons, &scorer());
        let second = aggregate(&readings, &polygons, &scorer());
        assert_eq!(first, second);
    }

    #[test]
    fn test_percentile_bands_rank_region_indices() {
        let readings = vec![
            scored(Some(37.55), Some(127.05), Some(0.1), Some(1.0)),
            scored(Some(35.15), Some(129.05), Some(2.0), Some(5.0)),
        ];

        let outcome = aggregate_by_bounds(&readings, &scorer());
        assert_eq!(outcome.regions.len(), 2);
        let by_name: BTreeMap<&str, &RegionStats> = outcome
            .regions
            .iter()
            .map(|r| (r.region_name.as_str(), r))
            .collect();
        // In a two-region population the low index ranks 50% and the high
        // one 100%.
        assert_eq!(by_name["서울 강남구"].percentile_band, Some(3));
        assert_eq!(by_name["부산 중구"].percentile_band, Some(5));
    }

    #[test]
    fn test_bounds_fallback_buckets_every_point() {
        let readings = vec![scored(Some(33.0), Some(124.0), Some(0.1), Some(1.0))];
        let outcome = aggregate_by_bounds(&readings, &scorer());
        assert_eq!(outcome.unmatched, 0);
        assert_eq!(outcome.regions[0].region_name, bounds::UNMATCHED_REGION);
    }
}
