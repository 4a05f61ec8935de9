//! Spatial aggregation: point-in-polygon rollups with a bounding-rectangle
//! fallback when no polygon source is available.

pub mod aggregate;
pub mod bounds;

pub use aggregate::{AggregateOutcome, RegionPolygon, aggregate, aggregate_by_bounds};

/// Province prefixes stripped from polygon-source district names, long
/// official forms first so "전라남도" never half-matches via "전남".
static PROVINCE_PREFIXES: &[&str] = &[
    "서울특별시",
    "부산광역시",
    "대구광역시",
    "인천광역시",
    "광주광역시",
    "대전광역시",
    "울산광역시",
    "세종특별자치시",
    "강원특별자치도",
    "전북특별자치도",
    "제주특별자치도",
    "경기도",
    "충청북도",
    "충청남도",
    "전라북도",
    "전라남도",
    "경상북도",
    "경상남도",
    "강원도",
    "제주도",
];

/// Normalizes a district name for display and grouping: the province prefix
/// goes, and a compound name like "안산시 단원구" keeps its last token.
pub fn normalize_region_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = PROVINCE_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .map(str::trim_start)
        .unwrap_or(trimmed);
    stripped
        .split_whitespace()
        .last()
        .unwrap_or(stripped)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_province_prefix_is_stripped() {
        assert_eq!(normalize_region_name("전라남도 목포시"), "목포시");
        assert_eq!(normalize_region_name("서울특별시 강남구"), "강남구");
    }

    #[test]
    fn test_compound_names_keep_the_district_token() {
        assert_eq!(normalize_region_name("경기도 안산시 단원구"), "단원구");
    }

    #[test]
    fn test_bare_names_pass_through() {
        assert_eq!(normalize_region_name("목포시"), "목포시");
        assert_eq!(normalize_region_name("  목포시  "), "목포시");
    }
}
