//! Legacy tier: five municipal CSV exports merged into canonical readings.
//!
//! The exports predate the open API and come in two shapes. The river and
//! agricultural files carry no usable header so their columns are taken by
//! position; the urban, industrial and reservoir files are header-addressed
//! with their own naming. All five are cp949-encoded, carry coordinates in
//! mixed decimal/DMS text, and know nothing about sampling dates or
//! addresses, so merged readings have `measured_at` and `address` unset.
//!
//! A missing file is skipped, not fatal. Only a directory that yields no
//! rows at all fails the tier.

use crate::coords;
use crate::model::{LegacyError, Reading};
use encoding_rs::EUC_KR;
use std::fs;
use std::path::Path;

// ---------------------------------------------------------------------------
// Category table
// ---------------------------------------------------------------------------

/// How a category's CSV maps onto the canonical fields.
#[derive(Debug, Clone, Copy)]
pub enum ColumnMap {
    /// Fixed layout: code, name, year, month, longitude, latitude, TN, TP.
    Positional,
    /// Header-addressed layout with the export's own column names.
    Named {
        code: &'static str,
        name: &'static str,
        longitude: &'static str,
        latitude: &'static str,
        nitrogen: &'static str,
        phosphorus: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct LegacyCategory {
    pub label: &'static str,
    pub file_name: &'static str,
    pub columns: ColumnMap,
    /// Rows missing either pollutant are dropped for these exports; the
    /// positional exports carry no such gaps.
    pub require_pollutants: bool,
}

const NAMED_EXPORT: ColumnMap = ColumnMap::Named {
    code: "분류번호",
    name: "측정소명",
    longitude: "경도",
    latitude: "위도",
    nitrogen: "TN(㎎/L)",
    phosphorus: "TP(㎎/L)",
};

pub const CATEGORIES: [LegacyCategory; 5] = [
    LegacyCategory {
        label: "river",
        file_name: "자료 조회_하천_20250806.csv",
        columns: ColumnMap::Positional,
        require_pollutants: false,
    },
    LegacyCategory {
        label: "agricultural",
        file_name: "자료 조회_농업용수_20250806.csv",
        columns: ColumnMap::Positional,
        require_pollutants: false,
    },
    LegacyCategory {
        label: "urban",
        file_name: "도시관류.csv",
        columns: NAMED_EXPORT,
        require_pollutants: true,
    },
    LegacyCategory {
        label: "industrial",
        file_name: "산단하천.csv",
        columns: NAMED_EXPORT,
        require_pollutants: true,
    },
    LegacyCategory {
        label: "reservoir",
        file_name: "호소.csv",
        columns: NAMED_EXPORT,
        require_pollutants: true,
    },
];

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Column indices resolved against one file.
struct FieldIndices {
    code: usize,
    name: usize,
    longitude: usize,
    latitude: usize,
    nitrogen: usize,
    phosphorus: usize,
}

fn resolve_indices(
    headers: &csv::StringRecord,
    category: &LegacyCategory,
) -> Result<FieldIndices, LegacyError> {
    match category.columns {
        ColumnMap::Positional => Ok(FieldIndices {
            code: 0,
            name: 1,
            longitude: 4,
            latitude: 5,
            nitrogen: 6,
            phosphorus: 7,
        }),
        ColumnMap::Named {
            code,
            name,
            longitude,
            latitude,
            nitrogen,
            phosphorus,
        } => {
            let find = |wanted: &str| -> Result<usize, LegacyError> {
                headers
                    .iter()
                    .position(|h| h.trim() == wanted)
                    .ok_or_else(|| LegacyError::MissingColumn {
                        category: category.label,
                        column: wanted.to_string(),
                    })
            };
            Ok(FieldIndices {
                code: find(code)?,
                name: find(name)?,
                longitude: find(longitude)?,
                latitude: find(latitude)?,
                nitrogen: find(nitrogen)?,
                phosphorus: find(phosphorus)?,
            })
        }
    }
}

fn parse_value(record: &csv::StringRecord, index: usize) -> Option<f64> {
    record
        .get(index)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

/// Parses one category's raw cp949 bytes into canonical readings.
///
/// Rows whose coordinates match no supported encoding are dropped; a legacy
/// station nobody can place on the map has no downstream use.
pub fn parse_category(bytes: &[u8], category: &LegacyCategory) -> Result<Vec<Reading>, LegacyError> {
    let (text, _, _) = EUC_KR.decode(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let indices = resolve_indices(&headers, category)?;

    let mut readings = Vec::new();
    let mut dropped_coords = 0usize;
    let mut dropped_pollutants = 0usize;

    for row in reader.records() {
        let record = row?;
        let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");

        let phosphorus = parse_value(&record, indices.phosphorus);
        let nitrogen = parse_value(&record, indices.nitrogen);
        if category.require_pollutants && (phosphorus.is_none() || nitrogen.is_none()) {
            dropped_pollutants += 1;
            continue;
        }

        let latitude = coords::normalize(field(indices.latitude)).ok();
        let longitude = coords::normalize(field(indices.longitude)).ok();
        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            dropped_coords += 1;
            continue;
        };

        readings.push(Reading {
            station_id: field(indices.code).to_string(),
            station_name: field(indices.name).to_string(),
            address: None,
            latitude: Some(latitude),
            longitude: Some(longitude),
            phosphorus,
            nitrogen,
            measured_at: None,
        });
    }

    if dropped_pollutants > 0 {
        log::info!(
            "{}: dropped {} rows missing pollutant values",
            category.label,
            dropped_pollutants
        );
    }
    if dropped_coords > 0 {
        log::info!(
            "{}: dropped {} rows with unusable coordinates",
            category.label,
            dropped_coords
        );
    }

    Ok(readings)
}

/// Merges every category file present under the legacy directory.
pub fn load_all(legacy_dir: &Path) -> Result<Vec<Reading>, LegacyError> {
    let mut merged = Vec::new();
    for category in &CATEGORIES {
        let path = legacy_dir.join(category.file_name);
        if !path.exists() {
            log::debug!("{}: no file at {}", category.label, path.display());
            continue;
        }
        let bytes = fs::read(&path)?;
        let readings = parse_category(&bytes, category)?;
        log::info!("{}: {} readings", category.label, readings.len());
        merged.extend(readings);
    }

    if merged.is_empty() {
        return Err(LegacyError::Empty);
    }
    Ok(merged)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn cp949(text: &str) -> Vec<u8> {
        let (bytes, _, _) = EUC_KR.encode(text);
        bytes.into_owned()
    }

    fn category(label: &str) -> &'static LegacyCategory {
        CATEGORIES
            .iter()
            .find(|c| c.label == label)
            .expect("known category label")
    }

    const RIVER_CSV: &str = "\
측정소코드,측정소명,년도,월,경도,위도,TN_mgL,TP_mgL
ES01,낙동강상류,2025,6,128.7321,36.5512,1.82,0.044
ES02,낙동강하류,2025,6,\"128°40'35.4\"\"\",\"35°22'11.0\"\"\",2.31,0.067
";

    const URBAN_CSV: &str = "\
분류번호,측정소명,년,월,경도,위도,TN(㎎/L),TP(㎎/L)
U001,도심천A,2025,6,127.0421,37.5311,3.10,0.120
U002,도심천B,2025,6,127.1002,37.4888,,
U003,도심천C,2025,6,unparseable,37.5000,2.00,0.080
";

    #[test]
    fn test_positional_category_parses_decimal_and_dms_rows() {
        let readings = parse_category(&cp949(RIVER_CSV), category("river")).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].station_id, "ES01");
        assert_eq!(readings[0].longitude, Some(128.7321));
        assert_eq!(readings[0].phosphorus, Some(0.044));
        let dms_lon = readings[1].longitude.unwrap();
        assert!((dms_lon - (128.0 + 40.0 / 60.0 + 35.4 / 3600.0)).abs() < 1e-9);
        assert_eq!(readings[1].measured_at, None);
    }

    #[test]
    fn test_named_category_drops_rows_missing_pollutants_or_coordinates() {
        let readings = parse_category(&cp949(URBAN_CSV), category("urban")).unwrap();
        assert_eq!(readings.len(), 1, "empty-pollutant and bad-coordinate rows go");
        assert_eq!(readings[0].station_id, "U001");
        assert_eq!(readings[0].station_name, "도심천A");
        assert_eq!(readings[0].nitrogen, Some(3.10));
    }

    #[test]
    fn test_named_category_requires_its_headers() {
        let csv = "코드,이름\nX,Y\n";
        match parse_category(&cp949(csv), category("reservoir")) {
            Err(LegacyError::MissingColumn { category, column }) => {
                assert_eq!(category, "reservoir");
                assert_eq!(column, "분류번호");
            }
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_load_all_skips_missing_files_and_merges_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(category("river").file_name),
            cp949(RIVER_CSV),
        )
        .unwrap();
        fs::write(
            dir.path().join(category("urban").file_name),
            cp949(URBAN_CSV),
        )
        .unwrap();

        let merged = load_all(dir.path()).unwrap();
        assert_eq!(merged.len(), 3);
        assert!(merged.iter().any(|r| r.station_id == "ES02"));
        assert!(merged.iter().any(|r| r.station_id == "U001"));
    }

    #[test]
    fn test_empty_directory_fails_the_tier() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load_all(dir.path()), Err(LegacyError::Empty)));
    }
}
