//! Bounding-rectangle fallback for runs without polygon data.
//!
//! A static table of administrative districts with coarse 0.1-degree
//! latitude/longitude rectangles, checked in order with the first match
//! winning. Entries are qualified by parent province because bare district
//! names repeat across metropolitan cities (four cities have a 중구); an
//! unqualified table can only keep one of them.
//!
//! The rectangles overlap and are deliberately crude. This path exists so a
//! run with no polygon source still produces a usable regional rollup, not
//! to compete with the spatial join.

/// One named district with its inclusive coordinate rectangle.
#[derive(Debug, Clone, Copy)]
pub struct RegionBounds {
    pub province: &'static str,
    pub name: &'static str,
    pub lat: (f64, f64),
    pub lon: (f64, f64),
}

impl RegionBounds {
    /// Province-qualified display key, unique across the table.
    pub fn key(&self) -> String {
        format!("{} {}", self.province, self.name)
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.lat.0 <= lat && lat <= self.lat.1 && self.lon.0 <= lon && lon <= self.lon.1
    }
}

const fn region(
    province: &'static str,
    name: &'static str,
    lat: (f64, f64),
    lon: (f64, f64),
) -> RegionBounds {
    RegionBounds {
        province,
        name,
        lat,
        lon,
    }
}

pub static REGION_BOUNDS: &[RegionBounds] = &[
    // 서울 25개 구
    region("서울", "강남구", (37.5, 37.6), (127.0, 127.1)),
    region("서울", "강동구", (37.5, 37.6), (127.1, 127.2)),
    region("서울", "강북구", (37.6, 37.7), (127.0, 127.1)),
    region("서울", "강서구", (37.5, 37.6), (126.8, 126.9)),
    region("서울", "관악구", (37.4, 37.5), (126.9, 127.0)),
    region("서울", "광진구", (37.5, 37.6), (127.1, 127.2)),
    region("서울", "구로구", (37.4, 37.5), (126.8, 126.9)),
    region("서울", "금천구", (37.4, 37.5), (126.9, 127.0)),
    region("서울", "노원구", (37.6, 37.7), (127.0, 127.1)),
    region("서울", "도봉구", (37.6, 37.7), (127.0, 127.1)),
    region("서울", "동대문구", (37.5, 37.6), (127.0, 127.1)),
    region("서울", "동작구", (37.4, 37.5), (126.9, 127.0)),
    region("서울", "마포구", (37.5, 37.6), (126.9, 127.0)),
    region("서울", "서대문구", (37.5, 37.6), (126.9, 127.0)),
    region("서울", "서초구", (37.4, 37.5), (127.0, 127.1)),
    region("서울", "성동구", (37.5, 37.6), (127.0, 127.1)),
    region("서울", "성북구", (37.5, 37.6), (127.0, 127.1)),
    region("서울", "송파구", (37.5, 37.6), (127.1, 127.2)),
    region("서울", "양천구", (37.5, 37.6), (126.8, 126.9)),
    region("서울", "영등포구", (37.5, 37.6), (126.9, 127.0)),
    region("서울", "용산구", (37.5, 37.6), (126.9, 127.0)),
    region("서울", "은평구", (37.6, 37.7), (126.9, 127.0)),
    region("서울", "종로구", (37.5, 37.6), (127.0, 127.1)),
    region("서울", "중구", (37.5, 37.6), (127.0, 127.1)),
    region("서울", "중랑구", (37.5, 37.6), (127.1, 127.2)),
    // 경기 주요 시군
    region("경기", "수원시", (37.2, 37.3), (126.9, 127.0)),
    region("경기", "성남시", (37.4, 37.5), (127.1, 127.2)),
    region("경기", "용인시", (37.2, 37.3), (127.1, 127.2)),
    region("경기", "부천시", (37.5, 37.6), (126.7, 126.8)),
    region("경기", "안산시", (37.3, 37.4), (126.8, 126.9)),
    region("경기", "안양시", (37.3, 37.4), (126.9, 127.0)),
    region("경기", "평택시", (36.9, 37.0), (127.1, 127.2)),
    region("경기", "시흥시", (37.3, 37.4), (126.8, 126.9)),
    region("경기", "김포시", (37.6, 37.7), (126.6, 126.7)),
    region("경기", "광명시", (37.4, 37.5), (126.8, 126.9)),
    region("경기", "광주시", (37.4, 37.5), (127.2, 127.3)),
    region("경기", "군포시", (37.3, 37.4), (126.9, 127.0)),
    region("경기", "하남시", (37.5, 37.6), (127.2, 127.3)),
    region("경기", "오산시", (37.1, 37.2), (127.0, 127.1)),
    region("경기", "이천시", (37.2, 37.3), (127.4, 127.5)),
    region("경기", "안성시", (37.0, 37.1), (127.2, 127.3)),
    region("경기", "의왕시", (37.3, 37.4), (127.0, 127.1)),
    region("경기", "양평군", (37.4, 37.5), (127.4, 127.5)),
    region("경기", "여주시", (37.2, 37.3), (127.6, 127.7)),
    region("경기", "과천시", (37.4, 37.5), (127.0, 127.1)),
    region("경기", "고양시", (37.6, 37.7), (126.8, 126.9)),
    region("경기", "남양주시", (37.6, 37.7), (127.2, 127.3)),
    region("경기", "파주시", (37.8, 37.9), (126.7, 126.8)),
    region("경기", "의정부시", (37.7, 37.8), (127.0, 127.1)),
    region("경기", "양주시", (37.8, 37.9), (127.0, 127.1)),
    region("경기", "구리시", (37.5, 37.6), (127.1, 127.2)),
    region("경기", "포천시", (37.8, 37.9), (127.2, 127.3)),
    region("경기", "동두천시", (37.9, 38.0), (127.0, 127.1)),
    region("경기", "가평군", (37.8, 37.9), (127.4, 127.5)),
    region("경기", "연천군", (38.0, 38.1), (127.0, 127.1)),
    // 부산 16개 구군
    region("부산", "중구", (35.1, 35.2), (129.0, 129.1)),
    region("부산", "서구", (35.1, 35.2), (129.0, 129.1)),
    region("부산", "동구", (35.1, 35.2), (129.0, 129.1)),
    region("부산", "영도구", (35.0, 35.1), (129.0, 129.1)),
    region("부산", "부산진구", (35.1, 35.2), (129.0, 129.1)),
    region("부산", "동래구", (35.2, 35.3), (129.0, 129.1)),
    region("부산", "남구", (35.1, 35.2), (129.0, 129.1)),
    region("부산", "북구", (35.2, 35.3), (129.0, 129.1)),
    region("부산", "해운대구", (35.1, 35.2), (129.1, 129.2)),
    region("부산", "사하구", (35.0, 35.1), (129.0, 129.1)),
    region("부산", "금정구", (35.2, 35.3), (129.0, 129.1)),
    region("부산", "강서구", (35.2, 35.3), (128.9, 129.0)),
    region("부산", "연제구", (35.2, 35.3), (129.0, 129.1)),
    region("부산", "수영구", (35.1, 35.2), (129.1, 129.2)),
    region("부산", "사상구", (35.1, 35.2), (128.9, 129.0)),
    region("부산", "기장군", (35.2, 35.3), (129.2, 129.3)),
    // 대구 8개 구군
    region("대구", "중구", (35.8, 35.9), (128.5, 128.6)),
    region("대구", "동구", (35.8, 35.9), (128.6, 128.7)),
    region("대구", "서구", (35.8, 35.9), (128.5, 128.6)),
    region("대구", "남구", (35.8, 35.9), (128.5, 128.6)),
    region("대구", "북구", (35.8, 35.9), (128.5, 128.6)),
    region("대구", "수성구", (35.8, 35.9), (128.6, 128.7)),
    region("대구", "달서구", (35.8, 35.9), (128.5, 128.6)),
    region("대구", "달성군", (35.7, 35.8), (128.4, 128.5)),
    // 인천 10개 구군
    region("인천", "중구", (37.4, 37.5), (126.5, 126.6)),
    region("인천", "동구", (37.4, 37.5), (126.6, 126.7)),
    region("인천", "미추홀구", (37.4, 37.5), (126.6, 126.7)),
    region("인천", "연수구", (37.4, 37.5), (126.6, 126.7)),
    region("인천", "남동구", (37.4, 37.5), (126.7, 126.8)),
    region("인천", "부평구", (37.5, 37.6), (126.7, 126.8)),
    region("인천", "계양구", (37.5, 37.6), (126.7, 126.8)),
    region("인천", "서구", (37.5, 37.6), (126.6, 126.7)),
    region("인천", "강화군", (37.7, 37.8), (126.4, 126.5)),
    region("인천", "옹진군", (37.4, 37.5), (126.3, 126.4)),
    // 그 외 광역시, 도 단위
    region("광주", "광주시", (35.1, 35.2), (126.8, 126.9)),
    region("대전", "대전시", (36.2, 36.4), (127.3, 127.5)),
    region("울산", "울산시", (35.4, 35.6), (129.2, 129.4)),
    region("세종", "세종시", (36.4, 36.6), (127.2, 127.4)),
    region("제주", "제주시", (33.4, 33.6), (126.5, 126.7)),
    region("강원", "강원도", (37.0, 38.5), (127.5, 129.5)),
    region("충북", "충청북도", (36.0, 37.5), (127.0, 128.5)),
    region("충남", "충청남도", (35.5, 37.0), (126.0, 127.5)),
    region("전북", "전라북도", (35.5, 36.5), (126.5, 127.8)),
    region("전남", "전라남도", (34.5, 36.0), (126.0, 127.5)),
    region("경북", "경상북도", (35.5, 37.5), (128.0, 129.5)),
    region("경남", "경상남도", (34.5, 36.0), (127.5, 129.0)),
];

/// Coarse province-level buckets for points no district rectangle claims.
static CATCH_ALL: &[RegionBounds] = &[
    region("경기", "기타", (37.0, 38.0), (126.5, 127.5)),
    region("충북", "기타", (35.5, 36.5), (127.0, 128.5)),
    region("경북", "기타", (35.0, 36.0), (128.0, 129.0)),
];

/// The residual bucket for points outside every known range.
pub const UNMATCHED_REGION: &str = "기타";

/// Maps a coordinate to a province-qualified region name. Table order
/// decides ties between overlapping rectangles.
pub fn find_region(lat: f64, lon: f64) -> String {
    REGION_BOUNDS
        .iter()
        .chain(CATCH_ALL.iter())
        .find(|r| r.contains(lat, lon))
        .map(RegionBounds::key)
        .unwrap_or_else(|| UNMATCHED_REGION.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
