//! Remote tier: the national water-quality open API.
//!
//! HTTP GET against a fixed base URL plus endpoint path, with a service-key
//! query parameter, paging parameters, and year/month selectors on the data
//! endpoint. The response body is an XML envelope: `header.resultCode`
//! (non-"00" is an API-level error distinct from HTTP failure) and
//! `body.items.item[]`, each item's child elements becoming one row keyed by
//! element tag name.
//!
//! Calls use a bounded timeout and are never retried inside one collection
//! run — a failed call is the designed trigger for tier fallback, not an
//! exceptional condition to retry past.

use crate::config::ApiConfig;
use crate::coords;
use crate::model::{AcquisitionError, Reading};
use chrono::{Duration as ChronoDuration, NaiveDate};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::BTreeMap;
use std::time::Duration;

/// One envelope item: child element tag → text content.
pub type RawRecord = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Envelope parsing
// ---------------------------------------------------------------------------

/// Parses the XML envelope into raw records.
///
/// A non-"00" `resultCode` in the header wins over whatever the body holds.
pub fn parse_envelope(xml: &str) -> Result<Vec<RawRecord>, AcquisitionError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<String> = Vec::new();
    let mut records: Vec<RawRecord> = Vec::new();
    let mut current: Option<RawRecord> = None;
    let mut result_code: Option<String> = None;
    let mut result_msg: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "item" {
                    current = Some(RawRecord::new());
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                // Self-closing child of an item carries an empty value.
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if stack.last().map(String::as_str) == Some("item") {
                    if let Some(record) = current.as_mut() {
                        record.insert(name, String::new());
                    }
                }
            }
            Ok(Event::End(_)) => {
                if stack.pop().as_deref() == Some("item") {
                    if let Some(record) = current.take() {
                        records.push(record);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| AcquisitionError::Envelope(e.to_string()))?
                    .trim()
                    .to_string();
                if text.is_empty() {
                    continue;
                }
                match stack.as_slice() {
                    [.., parent, tag] if parent == "item" => {
                        if let Some(record) = current.as_mut() {
                            record.insert(tag.clone(), text);
                        }
                    }
                    [.., parent, tag] if parent == "header" => {
                        if tag == "resultCode" {
                            result_code = Some(text);
                        } else if tag == "resultMsg" {
                            result_msg = Some(text);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(AcquisitionError::Envelope(e.to_string())),
            Ok(_) => {}
        }
    }

    if let Some(code) = result_code {
        if code != "00" {
            return Err(AcquisitionError::ApiResult {
                code,
                message: result_msg.unwrap_or_else(|| "unknown error".to_string()),
            });
        }
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// Validation gate
// ---------------------------------------------------------------------------

/// Canonical column names required of a remote batch.
const REQUIRED_COLUMNS: [&str; 4] = ["ptNo", "ptNm", "itemTp", "itemTn"];

/// Validates a combined remote batch before it may refresh the cache.
///
/// This gate is deliberately lenient: it fails only on missing required
/// columns or non-numeric pollutant text, not on implausible magnitude, so a
/// few bad rows never discard an entire batch. Negative values are flagged
/// in the log and kept — per-row outlier filtering is a separate, later
/// concern.
pub fn validate_records(records: &[RawRecord]) -> Result<(), AcquisitionError> {
    if records.is_empty() {
        return Err(AcquisitionError::Empty);
    }

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !records.iter().any(|r| r.contains_key(**col)))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(AcquisitionError::Validation(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut negatives = 0usize;
    for record in records {
        for col in ["itemTp", "itemTn"] {
            if let Some(text) = record.get(col) {
                if text.is_empty() {
                    continue;
                }
                match text.parse::<f64>() {
                    Ok(v) if v < 0.0 => negatives += 1,
                    Ok(_) => {}
                    Err(_) => {
                        return Err(AcquisitionError::Validation(format!(
                            "non-numeric {} value: '{}'",
                            col, text
                        )));
                    }
                }
            }
        }
    }
    if negatives > 0 {
        log::warn!("{} negative pollutant values in remote batch (kept)", negatives);
    }

    Ok(())
}

/// Builds a reading from one validated envelope item. Coordinate axes are
/// normalized independently; a failed axis is nulled, never the row.
pub fn reading_from_record(record: &RawRecord) -> Reading {
    let get = |key: &str| record.get(key).map(String::as_str).unwrap_or("");
    Reading {
        station_id: get("ptNo").to_string(),
        station_name: get("ptNm").to_string(),
        address: record.get("addr").filter(|s| !s.is_empty()).cloned(),
        latitude: record
            .get("latDgr")
            .filter(|s| !s.is_empty())
            .and_then(|s| coords::normalize_axis(s, "latDgr")),
        longitude: record
            .get("lonDgr")
            .filter(|s| !s.is_empty())
            .and_then(|s| coords::normalize_axis(s, "lonDgr")),
        phosphorus: get("itemTp").parse().ok(),
        nitrogen: get("itemTn").parse().ok(),
        measured_at: NaiveDate::parse_from_str(get("wmcymd"), "%Y.%m.%d").ok(),
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct ApiClient {
    client: reqwest::blocking::Client,
    cfg: ApiConfig,
    service_key: String,
}

impl ApiClient {
    pub fn new(cfg: ApiConfig) -> Result<Self, AcquisitionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        let service_key = cfg.resolved_service_key();
        Ok(ApiClient {
            client,
            cfg,
            service_key,
        })
    }

    fn request_page(
        &self,
        endpoint: &str,
        rows: u32,
        page: u32,
        extra: &[(&str, String)],
    ) -> Result<Vec<RawRecord>, AcquisitionError> {
        let url = format!("{}{}", self.cfg.base_url, endpoint);
        let mut query: Vec<(&str, String)> = vec![
            ("serviceKey", self.service_key.clone()),
            ("resultType", "xml".to_string()),
            ("numOfRows", rows.to_string()),
            ("pageNo", page.to_string()),
        ];
        query.extend_from_slice(extra);

        let response = self.client.get(&url).query(&query).send()?;
        if !response.status().is_success() {
            return Err(AcquisitionError::Http(response.status().as_u16()));
        }
        parse_envelope(&response.text()?)
    }

    /// Connectivity probe: one-row request against the station directory.
    pub fn probe(&self) -> bool {
        match self.request_page(&self.cfg.station_endpoint, 1, 1, &[]) {
            Ok(records) if !records.is_empty() => true,
            Ok(_) => {
                log::warn!("connectivity probe returned an empty directory");
                false
            }
            Err(err) => {
                log::warn!("connectivity probe failed: {}", err);
                false
            }
        }
    }

    /// Fetches one day of measurements, concatenating pages until a short
    /// page signals the end.
    pub fn fetch_day(&self, date: NaiveDate) -> Result<Vec<RawRecord>, AcquisitionError> {
        let selectors = [
            ("wmyrList", date.format("%Y").to_string()),
            ("wmodList", date.format("%m").to_string()),
        ];
        let wanted = date.format("%Y.%m.%d").to_string();
        let mut day_records = Vec::new();

        let mut page = 1u32;
        loop {
            let records =
                self.request_page(&self.cfg.measuring_endpoint, self.cfg.rows_per_page, page, &selectors)?;
            let page_len = records.len();
            day_records.extend(
                records
                    .into_iter()
                    .filter(|r| r.get("wmcymd").map(String::as_str) == Some(wanted.as_str())),
            );
            if page_len < self.cfg.rows_per_page as usize {
                break;
            }
            page += 1;
        }

        Ok(day_records)
    }

    /// Fetches the last `days_back` days in daily increments, throttling
    /// between calls to respect the per-call request-rate limit.
    ///
    /// `today` is injected so tests stay deterministic. A failed day is
    /// logged and skipped; only a batch with no rows at all is an error.
    pub fn fetch_recent(&self, today: NaiveDate) -> Result<Vec<RawRecord>, AcquisitionError> {
        let mut combined = Vec::new();
        for offset in (0..self.cfg.days_back).rev() {
            let date = today - ChronoDuration::days(offset);
            match self.fetch_day(date) {
                Ok(records) => combined.extend(records),
                Err(err) => log::warn!("daily fetch {} failed: {}", date, err),
            }
            std::thread::sleep(Duration::from_millis(self.cfg.throttle_ms));
        }

        if combined.is_empty() {
            return Err(AcquisitionError::Empty);
        }
        Ok(combined)
    }

    /// The full remote acquisition: fetch, validate, convert.
    pub fn collect_readings(&self, today: NaiveDate) -> Result<Vec<Reading>, AcquisitionError> {
        let records = self.fetch_recent(today)?;
        validate_records(&records)?;
        log::info!("remote batch validated: {} records", records.len());
        Ok(records.iter().map(reading_from_record).collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
