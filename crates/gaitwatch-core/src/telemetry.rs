//! Telemetry records and feed parsing.
//!
//! The wearable publishes one entry per polling cycle to a ThingSpeak
//! channel. Entries carry their readings as string fields:
//!
//! | field    | reading            |
//! |----------|--------------------|
//! | `field1` | pulse (BPM)        |
//! | `field2` | blood oxygen (%)   |
//! | `field3` | body temperature   |
//! | `field4` | x acceleration     |
//! | `field5` | y acceleration     |
//! | `field6` | z acceleration     |
//!
//! Absent or `null` fields read as `0`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::TelemetryError;
use crate::types::{AccelSample, LiveVitalReading, VitalChannel};

/// One polling cycle's readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Feed entry id, when known.
    pub entry_id: Option<u64>,
    /// Publication time, when known.
    pub created_at: Option<DateTime<Utc>>,
    /// Pulse in BPM.
    pub pulse: f64,
    /// Blood oxygen saturation.
    pub oxygen: f64,
    /// Body temperature.
    pub temperature: f64,
    /// Tri-axial acceleration.
    pub accel: AccelSample,
}

impl TelemetryRecord {
    /// A record without feed metadata.
    #[must_use]
    pub fn new(pulse: f64, oxygen: f64, temperature: f64, accel: AccelSample) -> Self {
        Self {
            entry_id: None,
            created_at: None,
            pulse,
            oxygen,
            temperature,
            accel,
        }
    }

    /// Scalar readings of this record.
    #[must_use]
    pub fn vitals(&self) -> [LiveVitalReading; 3] {
        [
            LiveVitalReading {
                channel: VitalChannel::Pulse,
                value: self.pulse,
            },
            LiveVitalReading {
                channel: VitalChannel::Oxygen,
                value: self.oxygen,
            },
            LiveVitalReading {
                channel: VitalChannel::Temperature,
                value: self.temperature,
            },
        ]
    }
}

/// Source of recent telemetry records.
pub trait TelemetrySource {
    /// Up to `n` most recent records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError`] if the records cannot be retrieved.
    fn latest_readings(&self, n: usize) -> Result<Vec<TelemetryRecord>, TelemetryError>;
}

/// Last `n` items of a slice, as an owned vector.
fn tail<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items[items.len().saturating_sub(n)..].to_vec()
}

// ---------------------------------------------------------------------------
// ThingSpeak feed
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawFeed {
    #[serde(default)]
    feeds: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    entry_id: Option<u64>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    field1: Value,
    #[serde(default)]
    field2: Value,
    #[serde(default)]
    field3: Value,
    #[serde(default)]
    field4: Value,
    #[serde(default)]
    field5: Value,
    #[serde(default)]
    field6: Value,
}

fn numeric(value: &Value, entry: usize, field: &'static str) -> Result<f64, TelemetryError> {
    let invalid = || TelemetryError::InvalidField {
        entry,
        field,
        value: value.to_string(),
    };
    match value {
        Value::Null => Ok(0.0),
        Value::Number(n) => n.as_f64().ok_or_else(invalid),
        Value::String(s) => s.trim().parse().map_err(|_| TelemetryError::InvalidField {
            entry,
            field,
            value: s.clone(),
        }),
        _ => Err(invalid()),
    }
}

impl RawEntry {
    fn into_record(self, entry: usize) -> Result<TelemetryRecord, TelemetryError> {
        Ok(TelemetryRecord {
            entry_id: self.entry_id,
            created_at: self.created_at,
            pulse: numeric(&self.field1, entry, "field1")?,
            oxygen: numeric(&self.field2, entry, "field2")?,
            temperature: numeric(&self.field3, entry, "field3")?,
            accel: AccelSample::new(
                numeric(&self.field4, entry, "field4")?,
                numeric(&self.field5, entry, "field5")?,
                numeric(&self.field6, entry, "field6")?,
            ),
        })
    }
}

/// A parsed ThingSpeak channel feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThingSpeakFeed {
    records: Vec<TelemetryRecord>,
}

impl ThingSpeakFeed {
    /// Parse a feed response body.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Json`] for malformed JSON and
    /// [`TelemetryError::InvalidField`] for non-numeric readings.
    pub fn parse(body: &str) -> Result<Self, TelemetryError> {
        let raw: RawFeed = serde_json::from_str(body)?;
        let records = raw
            .feeds
            .into_iter()
            .enumerate()
            .map(|(i, e)| e.into_record(i))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(entries = records.len(), "Parsed telemetry feed");
        Ok(Self { records })
    }

    /// Wrap records that were obtained elsewhere.
    #[must_use]
    pub fn from_records(records: Vec<TelemetryRecord>) -> Self {
        Self { records }
    }

    /// All records, oldest first.
    #[must_use]
    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }
}

impl TelemetrySource for ThingSpeakFeed {
    fn latest_readings(&self, n: usize) -> Result<Vec<TelemetryRecord>, TelemetryError> {
        Ok(tail(&self.records, n))
    }
}

/// A feed saved to disk as ThingSpeak JSON, re-read on every request.
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    /// Read from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path being read.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TelemetrySource for FileFeed {
    fn latest_readings(&self, n: usize) -> Result<Vec<TelemetryRecord>, TelemetryError> {
        let body = std::fs::read_to_string(&self.path).map_err(|source| TelemetryError::Io {
            path: self.path.clone(),
            source,
        })?;
        ThingSpeakFeed::parse(&body)?.latest_readings(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "channel": {"id": 2849370, "name": "gait"},
        "feeds": [
            {"created_at": "2025-02-01T10:00:00Z", "entry_id": 1,
             "field1": "72", "field2": "97", "field3": "97.5",
             "field4": "0.10", "field5": "0.05", "field6": "9.75"},
            {"created_at": "2025-02-01T10:00:15Z", "entry_id": 2,
             "field1": "130", "field2": null, "field3": "98",
             "field4": "5", "field5": "5", "field6": "5.4"}
        ]
    }"#;

    #[test]
    fn parses_fields_in_order() {
        let feed = ThingSpeakFeed::parse(BODY).unwrap();
        let records = feed.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].entry_id, Some(1));
        assert!((records[0].pulse - 72.0).abs() < f64::EPSILON);
        assert!((records[0].temperature - 97.5).abs() < f64::EPSILON);
        assert_eq!(records[0].accel, AccelSample::new(0.10, 0.05, 9.75));
        assert!(records[0].created_at.is_some());
    }

    #[test]
    fn null_and_missing_fields_read_as_zero() {
        let feed = ThingSpeakFeed::parse(BODY).unwrap();
        assert_eq!(feed.records()[1].oxygen, 0.0);

        let feed = ThingSpeakFeed::parse(r#"{"feeds": [{"field1": "60"}]}"#).unwrap();
        let r = &feed.records()[0];
        assert_eq!(r.accel, AccelSample::default());
        assert!(r.created_at.is_none());
    }

    #[test]
    fn non_numeric_field_is_an_error() {
        let err = ThingSpeakFeed::parse(r#"{"feeds": [{"field4": "fast"}]}"#).unwrap_err();
        assert!(matches!(
            err,
            TelemetryError::InvalidField { entry: 0, field: "field4", .. }
        ));
    }

    #[test]
    fn missing_feeds_key_is_empty() {
        let feed = ThingSpeakFeed::parse("{}").unwrap();
        assert!(feed.records().is_empty());
        assert!(feed.latest_readings(10).unwrap().is_empty());
    }

    #[test]
    fn latest_readings_keeps_most_recent_in_order() {
        let records = (0..5)
            .map(|i| TelemetryRecord::new(60.0 + i as f64, 97.0, 98.0, AccelSample::default()))
            .collect();
        let feed = ThingSpeakFeed::from_records(records);
        let last = feed.latest_readings(2).unwrap();
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].pulse, 63.0);
        assert_eq!(last[1].pulse, 64.0);
        assert_eq!(feed.latest_readings(50).unwrap().len(), 5);
    }

    #[test]
    fn file_feed_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.json");
        std::fs::write(&path, BODY).unwrap();
        let records = FileFeed::new(&path).latest_readings(10).unwrap();
        assert_eq!(records.len(), 2);

        let missing = FileFeed::new(dir.path().join("absent.json"));
        assert!(matches!(
            missing.latest_readings(10),
            Err(TelemetryError::Io { .. })
        ));
    }

    #[test]
    fn record_exposes_vitals() {
        let r = TelemetryRecord::new(72.0, 96.0, 98.0, AccelSample::default());
        let vitals = r.vitals();
        assert_eq!(vitals[1].channel, VitalChannel::Oxygen);
        assert_eq!(vitals[1].value, 96.0);
    }
}
