//! Labeled reference table loading.
//!
//! The reference table is a CSV file with one row per recorded sample:
//!
//! ```text
//! X_Acceleration,Y_Acceleration,Z_Acceleration,Gait_Disorder,Recovery_Suggestion
//! 0.02,-0.01,9.79,Normal,Maintain regular exercise and posture training.
//! 1.41,0.88,8.12,Ataxic Gait,Heel-to-Toe Walking: ...
//! ```
//!
//! Columns are located by header name, so their order is free and extra
//! columns are ignored. The same file feeds two structures:
//!
//! - [`ReferenceDataset`]: the labeled acceleration samples. Load failures
//!   are returned to the caller.
//! - [`RemedyTable`]: first-seen recovery guidance per label. Load failures
//!   never escape; the built-in table from [`crate::defaults`] is used.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::StringRecord;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::defaults::FALLBACK_REMEDIES;
use crate::error::StoreError;
use crate::types::{AccelSample, GaitDisorder, ReferenceSample};

/// Column holding x-axis acceleration.
pub const COL_X: &str = "X_Acceleration";
/// Column holding y-axis acceleration.
pub const COL_Y: &str = "Y_Acceleration";
/// Column holding z-axis acceleration.
pub const COL_Z: &str = "Z_Acceleration";
/// Column holding the gait label.
pub const COL_LABEL: &str = "Gait_Disorder";
/// Column holding recovery guidance.
pub const COL_REMEDY: &str = "Recovery_Suggestion";

fn column(headers: &StringRecord, name: &'static str) -> Result<usize, StoreError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or(StoreError::MissingColumn { column: name })
}

fn field<'r>(record: &'r StringRecord, idx: usize, row: usize) -> Result<&'r str, StoreError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| StoreError::invalid_row(row, format!("missing column {idx}")))
}

fn float_field(record: &StringRecord, idx: usize, row: usize) -> Result<f64, StoreError> {
    let raw = field(record, idx, row)?;
    raw.parse()
        .map_err(|e| StoreError::invalid_row(row, format!("bad float '{raw}': {e}")))
}

fn open(path: &Path) -> Result<BufReader<File>, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
}

// ---------------------------------------------------------------------------
// ReferenceDataset
// ---------------------------------------------------------------------------

/// Ordered collection of labeled acceleration samples.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReferenceDataset {
    samples: Vec<ReferenceSample>,
}

impl ReferenceDataset {
    /// Wrap an already-built sample list.
    #[must_use]
    pub fn from_samples(samples: Vec<ReferenceSample>) -> Self {
        Self { samples }
    }

    /// Parse a reference table from any reader.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on CSV syntax errors, missing acceleration or
    /// label columns, non-numeric accelerations, or unknown labels.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        let mut rdr = csv_reader(reader);
        let headers = rdr.headers()?.clone();
        let ix = column(&headers, COL_X)?;
        let iy = column(&headers, COL_Y)?;
        let iz = column(&headers, COL_Z)?;
        let il = column(&headers, COL_LABEL)?;

        let mut samples = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let row = i + 1;
            let record = result?;
            let label: GaitDisorder = field(&record, il, row)?
                .parse()
                .map_err(|e: StoreError| StoreError::invalid_row(row, e.to_string()))?;
            samples.push(ReferenceSample {
                sample: AccelSample::new(
                    float_field(&record, ix, row)?,
                    float_field(&record, iy, row)?,
                    float_field(&record, iz, row)?,
                ),
                label,
            });
        }

        debug!(rows = samples.len(), "Parsed reference table");
        Ok(Self { samples })
    }

    /// All samples in table order.
    #[must_use]
    pub fn samples(&self) -> &[ReferenceSample] {
        &self.samples
    }

    /// Samples labeled [`GaitDisorder::Normal`], in table order.
    #[must_use]
    pub fn normal_subset(&self) -> Vec<AccelSample> {
        self.samples
            .iter()
            .filter(|s| s.label.is_normal())
            .map(|s| s.sample)
            .collect()
    }

    /// Distinct labels in order of first appearance.
    #[must_use]
    pub fn labels(&self) -> Vec<GaitDisorder> {
        let mut seen = Vec::new();
        for s in &self.samples {
            if !seen.contains(&s.label) {
                seen.push(s.label);
            }
        }
        seen
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Load the labeled reference dataset from a CSV file.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be opened, or any parse
/// error from [`ReferenceDataset::from_reader`].
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_reference_dataset(path: &Path) -> Result<ReferenceDataset, StoreError> {
    let dataset = ReferenceDataset::from_reader(open(path)?)?;
    info!(samples = dataset.len(), "Loaded reference dataset");
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// RemedyTable
// ---------------------------------------------------------------------------

/// Where a [`RemedyTable`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemedySource {
    /// Parsed from the reference table.
    Table,
    /// Built-in fallback.
    Fallback,
}

/// Recovery guidance per gait label, in order of first appearance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemedyTable {
    entries: Vec<(GaitDisorder, String)>,
    source: RemedySource,
}

impl RemedyTable {
    /// The built-in table.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            entries: FALLBACK_REMEDIES
                .iter()
                .map(|(d, text)| (*d, (*text).to_string()))
                .collect(),
            source: RemedySource::Fallback,
        }
    }

    /// Parse remedies from any reader, propagating errors.
    ///
    /// For each label the first row's guidance wins.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on CSV errors, missing label or guidance
    /// columns, or unknown labels.
    pub fn try_from_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        let mut rdr = csv_reader(reader);
        let headers = rdr.headers()?.clone();
        let il = column(&headers, COL_LABEL)?;
        let ir = column(&headers, COL_REMEDY)?;

        let mut entries: Vec<(GaitDisorder, String)> = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let row = i + 1;
            let record = result?;
            let label: GaitDisorder = field(&record, il, row)?
                .parse()
                .map_err(|e: StoreError| StoreError::invalid_row(row, e.to_string()))?;
            if entries.iter().any(|(d, _)| *d == label) {
                continue;
            }
            entries.push((label, field(&record, ir, row)?.to_string()));
        }

        Ok(Self {
            entries,
            source: RemedySource::Table,
        })
    }

    /// Parse remedies from any reader, falling back to the built-in table on
    /// any failure.
    #[must_use]
    pub fn from_reader<R: Read>(reader: R) -> Self {
        match Self::try_from_reader(reader) {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "Error loading remedies, using built-in table");
                Self::fallback()
            }
        }
    }

    /// Guidance for a label.
    #[must_use]
    pub fn lookup(&self, disorder: GaitDisorder) -> Option<&str> {
        self.entries
            .iter()
            .find(|(d, _)| *d == disorder)
            .map(|(_, text)| text.as_str())
    }

    /// Guidance for a label given by name.
    #[must_use]
    pub fn lookup_name(&self, name: &str) -> Option<&str> {
        name.parse().ok().and_then(|d| self.lookup(d))
    }

    /// Labels with guidance, in table order.
    #[must_use]
    pub fn disorders(&self) -> Vec<GaitDisorder> {
        self.entries.iter().map(|(d, _)| *d).collect()
    }

    /// `(label, guidance)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (GaitDisorder, &str)> {
        self.entries.iter().map(|(d, t)| (*d, t.as_str()))
    }

    /// Whether this table came from the source file or the fallback.
    #[must_use]
    pub fn source(&self) -> RemedySource {
        self.source
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load the remedy table from a CSV file.
///
/// Never fails: an unreadable or malformed file yields
/// [`RemedyTable::fallback`].
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_remedy_table(path: &Path) -> RemedyTable {
    match open(path) {
        Ok(reader) => {
            let table = RemedyTable::from_reader(reader);
            info!(entries = table.len(), source = ?table.source(), "Loaded remedy table");
            table
        }
        Err(e) => {
            warn!(error = %e, "Error loading remedies, using built-in table");
            RemedyTable::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
X_Acceleration,Y_Acceleration,Z_Acceleration,Gait_Disorder,Recovery_Suggestion
0.0,0.0,9.8,Normal,Keep walking.
5.0,5.0,5.0,Ataxic Gait,Heel-to-toe drills.
0.1,0.2,9.7,Normal,Second normal guidance.
";

    #[test]
    fn parses_samples_in_order() {
        let ds = ReferenceDataset::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.samples()[1].label, GaitDisorder::Ataxic);
        assert_eq!(ds.samples()[1].sample, AccelSample::new(5.0, 5.0, 5.0));
        assert_eq!(ds.labels(), vec![GaitDisorder::Normal, GaitDisorder::Ataxic]);
    }

    #[test]
    fn normal_subset_filters_by_label() {
        let ds = ReferenceDataset::from_reader(TABLE.as_bytes()).unwrap();
        let normal = ds.normal_subset();
        assert_eq!(normal.len(), 2);
        assert_eq!(normal[1], AccelSample::new(0.1, 0.2, 9.7));
    }

    #[test]
    fn column_order_is_free() {
        let data = "Gait_Disorder,Z_Acceleration,extra,X_Acceleration,Y_Acceleration\n\
                    Spastic Gait,3.0,ignored,1.0,2.0\n";
        let ds = ReferenceDataset::from_reader(data.as_bytes()).unwrap();
        assert_eq!(ds.samples()[0].sample, AccelSample::new(1.0, 2.0, 3.0));
        assert_eq!(ds.samples()[0].label, GaitDisorder::Spastic);
    }

    #[test]
    fn missing_column_is_an_error() {
        let data = "X_Acceleration,Y_Acceleration,Gait_Disorder\n1,2,Normal\n";
        let err = ReferenceDataset::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::MissingColumn { column: COL_Z }));
    }

    #[test]
    fn bad_float_reports_row() {
        let data = "X_Acceleration,Y_Acceleration,Z_Acceleration,Gait_Disorder\n\
                    1,2,3,Normal\n1,oops,3,Normal\n";
        let err = ReferenceDataset::from_reader(data.as_bytes()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Row 2"), "{msg}");
        assert!(msg.contains("bad float"), "{msg}");
    }

    #[test]
    fn unknown_label_in_dataset_is_an_error() {
        let data = "X_Acceleration,Y_Acceleration,Z_Acceleration,Gait_Disorder\n1,2,3,Shuffle\n";
        let err = ReferenceDataset::from_reader(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Shuffle"));
    }

    #[test]
    fn first_seen_remedy_wins() {
        let table = RemedyTable::from_reader(TABLE.as_bytes());
        assert_eq!(table.source(), RemedySource::Table);
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(GaitDisorder::Normal), Some("Keep walking."));
        assert_eq!(table.lookup_name("Ataxic Gait"), Some("Heel-to-toe drills."));
        assert_eq!(table.lookup(GaitDisorder::Spastic), None);
        assert_eq!(
            table.disorders(),
            vec![GaitDisorder::Normal, GaitDisorder::Ataxic]
        );
    }

    #[test]
    fn remedy_table_falls_back_on_missing_column() {
        let data = "X_Acceleration,Gait_Disorder\n1.0,Normal\n";
        let table = RemedyTable::from_reader(data.as_bytes());
        assert_eq!(table.source(), RemedySource::Fallback);
        assert_eq!(table.len(), GaitDisorder::ALL.len());
        assert_eq!(
            table.lookup(GaitDisorder::Normal),
            Some("Maintain regular exercise and posture training.")
        );
    }

    #[test]
    fn remedy_table_falls_back_on_unknown_label() {
        let data = "Gait_Disorder,Recovery_Suggestion\n\
                    Normal,Keep walking.\n\
                    ataxic gait,Heel-to-toe drills.\n";
        let err = RemedyTable::try_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidRow { row: 2, .. }), "{err}");
        assert!(err.to_string().contains("ataxic gait"), "{err}");

        let table = RemedyTable::from_reader(data.as_bytes());
        assert_eq!(table, RemedyTable::fallback());
    }

    #[test]
    fn remedy_table_falls_back_on_missing_file() {
        let table = load_remedy_table(Path::new("/nonexistent/gait/table.csv"));
        assert_eq!(table.source(), RemedySource::Fallback);
        assert!(table.lookup(GaitDisorder::Hemiplegic).is_some());
    }

    #[test]
    fn unknown_name_lookup_is_none() {
        let table = RemedyTable::fallback();
        assert_eq!(table.lookup_name("Not A Gait"), None);
    }

    #[test]
    fn missing_dataset_file_is_an_error() {
        let err = load_reference_dataset(Path::new("/nonexistent/gait/table.csv")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
