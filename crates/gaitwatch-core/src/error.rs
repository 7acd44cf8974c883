//! Error types for the gaitwatch engine.
//!
//! The classification and envelope paths never return errors: they report
//! typed sentinel results instead. The types here cover the edges of the
//! system where failures are real and belong to the caller.
//!
//! ## Hierarchy
//!
//! ```text
//! MonitorError (orchestration)
//! ├── StoreError      (reference table loading)
//! └── TelemetryError  (feed retrieval / parsing)
//! ConfigError         (config validation / file loading)
//! RenderError         (comparison series output)
//! ```

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Errors raised while loading the labeled reference table.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The reference file could not be opened or read.
    #[error("Failed to read reference table {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The CSV layer rejected the input.
    #[error("Malformed reference table: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header.
    #[error("Reference table is missing column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: &'static str,
    },

    /// A `Gait_Disorder` cell holds a label outside the known set.
    #[error("Unknown gait label '{label}'")]
    UnknownLabel {
        /// The offending label.
        label: String,
    },

    /// A row failed to parse.
    #[error("Row {row}: {message}")]
    InvalidRow {
        /// 1-based data row number.
        row: usize,
        /// Description of the problem.
        message: String,
    },
}

impl StoreError {
    /// Creates an invalid row error.
    #[must_use]
    pub fn invalid_row(row: usize, message: impl Into<String>) -> Self {
        Self::InvalidRow {
            row,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors produced when loading or validating a [`crate::config::MonitorConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file could not be read or written.
    #[error("Cannot access config file {path:?}: {source}")]
    FileRead {
        /// Path that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A field holds a value outside its valid range, or the file is malformed.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Field name.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

impl ConfigError {
    /// Construct an [`ConfigError::InvalidValue`].
    #[must_use]
    pub fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TelemetryError
// ---------------------------------------------------------------------------

/// Errors raised by telemetry sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TelemetryError {
    /// The feed could not be reached.
    #[error("Telemetry request failed: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The feed body is not valid JSON of the expected shape.
    #[error("Malformed telemetry feed: {0}")]
    Json(#[from] serde_json::Error),

    /// A feed field holds a non-numeric value.
    #[error("Entry {entry}: field '{field}' is not a number: '{value}'")]
    InvalidField {
        /// Index of the entry within the feed.
        entry: usize,
        /// Feed field name (`field1` ... `field6`).
        field: &'static str,
        /// Raw value.
        value: String,
    },

    /// A saved feed file could not be read.
    #[error("Failed to read feed file {path}: {source}")]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl TelemetryError {
    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// RenderError
// ---------------------------------------------------------------------------

/// Errors raised by comparison plot renderers.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Output could not be written.
    #[error("Failed to write {destination}: {source}")]
    Io {
        /// Destination identifier.
        destination: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Series encoding failed.
    #[error("Failed to encode series: {0}")]
    Encode(#[from] csv::Error),

    /// A plot's curves do not share one length.
    #[error("Plot {destination} has {live} live points but a {series} series of {len}")]
    LengthMismatch {
        /// Destination identifier.
        destination: String,
        /// Length of the live curve.
        live: usize,
        /// Name of the mismatched series.
        series: &'static str,
        /// Length of the mismatched series.
        len: usize,
    },
}

// ---------------------------------------------------------------------------
// MonitorError
// ---------------------------------------------------------------------------

/// Errors surfaced by [`crate::monitor::HealthMonitor`].
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The telemetry window held no records.
    #[error("No data available.")]
    NoData,

    /// Telemetry retrieval failed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// Reference data could not be (re)loaded.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenient `Result` alias for orchestration-level functions.
pub type MonitorResult<T> = Result<T, MonitorError>;
