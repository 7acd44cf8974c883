//! Monitor configuration.
//!
//! [`MonitorConfig`] collects the file locations, feed coordinates and
//! classification settings used by the CLI. It is serializable via
//! [`serde`] so it can be stored to / restored from JSON files; fields missing
//! from a file take their defaults.
//!
//! # Example
//!
//! ```rust
//! use gaitwatch_core::config::MonitorConfig;
//!
//! let cfg = MonitorConfig::default();
//! cfg.validate().expect("default config is valid");
//!
//! assert_eq!(cfg.window_size, 10);
//! assert_eq!(cfg.confidence_threshold, 0.5);
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classifier::{ClassifierConfig, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::error::ConfigError;
use crate::snapshot::SnapshotSource;

/// Complete configuration for a monitoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    // -----------------------------------------------------------------------
    // Reference data
    // -----------------------------------------------------------------------
    /// Labeled reference table used for classification and remedies.
    /// Default: **`Gait_disorder.csv`**.
    pub reference_path: PathBuf,

    /// Table whose `Normal` rows feed the baseline envelope. Defaults to
    /// `reference_path` when unset.
    pub baseline_path: Option<PathBuf>,

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------
    /// Number of most recent feed entries per assessment. Default: **10**.
    pub window_size: usize,

    /// Distance below which a nearest match is confident. Default: **0.5**.
    pub confidence_threshold: f64,

    // -----------------------------------------------------------------------
    // Telemetry feed
    // -----------------------------------------------------------------------
    /// ThingSpeak channel id. Default: **`2849370`**.
    pub channel_id: String,

    /// ThingSpeak read API key, if the channel is private.
    pub api_key: Option<String>,

    /// Base URL of the ThingSpeak API.
    pub feed_base_url: String,

    /// HTTP timeout for feed requests, in seconds. Default: **10**.
    pub request_timeout_secs: u64,

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------
    /// Directory receiving comparison series. Default: **`static`**.
    pub output_dir: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            reference_path: PathBuf::from("Gait_disorder.csv"),
            baseline_path: None,
            window_size: 10,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            channel_id: "2849370".to_string(),
            api_key: None,
            feed_base_url: "https://api.thingspeak.com".to_string(),
            request_timeout_secs: 10,
            output_dir: PathBuf::from("static"),
        }
    }
}

impl MonitorConfig {
    /// Load a [`MonitorConfig`] from a JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileRead`] if the file cannot be opened and
    /// [`ConfigError::InvalidValue`] if the JSON is malformed or a value is
    /// out of range.
    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: MonitorConfig = serde_json::from_str(&contents)
            .map_err(|e| ConfigError::invalid_value("(file)", e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize this configuration to pretty-printed JSON and write it to
    /// `path`, creating parent directories if necessary.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileRead`] if the directory cannot be created or
    /// the file cannot be written.
    pub fn to_json(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::FileRead {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::invalid_value("(serialization)", e.to_string()))?;
        std::fs::write(path, json).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Validate all fields and return an error describing the first problem
    /// found.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when `window_size` is zero, the
    /// threshold is not a finite positive number, or the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::invalid_value("window_size", "must be at least 1"));
        }
        if !self.confidence_threshold.is_finite() || self.confidence_threshold <= 0.0 {
            return Err(ConfigError::invalid_value(
                "confidence_threshold",
                format!("must be finite and > 0, got {}", self.confidence_threshold),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "request_timeout_secs",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Classifier settings.
    #[must_use]
    pub fn classifier(&self) -> ClassifierConfig {
        ClassifierConfig {
            confidence_threshold: self.confidence_threshold,
        }
    }

    /// Where reference snapshots are loaded from.
    #[must_use]
    pub fn snapshot_source(&self) -> SnapshotSource {
        SnapshotSource {
            reference_path: self.reference_path.clone(),
            baseline_path: self.baseline_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_is_valid() {
        MonitorConfig::default()
            .validate()
            .expect("default config should be valid");
    }

    #[test]
    fn json_round_trip() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.json");

        let mut original = MonitorConfig::default();
        original.baseline_path = Some(PathBuf::from("normal_data3.csv"));
        original.to_json(&path).expect("serialization should succeed");

        let loaded = MonitorConfig::from_json(&path).expect("deserialization should succeed");
        assert_eq!(loaded, original);
    }

    #[test]
    fn partial_file_takes_defaults() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.json");
        std::fs::write(&path, r#"{"window_size": 20}"#).unwrap();

        let cfg = MonitorConfig::from_json(&path).unwrap();
        assert_eq!(cfg.window_size, 20);
        assert_eq!(cfg.reference_path, PathBuf::from("Gait_disorder.csv"));
    }

    #[test]
    fn zero_window_is_invalid() {
        let cfg = MonitorConfig {
            window_size: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn non_positive_threshold_is_invalid() {
        let mut cfg = MonitorConfig::default();
        cfg.confidence_threshold = 0.0;
        assert!(cfg.validate().is_err());
        cfg.confidence_threshold = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_file_is_file_read_error() {
        let err = MonitorConfig::from_json(Path::new("/nonexistent/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn classifier_settings_follow_threshold() {
        let cfg = MonitorConfig {
            confidence_threshold: 0.8,
            ..Default::default()
        };
        assert_eq!(cfg.classifier().confidence_threshold, 0.8);
    }
}
