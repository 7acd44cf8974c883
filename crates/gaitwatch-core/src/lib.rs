//! Gait classification and vital sign screening for wearable telemetry.
//!
//! Compares live tri-axial acceleration against a labeled reference table
//! and screens pulse, blood oxygen and body temperature against fixed
//! clinical bands.
//!
//! # Architecture
//!
//! 1. **Reference store** ([`ReferenceDataset`], [`RemedyTable`],
//!    [`SnapshotStore`]): labeled samples and recovery guidance loaded from a
//!    CSV table, published as immutable snapshots.
//! 2. **Vital sign rules** ([`vitals::evaluate`]): per-channel floor and
//!    normal band checks.
//! 3. **Gait classification** ([`GaitClassifier`]): nearest-neighbor search
//!    with a confidence threshold.
//! 4. **Baseline envelope** ([`EnvelopeBuilder`]): per-axis mean ± standard
//!    deviation of the `Normal` rows plus a nearest-normal alignment series.
//!
//! [`HealthMonitor`] runs all of them over one telemetry window.
//!
//! # Example
//!
//! ```
//! use gaitwatch_core::{
//!     AccelSample, ClassificationLabel, ConfidenceTier, EnvelopeBuilder, GaitClassifier,
//!     GaitDisorder, ReferenceDataset, ReferenceSample, VitalChannel, VitalStatus,
//! };
//! use gaitwatch_core::vitals::evaluate;
//!
//! let dataset = ReferenceDataset::from_samples(vec![
//!     ReferenceSample::new(0.0, 0.0, 9.8, GaitDisorder::Normal),
//!     ReferenceSample::new(5.0, 5.0, 5.0, GaitDisorder::Ataxic),
//! ]);
//!
//! let classifier = GaitClassifier::default();
//! let result = classifier.classify(Some(&dataset), AccelSample::new(0.1, 0.05, 9.75));
//! assert_eq!(result.label, ClassificationLabel::Disorder(GaitDisorder::Normal));
//! assert_eq!(result.tier, ConfidenceTier::Confident);
//!
//! let live = [AccelSample::new(0.1, 0.0, 9.7), AccelSample::new(0.2, 0.1, 9.9)];
//! let envelope = EnvelopeBuilder::new().build(Some(&dataset), &live);
//! assert_eq!(envelope.z.nearest_normal, vec![9.8, 9.8]);
//!
//! assert_eq!(evaluate(VitalChannel::Oxygen, 94.0), VitalStatus::Abnormal);
//! ```

#![forbid(unsafe_code)]

pub mod classifier;
pub mod config;
pub mod defaults;
pub mod envelope;
pub mod error;
pub mod monitor;
pub mod reference;
pub mod render;
pub mod snapshot;
pub mod telemetry;
pub mod types;
pub mod vitals;

pub use classifier::{ClassifierConfig, GaitClassifier};
pub use config::MonitorConfig;
pub use envelope::{AxisEnvelope, BaselineEnvelope, EnvelopeBuilder};
pub use error::{ConfigError, MonitorError, RenderError, StoreError, TelemetryError};
pub use monitor::{HealthMonitor, MonitorReport};
pub use reference::{
    load_reference_dataset, load_remedy_table, ReferenceDataset, RemedySource, RemedyTable,
};
pub use render::{ComparisonPlot, CsvSeriesRenderer, EnvelopeRenderer};
pub use snapshot::{ReferenceSnapshot, SnapshotSource, SnapshotStore};
pub use telemetry::{FileFeed, TelemetryRecord, TelemetrySource, ThingSpeakFeed};
pub use types::{
    AccelSample, Axis, ClassificationLabel, ClassificationResult, ConfidenceTier, GaitDisorder,
    LiveVitalReading, ReferenceSample, VitalChannel, VitalStatus,
};
pub use vitals::VitalsReport;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
