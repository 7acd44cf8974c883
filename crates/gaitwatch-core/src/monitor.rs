//! End-to-end assessment of a telemetry window.
//!
//! [`HealthMonitor`] ties the pieces together for one request: it takes a
//! snapshot of the reference data, checks the latest vital signs, classifies
//! the latest acceleration sample and builds the baseline envelope over the
//! whole window.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::classifier::{ClassifierConfig, GaitClassifier};
use crate::envelope::{BaselineEnvelope, EnvelopeBuilder};
use crate::error::{MonitorError, MonitorResult};
use crate::reference::RemedyTable;
use crate::render::ComparisonPlot;
use crate::snapshot::{ReferenceSnapshot, SnapshotStore};
use crate::telemetry::{TelemetryRecord, TelemetrySource};
use crate::types::{AccelSample, ClassificationLabel, ClassificationResult};
use crate::vitals::VitalsReport;

/// Decimal places used for the displayed latest sample.
const DISPLAY_DECIMALS: i32 = 3;

/// Everything the presentation layer needs for one window.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorReport {
    /// Vital sign status of the latest record.
    pub vitals: VitalsReport,
    /// Latest acceleration, rounded for display.
    pub latest_sample: AccelSample,
    /// Classification of the latest acceleration.
    pub classification: ClassificationResult,
    /// Recovery guidance for the classified disorder, when known.
    pub remedy: Option<String>,
    /// Baseline envelope over the whole window.
    pub envelope: BaselineEnvelope,
    /// Number of records in the window.
    pub window_len: usize,
}

impl MonitorReport {
    /// Renderer-ready plots for the envelope.
    #[must_use]
    pub fn plots(&self) -> Vec<ComparisonPlot> {
        ComparisonPlot::all(&self.envelope)
    }
}

/// Request-level orchestrator.
#[derive(Debug)]
pub struct HealthMonitor {
    store: Arc<SnapshotStore>,
    classifier: GaitClassifier,
    envelope: EnvelopeBuilder,
    window_size: usize,
}

impl HealthMonitor {
    /// Create a monitor over `store`.
    #[must_use]
    pub fn new(store: Arc<SnapshotStore>, classifier: ClassifierConfig, window_size: usize) -> Self {
        Self {
            store,
            classifier: GaitClassifier::new(classifier),
            envelope: EnvelopeBuilder::new(),
            window_size: window_size.max(1),
        }
    }

    /// Shared snapshot store.
    #[must_use]
    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Classifier in use.
    #[must_use]
    pub fn classifier(&self) -> &GaitClassifier {
        &self.classifier
    }

    /// Remedies of the current snapshot, or the built-in table.
    #[must_use]
    pub fn remedies(&self) -> RemedyTable {
        self.store
            .current()
            .map_or_else(RemedyTable::fallback, |s| s.remedies.clone())
    }

    /// Reload the reference tables and publish a fresh snapshot.
    ///
    /// Returns `Ok(false)` when the store has no source to reload from.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Store`] if the tables cannot be loaded; the
    /// previous snapshot stays in place.
    pub fn reload(&self) -> MonitorResult<bool> {
        Ok(self.store.reload()?)
    }

    /// Classify one sample against the current snapshot.
    #[must_use]
    pub fn classify(&self, live: AccelSample) -> ClassificationResult {
        let snapshot = self.store.current();
        self.classifier
            .classify(snapshot.as_deref().map(|s| &s.dataset), live)
    }

    /// Assess a window of records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::NoData`] for an empty window.
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn assess(&self, records: &[TelemetryRecord]) -> MonitorResult<MonitorReport> {
        let latest = records.last().ok_or(MonitorError::NoData)?;
        let snapshot = self.store.current();
        let snapshot: Option<&ReferenceSnapshot> = snapshot.as_deref();

        let series: Vec<AccelSample> = records.iter().map(|r| r.accel).collect();
        let classification = self
            .classifier
            .classify(snapshot.map(|s| &s.dataset), latest.accel);
        let envelope = self.envelope.build(snapshot.map(|s| &s.baseline), &series);

        let remedy = match (classification.label, snapshot) {
            (ClassificationLabel::Disorder(d), Some(s)) => s.remedies.lookup(d).map(str::to_string),
            _ => None,
        };

        info!(
            classification = %classification.label,
            tier = %classification.tier,
            degraded = envelope.degraded,
            "Assessed telemetry window"
        );

        Ok(MonitorReport {
            vitals: VitalsReport::evaluate(latest.pulse, latest.oxygen, latest.temperature),
            latest_sample: latest.accel.rounded(DISPLAY_DECIMALS),
            classification,
            remedy,
            envelope,
            window_len: records.len(),
        })
    }

    /// Pull the configured window from `source` and assess it.
    ///
    /// # Errors
    ///
    /// Propagates telemetry failures and returns [`MonitorError::NoData`]
    /// when the source has no records.
    pub fn assess_source(&self, source: &dyn TelemetrySource) -> MonitorResult<MonitorReport> {
        let records = source.latest_readings(self.window_size)?;
        self.assess(&records)
    }
}
