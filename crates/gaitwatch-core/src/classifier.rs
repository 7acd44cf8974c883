//! Nearest-neighbor gait classification.
//!
//! A live sample is compared against every row of the reference dataset by
//! Euclidean distance. The nearest row's label is reported when it lies
//! strictly within the confidence threshold; otherwise the pattern is
//! reported as `Abnormal` with an `uncertain` tier.
//!
//! The scan is linear in the number of reference rows. The threshold is a
//! single scalar applied to the raw 3-D distance, so axes with larger
//! variance dominate the decision.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::reference::ReferenceDataset;
use crate::types::{AccelSample, ClassificationResult};

/// Default distance below which a match is considered confident.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Configuration for [`GaitClassifier`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Matches strictly closer than this distance are confident.
    pub confidence_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

/// Index and distance of the nearest candidate to `live`.
///
/// Ties resolve to the earliest candidate. Candidates at a NaN distance are
/// skipped. Returns `None` when no candidate has a comparable distance.
pub(crate) fn nearest<'a, I>(candidates: I, live: &AccelSample) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a AccelSample>,
{
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.into_iter().enumerate() {
        let d = candidate.distance_to(live);
        if d.is_nan() {
            continue;
        }
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((idx, d)),
        }
    }
    best
}

/// Stateless nearest-neighbor classifier.
#[derive(Debug, Clone, Default)]
pub struct GaitClassifier {
    config: ClassifierConfig,
}

impl GaitClassifier {
    /// Create a classifier with the given configuration.
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Create a classifier with a custom threshold.
    #[must_use]
    pub fn with_threshold(confidence_threshold: f64) -> Self {
        Self::new(ClassifierConfig {
            confidence_threshold,
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one live sample.
    ///
    /// Never fails: a missing or empty dataset, or a non-finite nearest
    /// distance, yields [`ClassificationResult::error`].
    #[must_use]
    pub fn classify(
        &self,
        dataset: Option<&ReferenceDataset>,
        live: AccelSample,
    ) -> ClassificationResult {
        let Some(dataset) = dataset.filter(|d| !d.is_empty()) else {
            warn!("Classification requested without reference data");
            return ClassificationResult::error();
        };

        let rows = dataset.samples();
        let Some((idx, distance)) = nearest(rows.iter().map(|r| &r.sample), &live) else {
            warn!(?live, "No comparable reference sample");
            return ClassificationResult::error();
        };
        if !distance.is_finite() {
            warn!(?live, distance, "Nearest reference sample is at a non-finite distance");
            return ClassificationResult::error();
        }

        let matched = rows[idx].label;
        debug!(
            nearest = %matched,
            distance,
            threshold = self.config.confidence_threshold,
            "Nearest reference sample"
        );

        if distance < self.config.confidence_threshold {
            ClassificationResult::confident(matched, distance)
        } else {
            ClassificationResult::uncertain(distance)
        }
    }

    /// Classify the most recent sample of a window.
    #[must_use]
    pub fn classify_latest(
        &self,
        dataset: Option<&ReferenceDataset>,
        series: &[AccelSample],
    ) -> ClassificationResult {
        match series.last() {
            Some(latest) => self.classify(dataset, *latest),
            None => ClassificationResult::error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassificationLabel, ConfidenceTier, GaitDisorder, ReferenceSample};

    fn dataset() -> ReferenceDataset {
        ReferenceDataset::from_samples(vec![
            ReferenceSample::new(0.0, 0.0, 9.8, GaitDisorder::Normal),
            ReferenceSample::new(5.0, 5.0, 5.0, GaitDisorder::Ataxic),
        ])
    }

    #[test]
    fn exact_match_is_confident() {
        let ds = dataset();
        let c = GaitClassifier::default();
        for row in ds.samples() {
            let r = c.classify(Some(&ds), row.sample);
            assert_eq!(r.label, ClassificationLabel::Disorder(row.label));
            assert_eq!(r.tier, ConfidenceTier::Confident);
            assert_eq!(r.distance, Some(0.0));
        }
    }

    #[test]
    fn far_sample_is_abnormal_uncertain() {
        let ds = dataset();
        let r = GaitClassifier::default().classify(Some(&ds), AccelSample::new(2.0, 2.0, 2.0));
        assert_eq!(r.label, ClassificationLabel::Abnormal);
        assert_eq!(r.tier, ConfidenceTier::Uncertain);
        assert!(r.distance.unwrap() >= 0.5);
    }

    #[test]
    fn threshold_is_strict() {
        let ds = dataset();
        let live = AccelSample::new(5.0, 5.0, 5.5);
        let r = GaitClassifier::default().classify(Some(&ds), live);
        assert_eq!(r.tier, ConfidenceTier::Uncertain);

        let r = GaitClassifier::with_threshold(0.51).classify(Some(&ds), live);
        assert_eq!(r.label, ClassificationLabel::Disorder(GaitDisorder::Ataxic));
    }

    #[test]
    fn ties_resolve_to_first_row() {
        let ds = ReferenceDataset::from_samples(vec![
            ReferenceSample::new(1.0, 0.0, 0.0, GaitDisorder::Spastic),
            ReferenceSample::new(-1.0, 0.0, 0.0, GaitDisorder::Antalgic),
        ]);
        let r = GaitClassifier::with_threshold(2.0).classify(Some(&ds), AccelSample::default());
        assert_eq!(r.label, ClassificationLabel::Disorder(GaitDisorder::Spastic));
    }

    #[test]
    fn missing_or_empty_dataset_is_classification_error() {
        let c = GaitClassifier::default();
        let live = AccelSample::new(0.0, 0.0, 9.8);
        assert_eq!(c.classify(None, live), ClassificationResult::error());
        let empty = ReferenceDataset::default();
        assert_eq!(c.classify(Some(&empty), live), ClassificationResult::error());
    }

    #[test]
    fn nan_live_sample_is_classification_error() {
        let ds = dataset();
        let r = GaitClassifier::default().classify(Some(&ds), AccelSample::new(f64::NAN, 0.0, 0.0));
        assert_eq!(r.tier, ConfidenceTier::Error);
    }

    #[test]
    fn non_finite_distance_is_classification_error() {
        let ds = dataset();
        let c = GaitClassifier::default();
        for live in [
            AccelSample::new(f64::INFINITY, 0.0, 9.8),
            AccelSample::new(1e200, 0.0, 0.0),
        ] {
            assert_eq!(c.classify(Some(&ds), live), ClassificationResult::error(), "{live:?}");
        }
    }

    #[test]
    fn latest_of_empty_window_is_error() {
        let ds = dataset();
        let r = GaitClassifier::default().classify_latest(Some(&ds), &[]);
        assert_eq!(r, ClassificationResult::error());
    }

    #[test]
    fn latest_uses_last_sample() {
        let ds = dataset();
        let window = [AccelSample::new(0.0, 0.0, 9.8), AccelSample::new(5.0, 5.0, 5.0)];
        let r = GaitClassifier::default().classify_latest(Some(&ds), &window);
        assert_eq!(r.label, ClassificationLabel::Disorder(GaitDisorder::Ataxic));
    }
}
