//! Baseline envelope construction.
//!
//! Compares a live acceleration window against the `Normal` rows of the
//! reference dataset. For each axis the builder produces:
//!
//! - the live values, unchanged and in order;
//! - a nearest-normal series: for every live sample, the value on this axis of
//!   the `Normal` row closest to it in 3-D;
//! - the mean and sample standard deviation of this axis over the `Normal`
//!   rows, which renderers draw as a constant `mean ± std` band.
//!
//! The nearest-normal search is run separately for every axis. All three
//! searches use the full 3-D distance, so they currently agree, but each axis
//! owns its own match.
//!
//! When no `Normal` rows are available every nearest-normal value is the
//! resting acceleration from [`crate::defaults`], the band collapses onto it,
//! and the envelope is flagged as degraded.

use serde::Serialize;
use tracing::{debug, warn};

use crate::classifier::nearest;
use crate::defaults::resting_value;
use crate::reference::ReferenceDataset;
use crate::types::{AccelSample, Axis};

/// Welford online mean / variance accumulator.
#[derive(Debug, Clone, Default)]
struct WelfordStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl WelfordStats {
    fn update(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;
    }

    /// Sample variance (n - 1 denominator); zero below two observations.
    fn variance(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        self.m2 / (self.count - 1) as f64
    }

    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

/// Mean and sample standard deviation of `values`.
///
/// Returns `None` for an empty slice. A single value has a standard deviation
/// of zero.
#[must_use]
pub fn mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let mut stats = WelfordStats::default();
    for &v in values {
        stats.update(v);
    }
    Some((stats.mean, stats.std_dev()))
}

/// Comparison series for one axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisEnvelope {
    /// Axis this envelope describes.
    pub axis: Axis,
    /// Live values in window order.
    pub live: Vec<f64>,
    /// Nearest-normal value for each live sample.
    pub nearest_normal: Vec<f64>,
    /// Mean of the axis over the normal rows.
    pub mean: f64,
    /// Sample standard deviation of the axis over the normal rows.
    pub std_dev: f64,
}

impl AxisEnvelope {
    /// Lower edge of the normal band.
    #[must_use]
    pub fn band_lower(&self) -> f64 {
        self.mean - self.std_dev
    }

    /// Upper edge of the normal band.
    #[must_use]
    pub fn band_upper(&self) -> f64 {
        self.mean + self.std_dev
    }

    /// Number of points in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Indices of live values outside the band.
    #[must_use]
    pub fn excursions(&self) -> Vec<usize> {
        let (lo, hi) = (self.band_lower(), self.band_upper());
        self.live
            .iter()
            .enumerate()
            .filter(|(_, v)| **v < lo || **v > hi)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Envelopes for all three axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineEnvelope {
    pub x: AxisEnvelope,
    pub y: AxisEnvelope,
    pub z: AxisEnvelope,
    /// `true` when no normal rows were available and fallback values were used.
    pub degraded: bool,
}

impl BaselineEnvelope {
    /// Envelope for one axis.
    #[must_use]
    pub fn axis(&self, axis: Axis) -> &AxisEnvelope {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// The three envelopes in plotting order.
    #[must_use]
    pub fn axes(&self) -> [&AxisEnvelope; 3] {
        [&self.x, &self.y, &self.z]
    }
}

/// Builds [`BaselineEnvelope`]s from a reference dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeBuilder;

impl EnvelopeBuilder {
    /// Create a builder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Build the envelope of `live` against the normal rows of `dataset`.
    ///
    /// Never fails. A missing dataset is treated like one without normal
    /// rows.
    #[must_use]
    pub fn build(&self, dataset: Option<&ReferenceDataset>, live: &[AccelSample]) -> BaselineEnvelope {
        let normal = dataset.map(ReferenceDataset::normal_subset).unwrap_or_default();
        self.build_from_normal(&normal, live)
    }

    /// Build the envelope of `live` against an explicit normal subset.
    #[must_use]
    pub fn build_from_normal(&self, normal: &[AccelSample], live: &[AccelSample]) -> BaselineEnvelope {
        let degraded = normal.is_empty();
        if degraded {
            warn!("No normal reference samples, using resting acceleration as baseline");
        }
        debug!(normal = normal.len(), live = live.len(), "Building baseline envelope");

        BaselineEnvelope {
            x: axis_envelope(Axis::X, normal, live),
            y: axis_envelope(Axis::Y, normal, live),
            z: axis_envelope(Axis::Z, normal, live),
            degraded,
        }
    }
}

/// Value on `axis` of the normal row nearest to `live`, or the resting value
/// when there is no comparable row.
fn nearest_on_axis(axis: Axis, normal: &[AccelSample], live: &AccelSample) -> f64 {
    nearest(normal, live).map_or_else(|| resting_value(axis), |(idx, _)| normal[idx].on_axis(axis))
}

fn axis_envelope(axis: Axis, normal: &[AccelSample], live: &[AccelSample]) -> AxisEnvelope {
    let values: Vec<f64> = normal.iter().map(|s| s.on_axis(axis)).collect();
    let (mean, std_dev) = mean_std(&values).unwrap_or((resting_value(axis), 0.0));

    AxisEnvelope {
        axis,
        live: live.iter().map(|s| s.on_axis(axis)).collect(),
        nearest_normal: live.iter().map(|s| nearest_on_axis(axis, normal, s)).collect(),
        mean,
        std_dev,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GaitDisorder, ReferenceSample};
    use approx::assert_abs_diff_eq;

    #[test]
    fn mean_std_of_one_two_three() {
        let (mean, std) = mean_std(&[1.0, 2.0, 3.0]).unwrap();
        assert_abs_diff_eq!(mean, 2.0, epsilon = 1e-12);
        // Sample std: sqrt(((1-2)^2 + 0 + (3-2)^2) / 2) = 1.
        assert_abs_diff_eq!(std, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn single_value_has_zero_std() {
        let (mean, std) = mean_std(&[4.2]).unwrap();
        assert_abs_diff_eq!(mean, 4.2, epsilon = 1e-12);
        assert_eq!(std, 0.0);
    }

    #[test]
    fn two_values_use_sample_denominator() {
        let (mean, std) = mean_std(&[0.0, 2.0]).unwrap();
        assert_abs_diff_eq!(mean, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(std, 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn constant_values_give_zero_width_band() {
        let normal = vec![AccelSample::new(1.0, 1.0, 1.0); 4];
        let env = EnvelopeBuilder::new().build_from_normal(&normal, &[AccelSample::new(1.0, 1.0, 1.0)]);
        assert_abs_diff_eq!(env.x.std_dev, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(env.x.band_lower(), env.x.band_upper(), epsilon = 1e-12);
    }

    #[test]
    fn empty_normal_subset_uses_resting_values() {
        let live = vec![AccelSample::new(1.0, 2.0, 3.0), AccelSample::new(-1.0, 0.5, 8.0)];
        let env = EnvelopeBuilder::new().build_from_normal(&[], &live);
        assert!(env.degraded);
        assert_eq!(env.x.nearest_normal, vec![0.0, 0.0]);
        assert_eq!(env.y.nearest_normal, vec![0.0, 0.0]);
        assert_eq!(env.z.nearest_normal, vec![9.8, 9.8]);
        assert_eq!(env.x.live, vec![1.0, -1.0]);
        assert_eq!(env.z.mean, 9.8);
        assert_eq!(env.z.std_dev, 0.0);
    }

    #[test]
    fn missing_dataset_is_degraded() {
        let env = EnvelopeBuilder::new().build(None, &[AccelSample::default()]);
        assert!(env.degraded);
        assert_eq!(env.z.nearest_normal, vec![9.8]);
    }

    #[test]
    fn nearest_normal_alignment_follows_live_order() {
        let ds = ReferenceDataset::from_samples(vec![
            ReferenceSample::new(0.0, 0.0, 9.8, GaitDisorder::Normal),
            ReferenceSample::new(5.0, 5.0, 5.0, GaitDisorder::Ataxic),
            ReferenceSample::new(1.0, 1.0, 9.0, GaitDisorder::Normal),
        ]);
        let live = vec![
            AccelSample::new(0.9, 1.1, 9.1),
            AccelSample::new(0.1, 0.0, 9.7),
            // Closest overall to the Ataxic row, which is not a candidate.
            AccelSample::new(5.0, 5.0, 5.0),
        ];
        let env = EnvelopeBuilder::new().build(Some(&ds), &live);
        assert!(!env.degraded);
        assert_eq!(env.x.nearest_normal, vec![1.0, 0.0, 1.0]);
        assert_eq!(env.y.nearest_normal, vec![1.0, 0.0, 1.0]);
        assert_eq!(env.z.nearest_normal, vec![9.0, 9.8, 9.0]);
        assert_eq!(env.z.live, vec![9.1, 9.7, 5.0]);
        assert_abs_diff_eq!(env.x.mean, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(env.z.mean, 9.4, epsilon = 1e-12);
    }

    #[test]
    fn empty_live_series_still_has_band() {
        let normal = vec![AccelSample::new(1.0, 0.0, 9.0), AccelSample::new(3.0, 0.0, 9.0)];
        let env = EnvelopeBuilder::new().build_from_normal(&normal, &[]);
        assert!(env.x.is_empty());
        assert!(env.x.nearest_normal.is_empty());
        assert_abs_diff_eq!(env.x.mean, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(env.x.std_dev, 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn excursions_flag_values_outside_band() {
        let env = AxisEnvelope {
            axis: Axis::X,
            live: vec![0.0, 1.5, 3.5, 2.0],
            nearest_normal: vec![0.0; 4],
            mean: 2.0,
            std_dev: 1.0,
        };
        assert_eq!(env.excursions(), vec![0, 2]);
    }
}
