//! Hand-off of envelope series to renderers.
//!
//! [`ComparisonPlot`] is the flattened, renderer-ready form of an
//! [`AxisEnvelope`]: every curve already has one value per time step.
//! [`CsvSeriesRenderer`] writes each plot as a CSV file that plotting tools
//! can pick up; image drawing is left to external tools.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::envelope::{AxisEnvelope, BaselineEnvelope};
use crate::error::RenderError;

/// One axis' comparison curves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPlot {
    /// Axis label, e.g. `"X Accel"`.
    pub label: String,
    /// Destination identifier, e.g. `"x_graph"`.
    pub destination: String,
    /// Live curve.
    pub live: Vec<f64>,
    /// Nearest-normal curve.
    pub normal: Vec<f64>,
    /// Lower band edge per step.
    pub band_lower: Vec<f64>,
    /// Upper band edge per step.
    pub band_upper: Vec<f64>,
}

impl ComparisonPlot {
    /// Flatten an axis envelope.
    #[must_use]
    pub fn from_envelope(envelope: &AxisEnvelope) -> Self {
        let n = envelope.len();
        Self {
            label: envelope.axis.label().to_string(),
            destination: envelope.axis.destination().to_string(),
            live: envelope.live.clone(),
            normal: envelope.nearest_normal.clone(),
            band_lower: vec![envelope.band_lower(); n],
            band_upper: vec![envelope.band_upper(); n],
        }
    }

    /// Check that every curve has one value per live point.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::LengthMismatch`] naming the first curve whose
    /// length differs from `live`.
    pub fn check_lengths(&self) -> Result<(), RenderError> {
        let live = self.live.len();
        [
            ("normal", self.normal.len()),
            ("band_lower", self.band_lower.len()),
            ("band_upper", self.band_upper.len()),
        ]
        .into_iter()
        .find(|(_, len)| *len != live)
        .map_or(Ok(()), |(series, len)| {
            Err(RenderError::LengthMismatch {
                destination: self.destination.clone(),
                live,
                series,
                len,
            })
        })
    }

    /// Plots for all three axes in X, Y, Z order.
    #[must_use]
    pub fn all(envelope: &BaselineEnvelope) -> Vec<Self> {
        envelope.axes().into_iter().map(Self::from_envelope).collect()
    }
}

/// Consumer of comparison plots.
pub trait EnvelopeRenderer {
    /// Render one plot to its destination.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if output cannot be produced.
    fn render(&self, plot: &ComparisonPlot) -> Result<(), RenderError>;

    /// Render every plot, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Propagates the first [`RenderError`].
    fn render_all(&self, plots: &[ComparisonPlot]) -> Result<(), RenderError> {
        plots.iter().try_for_each(|p| self.render(p))
    }
}

#[derive(Serialize)]
struct SeriesRow {
    step: usize,
    live: f64,
    normal: f64,
    band_lower: f64,
    band_upper: f64,
}

/// Writes `<destination>.csv` into an output directory.
#[derive(Debug, Clone)]
pub struct CsvSeriesRenderer {
    dir: PathBuf,
}

impl CsvSeriesRenderer {
    /// Write into `dir`, created on first use.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path a plot is written to.
    #[must_use]
    pub fn path_for(&self, plot: &ComparisonPlot) -> PathBuf {
        self.dir.join(format!("{}.csv", plot.destination))
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl EnvelopeRenderer for CsvSeriesRenderer {
    fn render(&self, plot: &ComparisonPlot) -> Result<(), RenderError> {
        let io_err = |source| RenderError::Io {
            destination: plot.destination.clone(),
            source,
        };
        plot.check_lengths()?;
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let path = self.path_for(plot);

        let mut wtr = csv::Writer::from_path(&path)?;
        let steps = plot
            .live
            .iter()
            .zip(&plot.normal)
            .zip(plot.band_lower.iter().zip(&plot.band_upper));
        for (step, ((&live, &normal), (&band_lower, &band_upper))) in steps.enumerate() {
            wtr.serialize(SeriesRow {
                step,
                live,
                normal,
                band_lower,
                band_upper,
            })?;
        }
        wtr.flush().map_err(io_err)?;

        debug!(path = %path.display(), points = plot.live.len(), "Wrote comparison series");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EnvelopeBuilder;
    use crate::types::AccelSample;

    fn envelope() -> BaselineEnvelope {
        let normal = vec![AccelSample::new(0.0, 0.0, 9.6), AccelSample::new(0.0, 0.0, 10.0)];
        let live = vec![AccelSample::new(0.1, 0.0, 9.7), AccelSample::new(0.2, 0.1, 9.9)];
        EnvelopeBuilder::new().build_from_normal(&normal, &live)
    }

    #[test]
    fn plots_follow_axis_order_and_length() {
        let plots = ComparisonPlot::all(&envelope());
        let labels: Vec<_> = plots.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["X Accel", "Y Accel", "Z Accel"]);
        assert_eq!(plots[2].destination, "z_graph");
        for p in &plots {
            assert_eq!(p.band_lower.len(), p.live.len());
            assert_eq!(p.band_upper.len(), p.live.len());
            assert_eq!(p.normal.len(), p.live.len());
        }
        assert!(plots[2].band_lower[0] < plots[2].band_upper[0]);
    }

    #[test]
    fn mismatched_curves_are_rejected_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = CsvSeriesRenderer::new(dir.path());
        let mut plot = ComparisonPlot::all(&envelope()).remove(0);
        plot.normal.pop();

        let err = renderer.render(&plot).unwrap_err();
        assert!(
            matches!(err, RenderError::LengthMismatch { series: "normal", live: 2, len: 1, .. }),
            "{err}"
        );
        assert!(!renderer.path_for(&plot).exists());
    }

    #[test]
    fn csv_renderer_writes_one_file_per_axis() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = CsvSeriesRenderer::new(dir.path().join("static"));
        let plots = ComparisonPlot::all(&envelope());
        renderer.render_all(&plots).unwrap();

        for p in &plots {
            let body = std::fs::read_to_string(renderer.path_for(p)).unwrap();
            let mut lines = body.lines();
            assert_eq!(lines.next(), Some("step,live,normal,band_lower,band_upper"));
            assert_eq!(lines.count(), 2);
        }
    }
}
