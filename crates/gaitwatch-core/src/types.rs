//! Gait and vital sign domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A single tri-axial acceleration reading.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AccelSample {
    /// Acceleration along the x axis.
    pub x: f64,
    /// Acceleration along the y axis.
    pub y: f64,
    /// Acceleration along the z axis.
    pub z: f64,
}

impl AccelSample {
    /// Create a new sample.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another sample.
    #[must_use]
    pub fn distance_to(&self, other: &AccelSample) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Value of this sample on one axis.
    #[must_use]
    pub fn on_axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Copy of this sample with every axis rounded to `decimals` places.
    #[must_use]
    pub fn rounded(&self, decimals: i32) -> Self {
        let scale = 10_f64.powi(decimals);
        let round = |v: f64| (v * scale).round() / scale;
        Self::new(round(self.x), round(self.y), round(self.z))
    }
}

/// Accelerometer axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in plotting order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Axis label used on comparison plots.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Axis::X => "X Accel",
            Axis::Y => "Y Accel",
            Axis::Z => "Z Accel",
        }
    }

    /// Destination identifier handed to renderers.
    #[must_use]
    pub fn destination(&self) -> &'static str {
        match self {
            Axis::X => "x_graph",
            Axis::Y => "y_graph",
            Axis::Z => "z_graph",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Gait pattern categories present in the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GaitDisorder {
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Ataxic Gait")]
    Ataxic,
    #[serde(rename = "Antalgic Gait")]
    Antalgic,
    #[serde(rename = "Spastic Gait")]
    Spastic,
    #[serde(rename = "Parkinsonian Gait")]
    Parkinsonian,
    #[serde(rename = "Hemiplegic Gait")]
    Hemiplegic,
}

impl GaitDisorder {
    /// Every known category.
    pub const ALL: [GaitDisorder; 6] = [
        GaitDisorder::Normal,
        GaitDisorder::Ataxic,
        GaitDisorder::Antalgic,
        GaitDisorder::Spastic,
        GaitDisorder::Parkinsonian,
        GaitDisorder::Hemiplegic,
    ];

    /// Name as it appears in the `Gait_Disorder` column.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            GaitDisorder::Normal => "Normal",
            GaitDisorder::Ataxic => "Ataxic Gait",
            GaitDisorder::Antalgic => "Antalgic Gait",
            GaitDisorder::Spastic => "Spastic Gait",
            GaitDisorder::Parkinsonian => "Parkinsonian Gait",
            GaitDisorder::Hemiplegic => "Hemiplegic Gait",
        }
    }

    /// Whether this is the baseline category.
    #[must_use]
    pub fn is_normal(&self) -> bool {
        matches!(self, GaitDisorder::Normal)
    }
}

impl fmt::Display for GaitDisorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GaitDisorder {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        GaitDisorder::ALL
            .into_iter()
            .find(|d| d.name() == trimmed)
            .ok_or_else(|| StoreError::UnknownLabel {
                label: trimmed.to_string(),
            })
    }
}

/// One labeled row of the reference dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSample {
    /// Recorded acceleration.
    pub sample: AccelSample,
    /// Gait category of the recording.
    pub label: GaitDisorder,
}

impl ReferenceSample {
    /// Create a new labeled sample.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64, label: GaitDisorder) -> Self {
        Self {
            sample: AccelSample::new(x, y, z),
            label,
        }
    }
}

/// Vital sign channels reported by the wearable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VitalChannel {
    /// Pulse rate in beats per minute.
    Pulse,
    /// Blood oxygen saturation in percent.
    Oxygen,
    /// Body temperature.
    Temperature,
}

impl VitalChannel {
    /// Every channel, in display order.
    pub const ALL: [VitalChannel; 3] = [
        VitalChannel::Pulse,
        VitalChannel::Oxygen,
        VitalChannel::Temperature,
    ];

    /// Parse a channel name, accepting the feed aliases `bpm`, `o2` and
    /// `body_temp`. Returns `None` for anything else.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pulse" | "bpm" => Some(VitalChannel::Pulse),
            "oxygen" | "o2" => Some(VitalChannel::Oxygen),
            "temperature" | "body_temp" => Some(VitalChannel::Temperature),
            _ => None,
        }
    }
}

impl fmt::Display for VitalChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VitalChannel::Pulse => "pulse",
            VitalChannel::Oxygen => "oxygen",
            VitalChannel::Temperature => "temperature",
        };
        f.write_str(name)
    }
}

/// A single scalar vital sign reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveVitalReading {
    /// Channel the value was read from.
    pub channel: VitalChannel,
    /// Raw reading.
    pub value: f64,
}

/// Outcome of a threshold check on one vital sign channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VitalStatus {
    /// Reading inside the normal band.
    Normal,
    /// Reading outside the normal band.
    Abnormal,
    /// Reading below the sensor floor, or an unsupported channel.
    Unknown,
}

impl fmt::Display for VitalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VitalStatus::Normal => "Normal",
            VitalStatus::Abnormal => "Abnormal",
            VitalStatus::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Label produced by the gait classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationLabel {
    /// Nearest reference category, within the confidence threshold.
    Disorder(GaitDisorder),
    /// No reference sample close enough.
    Abnormal,
    /// Reference data unavailable.
    ClassificationError,
}

impl fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationLabel::Disorder(d) => f.write_str(d.name()),
            ClassificationLabel::Abnormal => f.write_str("Abnormal"),
            ClassificationLabel::ClassificationError => f.write_str("Classification Error"),
        }
    }
}

/// Confidence attached to a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Confident,
    Uncertain,
    Error,
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfidenceTier::Confident => "confident",
            ConfidenceTier::Uncertain => "uncertain",
            ConfidenceTier::Error => "error",
        };
        f.write_str(name)
    }
}

/// Result of classifying one live sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Reported label.
    pub label: ClassificationLabel,
    /// Confidence tier.
    pub tier: ConfidenceTier,
    /// Distance to the nearest reference sample, when one was found.
    pub distance: Option<f64>,
}

impl ClassificationResult {
    /// Nearest sample lies within the threshold.
    #[must_use]
    pub fn confident(label: GaitDisorder, distance: f64) -> Self {
        Self {
            label: ClassificationLabel::Disorder(label),
            tier: ConfidenceTier::Confident,
            distance: Some(distance),
        }
    }

    /// Nearest sample lies at or beyond the threshold.
    #[must_use]
    pub fn uncertain(distance: f64) -> Self {
        Self {
            label: ClassificationLabel::Abnormal,
            tier: ConfidenceTier::Uncertain,
            distance: Some(distance),
        }
    }

    /// No usable reference data.
    #[must_use]
    pub fn error() -> Self {
        Self {
            label: ClassificationLabel::ClassificationError,
            tier: ConfidenceTier::Error,
            distance: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = AccelSample::new(0.0, 0.0, 0.0);
        let b = AccelSample::new(3.0, 4.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < f64::EPSILON);
        assert!((b.distance_to(&a) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rounding_to_three_places() {
        let s = AccelSample::new(1.23456, -0.0004, 9.8125).rounded(3);
        assert!((s.x - 1.235).abs() < 1e-12);
        assert!((s.y - 0.0).abs() < 1e-12);
        assert!((s.z - 9.813).abs() < 1e-12);
    }

    #[test]
    fn disorder_names_round_trip_through_from_str() {
        for d in GaitDisorder::ALL {
            assert_eq!(d.name().parse::<GaitDisorder>().unwrap(), d);
        }
        assert_eq!(
            "  Ataxic Gait ".parse::<GaitDisorder>().unwrap(),
            GaitDisorder::Ataxic
        );
    }

    #[test]
    fn unknown_disorder_is_rejected() {
        let err = "Waddling Gait".parse::<GaitDisorder>().unwrap_err();
        assert!(err.to_string().contains("Waddling Gait"));
    }

    #[test]
    fn channel_aliases() {
        assert_eq!(VitalChannel::from_name("bpm"), Some(VitalChannel::Pulse));
        assert_eq!(VitalChannel::from_name("O2"), Some(VitalChannel::Oxygen));
        assert_eq!(
            VitalChannel::from_name("body_temp"),
            Some(VitalChannel::Temperature)
        );
        assert_eq!(VitalChannel::from_name("glucose"), None);
    }

    #[test]
    fn classification_labels_display() {
        assert_eq!(
            ClassificationLabel::Disorder(GaitDisorder::Spastic).to_string(),
            "Spastic Gait"
        );
        assert_eq!(ClassificationLabel::Abnormal.to_string(), "Abnormal");
        assert_eq!(
            ClassificationLabel::ClassificationError.to_string(),
            "Classification Error"
        );
        assert_eq!(ConfidenceTier::Uncertain.to_string(), "uncertain");
    }

    #[test]
    fn classification_result_serde_roundtrip() {
        let result = ClassificationResult::confident(GaitDisorder::Normal, 0.1);
        let json = serde_json::to_string(&result).unwrap();
        let parsed: ClassificationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }
}
