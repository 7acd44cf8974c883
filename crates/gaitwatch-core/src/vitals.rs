//! Vital sign threshold rules.
//!
//! Each channel has a sensor floor below which the reading is treated as
//! "no contact" and reported as [`VitalStatus::Unknown`], and a normal band:
//!
//! | channel     | floor | normal band    |
//! |-------------|-------|----------------|
//! | pulse       | 50    | 50 ..= 120 BPM |
//! | oxygen      | 80    | >= 95 %        |
//! | temperature | 80    | 90 ..= 99      |
//!
//! Temperature uses the magnitudes the wearable reports (Fahrenheit-like);
//! no unit conversion is applied.

use serde::Serialize;

use crate::types::{LiveVitalReading, VitalChannel, VitalStatus};

const PULSE_FLOOR: f64 = 50.0;
const PULSE_MAX: f64 = 120.0;
const OXYGEN_FLOOR: f64 = 80.0;
const OXYGEN_MIN_NORMAL: f64 = 95.0;
const TEMPERATURE_FLOOR: f64 = 80.0;
const TEMPERATURE_MIN_NORMAL: f64 = 90.0;
const TEMPERATURE_MAX_NORMAL: f64 = 99.0;

fn banded(value: f64, floor: f64, normal: impl Fn(f64) -> bool) -> VitalStatus {
    if value.is_nan() || value < floor {
        return VitalStatus::Unknown;
    }
    if normal(value) {
        VitalStatus::Normal
    } else {
        VitalStatus::Abnormal
    }
}

/// Classify one reading on one channel.
#[must_use]
pub fn evaluate(channel: VitalChannel, value: f64) -> VitalStatus {
    match channel {
        VitalChannel::Pulse => banded(value, PULSE_FLOOR, |v| (PULSE_FLOOR..=PULSE_MAX).contains(&v)),
        VitalChannel::Oxygen => banded(value, OXYGEN_FLOOR, |v| v >= OXYGEN_MIN_NORMAL),
        VitalChannel::Temperature => banded(value, TEMPERATURE_FLOOR, |v| {
            (TEMPERATURE_MIN_NORMAL..=TEMPERATURE_MAX_NORMAL).contains(&v)
        }),
    }
}

/// Classify a reading on a channel given by name.
///
/// Unrecognised channel names yield [`VitalStatus::Unknown`].
#[must_use]
pub fn evaluate_named(channel: &str, value: f64) -> VitalStatus {
    VitalChannel::from_name(channel).map_or(VitalStatus::Unknown, |c| evaluate(c, value))
}

/// Classify a [`LiveVitalReading`].
#[must_use]
pub fn evaluate_reading(reading: &LiveVitalReading) -> VitalStatus {
    evaluate(reading.channel, reading.value)
}

/// Status of every channel for one telemetry record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VitalsReport {
    pub pulse: ChannelStatus,
    pub oxygen: ChannelStatus,
    pub temperature: ChannelStatus,
}

/// Raw value and status of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelStatus {
    pub value: f64,
    pub status: VitalStatus,
}

impl VitalsReport {
    /// Evaluate all three channels.
    #[must_use]
    pub fn evaluate(pulse: f64, oxygen: f64, temperature: f64) -> Self {
        let status = |channel, value| ChannelStatus {
            value,
            status: evaluate(channel, value),
        };
        Self {
            pulse: status(VitalChannel::Pulse, pulse),
            oxygen: status(VitalChannel::Oxygen, oxygen),
            temperature: status(VitalChannel::Temperature, temperature),
        }
    }

    /// `(channel, value, status)` rows in display order.
    #[must_use]
    pub fn rows(&self) -> [(VitalChannel, ChannelStatus); 3] {
        [
            (VitalChannel::Pulse, self.pulse),
            (VitalChannel::Oxygen, self.oxygen),
            (VitalChannel::Temperature, self.temperature),
        ]
    }

    /// Whether any channel is abnormal.
    #[must_use]
    pub fn any_abnormal(&self) -> bool {
        self.rows()
            .iter()
            .any(|(_, c)| c.status == VitalStatus::Abnormal)
    }
}
