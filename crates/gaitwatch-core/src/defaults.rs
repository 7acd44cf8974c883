//! Built-in fallback data.
//!
//! Used when the reference table cannot provide a value: the remedy table
//! when the source file is unreadable, and the resting acceleration vector
//! when no `Normal` samples are available for baseline alignment.
//!
//! Bump [`FALLBACK_TABLE_VERSION`] whenever any entry below changes.

use crate::types::{AccelSample, Axis, GaitDisorder};

/// Revision of the fallback tables in this module.
pub const FALLBACK_TABLE_VERSION: u32 = 1;

/// Resting acceleration (gravity on the z axis) used as the nearest-normal
/// value when the reference table has no `Normal` samples.
pub const RESTING_ACCELERATION: AccelSample = AccelSample::new(0.0, 0.0, 9.8);

/// Fallback nearest-normal value for one axis.
#[must_use]
pub fn resting_value(axis: Axis) -> f64 {
    RESTING_ACCELERATION.on_axis(axis)
}

/// Recovery guidance used when the reference table cannot be read.
pub const FALLBACK_REMEDIES: [(GaitDisorder, &str); 6] = [
    (
        GaitDisorder::Ataxic,
        "Heel-to-Toe Walking: Walk with one foot in front of the other, touching heel to toe. \
         Duration/Frequency: 10 minutes, 2-3 times a day. \
         Standing Balance: Stand on one leg for 30 seconds, then switch legs. \
         Duration/Frequency: 30 seconds per leg, 3 sets/day. \
         Leg Raises: While sitting, extend one leg straight and hold for a few seconds before lowering. \
         Duration/Frequency: 3 sets of 10 repetitions/leg.",
    ),
    (
        GaitDisorder::Antalgic,
        "Gentle Walking: Walk slowly and gently, focusing on smooth movements to reduce pain. \
         Duration/Frequency: 10-15 minutes, 2-3 times/day. \
         Toe Raises: Stand with feet flat on the floor and rise onto your toes to improve strength. \
         Duration/Frequency: 3 sets of 10 reps. \
         Ankle Circles: Sit and rotate your ankles in both clockwise and counterclockwise directions. \
         Duration/Frequency: 3 sets of 10 rotations/leg.",
    ),
    (
        GaitDisorder::Normal,
        "Maintain regular exercise and posture training.",
    ),
    (
        GaitDisorder::Spastic,
        "Seated Leg Stretch: Sit with one leg extended and gently lean forward to stretch the hamstrings and calves. \
         Duration/Frequency: 3 sets of 20-30 seconds each leg. \
         Standing Quadriceps Stretch: Stand and pull one leg back to stretch the front of the thigh. \
         Duration/Frequency: 3 sets of 20-30 seconds each leg. \
         Hip Flexor Stretch: Lunge forward with one leg to stretch the hip flexors and legs. \
         Duration/Frequency: 3 sets of 20-30 seconds each leg.",
    ),
    (
        GaitDisorder::Parkinsonian,
        "Marching in Place: Stand tall and march in place, lifting knees high with each step. \
         Duration/Frequency: 3 sets of 10-15 minutes/day. \
         Heel-to-Toe Walk: Walk in a straight line, placing the heel of one foot directly in front of the toes of the other foot. \
         Duration/Frequency: 10 minutes, 2-3 times per day. \
         Side Stepping: Step sideways in a slow and controlled manner. \
         Duration/Frequency: 3 sets of 10 steps/side, 3 times a day.",
    ),
    (
        GaitDisorder::Hemiplegic,
        "Walking with Assistive Devices: Walk using crutches, walkers, or canes to assist with balance and prevent falls. \
         Duration/Frequency: 15-20 minutes/day. \
         Step-ups: Step onto a low step with one leg at a time, alternating legs. \
         Duration/Frequency: 3 sets of 10 steps each leg. \
         Weight Shifting: Shift weight from one leg to the other while standing. \
         Duration/Frequency: 3 sets of 10 shifts/leg.",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_covers_every_disorder_once() {
        for d in GaitDisorder::ALL {
            let hits = FALLBACK_REMEDIES.iter().filter(|(k, _)| *k == d).count();
            assert_eq!(hits, 1, "{d} should appear exactly once");
        }
    }

    #[test]
    fn resting_vector_is_gravity_on_z() {
        assert_eq!(resting_value(Axis::X), 0.0);
        assert_eq!(resting_value(Axis::Y), 0.0);
        assert!((resting_value(Axis::Z) - 9.8).abs() < f64::EPSILON);
    }
}
