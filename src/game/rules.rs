//! Fixed game constants.
//!
//! Difficulty is not configurable; every component reads its limits from here.

use std::time::Duration;

/// Length of a match in whole seconds.
pub const MATCH_SECONDS: u32 = 180;

/// Exterminations needed to win.
pub const MAX_EXTERMINATIONS: u32 = 5;

/// Duration of a freshly armed extraction, in seconds.
pub const EXTRACTION_SECONDS: f64 = 10.0;

/// Shortest an extraction can be shaken down to, in seconds.
pub const EXTRACTION_FLOOR_SECONDS: f64 = 1.0;

/// Acceleration magnitude (in g) a sample must exceed to count as a shake.
pub const SHAKE_THRESHOLD: f64 = 1.1;

/// Seconds removed from the extraction per shake.
pub const SHAKE_STEP_SECONDS: f64 = 0.5;

/// Cadence the motion sensor is asked to sample at.
pub const MOTION_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Match clock resolution.
pub const MATCH_TICK: Duration = Duration::from_secs(1);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_is_reachable_by_whole_steps() {
        let steps = (EXTRACTION_SECONDS - EXTRACTION_FLOOR_SECONDS) / SHAKE_STEP_SECONDS;
        assert!((steps - 18.0).abs() < f64::EPSILON);
    }

    #[test]
    fn resting_gravity_is_not_a_shake() {
        assert!(1.0 < SHAKE_THRESHOLD);
    }
}
