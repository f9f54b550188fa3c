//! Acceleration monitoring.
//!
//! The monitor is a gate in front of the motion sensor: while active it
//! turns every raw sample into a magnitude for the suction controller,
//! while inactive it forwards nothing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::device::MotionSensor;

use super::rules::MOTION_SAMPLE_INTERVAL;

/// One raw accelerometer reading, in g.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerationSample {
    /// X axis
    pub x: f64,
    /// Y axis
    pub y: f64,
    /// Z axis
    pub z: f64,
}

impl AccelerationSample {
    /// A device lying still: gravity on the Z axis only.
    pub const REST: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    /// Creates a sample.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the three axes.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.z.mul_add(self.z, self.x.mul_add(self.x, self.y * self.y)).sqrt()
    }
}

impl From<[f64; 3]> for AccelerationSample {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Gate between the motion sensor and the suction controller.
pub struct AccelerationMonitor {
    sensor: Arc<dyn MotionSensor>,
    active: bool,
}

impl AccelerationMonitor {
    /// Creates an inactive monitor over the given sensor.
    #[must_use]
    pub fn new(sensor: Arc<dyn MotionSensor>) -> Self {
        Self {
            sensor,
            active: false,
        }
    }

    /// Starts forwarding samples.
    ///
    /// Without sensing hardware this is a no-op and the extraction runs on
    /// its timer alone.
    pub fn activate(&mut self) {
        if self.active {
            return;
        }
        if !self.sensor.is_available() {
            warn!("motion sensor unavailable; extraction will run on its timer only");
            return;
        }
        self.sensor.start(MOTION_SAMPLE_INTERVAL);
        self.active = true;
        debug!("acceleration monitor active");
    }

    /// Stops forwarding samples and releases the sensor.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.sensor.stop();
        self.active = false;
        debug!("acceleration monitor inactive");
    }

    /// Returns whether samples are being forwarded.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Converts a sample to its magnitude if the monitor is active.
    #[must_use]
    pub fn on_sample(&self, sample: &AccelerationSample) -> Option<f64> {
        self.active.then(|| sample.magnitude())
    }
}

impl std::fmt::Debug for AccelerationMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccelerationMonitor")
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::ScriptedMotion;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn magnitude_is_euclidean_norm() {
        assert!(close(AccelerationSample::new(3.0, 4.0, 0.0).magnitude(), 5.0));
        assert!(close(AccelerationSample::REST.magnitude(), 1.0));
        assert!(close(
            AccelerationSample::new(-1.0, -2.0, 2.0).magnitude(),
            3.0
        ));
    }

    #[test]
    fn sample_from_array() {
        let s = AccelerationSample::from([0.1, 0.2, 0.3]);
        assert_eq!(s, AccelerationSample::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn inactive_monitor_forwards_nothing() {
        let monitor = AccelerationMonitor::new(Arc::new(ScriptedMotion::new(true)));
        assert!(!monitor.is_active());
        assert_eq!(monitor.on_sample(&AccelerationSample::new(2.0, 0.0, 0.0)), None);
    }

    #[test]
    fn active_monitor_forwards_every_sample() {
        let sensor = Arc::new(ScriptedMotion::new(true));
        let mut monitor = AccelerationMonitor::new(sensor.clone());
        monitor.activate();

        assert!(sensor.is_running());
        assert_eq!(sensor.interval(), Some(MOTION_SAMPLE_INTERVAL));
        // Below-threshold samples are forwarded too; the controller decides.
        let m = monitor.on_sample(&AccelerationSample::REST).unwrap();
        assert!(close(m, 1.0));

        monitor.deactivate();
        assert!(!sensor.is_running());
        assert_eq!(monitor.on_sample(&AccelerationSample::REST), None);
    }

    #[test]
    fn unavailable_sensor_degrades_silently() {
        let sensor = Arc::new(ScriptedMotion::new(false));
        let mut monitor = AccelerationMonitor::new(sensor.clone());
        monitor.activate();
        assert!(!monitor.is_active());
        assert!(!sensor.is_running());
        monitor.deactivate();
        assert!(!monitor.is_active());
    }
}
