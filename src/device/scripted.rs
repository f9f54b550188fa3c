//! In-process simulated hardware.
//!
//! Used by the script runner and tests. The devices only hold switches; the
//! runner asks them whether they are live before producing a frame or a
//! sample.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::DeviceError;

use super::{Camera, MotionSensor};

/// Simulated camera.
#[derive(Debug)]
pub struct ScriptedCamera {
    available: bool,
    capturing: AtomicBool,
    starts: AtomicU32,
}

impl ScriptedCamera {
    /// Creates a camera. An unavailable camera fails `start_capture`.
    #[must_use]
    pub const fn new(available: bool) -> Self {
        Self {
            available,
            capturing: AtomicBool::new(false),
            starts: AtomicU32::new(0),
        }
    }

    /// Returns whether frames are currently being captured.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    /// Returns how many times capture went from stopped to running.
    #[must_use]
    pub fn start_count(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }
}

impl Camera for ScriptedCamera {
    fn start_capture(&self) -> Result<(), DeviceError> {
        if !self.available {
            return Err(DeviceError::CameraUnavailable(
                "scripted camera disabled".to_string(),
            ));
        }
        if !self.capturing.swap(true, Ordering::SeqCst) {
            self.starts.fetch_add(1, Ordering::SeqCst);
            debug!("camera capture started");
        }
        Ok(())
    }

    fn stop_capture(&self) {
        if self.capturing.swap(false, Ordering::SeqCst) {
            debug!("camera capture stopped");
        }
    }
}

/// Simulated accelerometer.
#[derive(Debug)]
pub struct ScriptedMotion {
    available: bool,
    running: AtomicBool,
    interval: Mutex<Option<Duration>>,
}

impl ScriptedMotion {
    /// Creates a motion sensor. An unavailable sensor ignores `start`.
    #[must_use]
    pub const fn new(available: bool) -> Self {
        Self {
            available,
            running: AtomicBool::new(false),
            interval: Mutex::new(None),
        }
    }

    /// Returns whether samples are currently being delivered.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns the interval requested by the last `start`.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        self.interval.lock().map_or(None, |guard| *guard)
    }
}

impl MotionSensor for ScriptedMotion {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&self, interval: Duration) {
        if !self.available {
            warn!("motion start requested but no sensor is present");
            return;
        }
        if let Ok(mut guard) = self.interval.lock() {
            *guard = Some(interval);
        }
        if !self.running.swap(true, Ordering::SeqCst) {
            debug!(interval_ms = interval.as_millis(), "motion updates started");
        }
    }

    fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            debug!("motion updates stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_start_is_idempotent() {
        let camera = ScriptedCamera::new(true);
        camera.start_capture().unwrap();
        camera.start_capture().unwrap();
        assert!(camera.is_capturing());
        assert_eq!(camera.start_count(), 1);

        camera.stop_capture();
        camera.stop_capture();
        assert!(!camera.is_capturing());

        camera.start_capture().unwrap();
        assert_eq!(camera.start_count(), 2);
    }

    #[test]
    fn unavailable_camera_errors() {
        let camera = ScriptedCamera::new(false);
        let err = camera.start_capture().unwrap_err();
        assert!(matches!(err, DeviceError::CameraUnavailable(_)));
        assert!(!camera.is_capturing());
    }

    #[test]
    fn motion_records_interval() {
        let motion = ScriptedMotion::new(true);
        assert_eq!(motion.interval(), None);
        motion.start(Duration::from_millis(100));
        assert!(motion.is_running());
        assert_eq!(motion.interval(), Some(Duration::from_millis(100)));
        motion.stop();
        assert!(!motion.is_running());
    }

    #[test]
    fn unavailable_motion_start_is_noop() {
        let motion = ScriptedMotion::new(false);
        motion.start(Duration::from_millis(100));
        assert!(!motion.is_running());
        assert!(!motion.is_available());
    }
}
