//! Hardware collaborator ports.
//!
//! The game core never touches a camera or an accelerometer directly. It
//! talks to these traits, and the producers on the other side push frame
//! results and acceleration samples into the engine through a
//! [`GameHandle`](crate::game::GameHandle).
//!
//! Every method must be idempotent and safe to call from any thread.

pub mod scripted;

use std::time::Duration;

use crate::error::DeviceError;

pub use scripted::{ScriptedCamera, ScriptedMotion};

/// Camera capture control.
///
/// Marker decoding happens behind this port; the engine only sees the
/// resulting presence booleans.
pub trait Camera: Send + Sync {
    /// Starts (or resumes) frame capture.
    ///
    /// # Errors
    ///
    /// Returns a [`DeviceError`] if there is no capture device or it
    /// refuses to start.
    fn start_capture(&self) -> Result<(), DeviceError>;

    /// Stops frame capture. A no-op if already stopped.
    fn stop_capture(&self);
}

/// Accelerometer control.
pub trait MotionSensor: Send + Sync {
    /// Returns whether sensing hardware is present.
    fn is_available(&self) -> bool;

    /// Starts delivering samples at roughly `interval`.
    ///
    /// A safe no-op when the hardware is unavailable.
    fn start(&self, interval: Duration);

    /// Stops delivering samples. A no-op if already stopped.
    fn stop(&self);
}

/// The set of hardware collaborators a match runs against.
#[derive(Clone)]
pub struct Devices {
    /// Camera port
    pub camera: std::sync::Arc<dyn Camera>,
    /// Motion sensor port
    pub motion: std::sync::Arc<dyn MotionSensor>,
    /// Whether capture is paused while an extraction runs
    pub pause_capture_during_extraction: bool,
}

impl std::fmt::Debug for Devices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Devices")
            .field("motion_available", &self.motion.is_available())
            .field(
                "pause_capture_during_extraction",
                &self.pause_capture_during_extraction,
            )
            .finish_non_exhaustive()
    }
}
