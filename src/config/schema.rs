//! Script schema types.
//!
//! A script describes simulated hardware and a timeline of player actions.
//! Durations are humantime strings (`"250ms"`, `"2s"`, `"1m 30s"`).

use serde::{Deserialize, Serialize};

// ============================================================================
// Top-Level Script
// ============================================================================

/// Root of a play script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Script name (required)
    pub name: String,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Simulated hardware
    #[serde(default)]
    pub devices: DeviceConfig,

    /// Player timeline
    #[serde(default)]
    pub steps: Vec<Step>,
}

// ============================================================================
// Devices
// ============================================================================

/// Simulated hardware settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    /// Camera settings
    #[serde(default)]
    pub camera: CameraConfig,

    /// Motion sensor settings
    #[serde(default)]
    pub motion: MotionConfig,
}

/// Simulated camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    /// Whether capture can start at all
    #[serde(default = "default_true")]
    pub available: bool,

    /// Stop capture while an extraction runs
    #[serde(default = "default_true")]
    pub pause_during_extraction: bool,

    /// Time between processed frames
    #[serde(default = "default_frame_interval")]
    pub frame_interval: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            available: true,
            pause_during_extraction: true,
            frame_interval: default_frame_interval(),
        }
    }
}

/// Simulated accelerometer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MotionConfig {
    /// Whether sensing hardware is present
    #[serde(default = "default_true")]
    pub available: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self { available: true }
    }
}

const fn default_true() -> bool {
    true
}

fn default_frame_interval() -> String {
    "100ms".to_owned()
}

// ============================================================================
// Steps
// ============================================================================

/// One timeline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Offset from match start
    pub at: String,

    /// What happens
    pub action: StepAction,

    /// Acceleration in g while shaking (`shake` only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accel: Option<[f64; 3]>,

    /// How long the shake lasts (`shake` only); a single sample if absent
    #[serde(default, rename = "for", skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// Timeline actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    /// Marker comes into view
    ShowMarker,
    /// Marker leaves the view
    HideMarker,
    /// Player presses the arm button
    PressArm,
    /// Device is shaken
    Shake,
}

impl StepAction {
    /// YAML spelling of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShowMarker => "show_marker",
            Self::HideMarker => "hide_marker",
            Self::PressArm => "press_arm",
            Self::Shake => "shake",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_script_uses_defaults() {
        let script: Script = serde_yaml::from_str("name: bare\n").unwrap();
        assert_eq!(script.name, "bare");
        assert!(script.steps.is_empty());
        assert!(script.devices.camera.available);
        assert!(script.devices.camera.pause_during_extraction);
        assert_eq!(script.devices.camera.frame_interval, "100ms");
        assert!(script.devices.motion.available);
    }

    #[test]
    fn steps_parse() {
        let yaml = r#"
name: s
devices:
  camera:
    pause_during_extraction: false
  motion:
    available: false
steps:
  - at: 1s
    action: show_marker
  - at: 2s
    action: shake
    accel: [0.0, 2.0, 0.0]
    for: 500ms
"#;
        let script: Script = serde_yaml::from_str(yaml).unwrap();
        assert!(!script.devices.camera.pause_during_extraction);
        assert!(!script.devices.motion.available);
        assert_eq!(script.steps.len(), 2);
        assert_eq!(script.steps[0].action, StepAction::ShowMarker);
        assert_eq!(script.steps[1].accel, Some([0.0, 2.0, 0.0]));
        assert_eq!(script.steps[1].duration.as_deref(), Some("500ms"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_yaml::from_str::<Script>("name: s\ndifficulty: hard\n").unwrap_err();
        assert!(err.to_string().contains("difficulty"));
    }

    #[test]
    fn unknown_action_is_rejected() {
        let yaml = "name: s\nsteps:\n  - at: 1s\n    action: vacuum\n";
        assert!(serde_yaml::from_str::<Script>(yaml).is_err());
    }
}
