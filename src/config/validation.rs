//! Script validation.
//!
//! Runs on the deserialized [`Script`] and collects every issue rather than
//! stopping at the first one.

use std::time::Duration;

use crate::config::loader::ScriptLimits;
use crate::config::schema::{Script, Step, StepAction};
use crate::error::{Severity, ValidationIssue};
use crate::game::rules::MATCH_SECONDS;

// ============================================================================
// Public API
// ============================================================================

/// Result of script validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Issues that prevent the script from being used.
    pub errors: Vec<ValidationIssue>,

    /// Informational issues.
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Script validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a script and returns every issue found.
    pub fn validate(&mut self, script: &Script, limits: &ScriptLimits) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_metadata(script);
        self.validate_devices(script);
        self.validate_steps(&script.steps);
        self.validate_limits(script, limits);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Metadata and devices
    // ========================================================================

    fn validate_metadata(&mut self, script: &Script) {
        if script.name.trim().is_empty() {
            self.add_error("name", "Script name is required and cannot be empty");
        }
        if script.name.len() > 100 {
            self.add_warning("name", "Script name is unusually long (> 100 characters)");
        }
    }

    fn validate_devices(&mut self, script: &Script) {
        let path = "devices.camera.frame_interval";
        if let Some(interval) = self.parse_duration(&script.devices.camera.frame_interval, path) {
            if interval.is_zero() {
                self.add_error(path, "Frame interval must be greater than zero");
            }
        }
        if !script.devices.camera.available {
            self.add_warning(
                "devices.camera.available",
                "Camera is unavailable; the match will fail to start",
            );
        }
    }

    // ========================================================================
    // Steps
    // ========================================================================

    fn validate_steps(&mut self, steps: &[Step]) {
        let match_length = Duration::from_secs(u64::from(MATCH_SECONDS));
        let mut previous: Option<Duration> = None;

        for (i, step) in steps.iter().enumerate() {
            let base = format!("steps[{i}]");

            if let Some(at) = self.parse_duration(&step.at, &format!("{base}.at")) {
                if previous.is_some_and(|p| at < p) {
                    self.add_warning(
                        &format!("{base}.at"),
                        "Step is earlier than the one before it; steps run in time order",
                    );
                }
                if at > match_length {
                    self.add_warning(
                        &format!("{base}.at"),
                        &format!("Step is past the {MATCH_SECONDS}s match length and never runs"),
                    );
                }
                previous = Some(previous.map_or(at, |p| p.max(at)));
            }

            match step.action {
                StepAction::Shake => self.validate_shake(step, &base),
                action => {
                    if step.accel.is_some() {
                        self.add_error(
                            &format!("{base}.accel"),
                            &format!("'accel' is only valid on shake steps, not {}", action.as_str()),
                        );
                    }
                    if step.duration.is_some() {
                        self.add_error(
                            &format!("{base}.for"),
                            &format!("'for' is only valid on shake steps, not {}", action.as_str()),
                        );
                    }
                }
            }
        }
    }

    fn validate_shake(&mut self, step: &Step, base: &str) {
        match step.accel {
            None => self.add_error(&format!("{base}.accel"), "Shake steps require 'accel'"),
            Some(accel) => {
                if accel.iter().any(|v| !v.is_finite()) {
                    self.add_error(
                        &format!("{base}.accel"),
                        "Acceleration components must be finite numbers",
                    );
                }
            }
        }
        if let Some(duration) = &step.duration {
            let path = format!("{base}.for");
            if let Some(d) = self.parse_duration(duration, &path) {
                if d.is_zero() {
                    self.add_error(&path, "Shake duration must be greater than zero");
                }
            }
        }
    }

    // ========================================================================
    // Limits
    // ========================================================================

    fn validate_limits(&mut self, script: &Script, limits: &ScriptLimits) {
        if script.steps.len() > limits.max_steps {
            self.add_error(
                "steps",
                &format!(
                    "Too many steps: {} (limit: {})",
                    script.steps.len(),
                    limits.max_steps
                ),
            );
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn parse_duration(&mut self, value: &str, path: &str) -> Option<Duration> {
        match humantime::parse_duration(value.trim()) {
            Ok(d) => Some(d),
            Err(e) => {
                self.add_error(
                    path,
                    &format!("Invalid duration '{value}': {e}. Expected e.g. '250ms', '2s', '1m 30s'"),
                );
                None
            }
        }
    }

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}
