//! Error types for `GhostSweep`
//!
//! The game core never errors on a guarded operation invoked in the wrong
//! state; those are no-ops. Errors here cover the edges of the system:
//! script loading, device bring-up, and the engine task itself.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `GhostSweep` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Script error (invalid YAML, validation failure, unknown scenario)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Device error (camera could not be started)
    pub const DEVICE_ERROR: i32 = 4;

    /// Engine error (event loop task failed)
    pub const ENGINE_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `GhostSweep` operations.
///
/// Aggregates all domain-specific errors and maps each to an exit code.
#[derive(Debug, Error)]
pub enum GhostSweepError {
    /// Script loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Camera or motion hardware error
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Game engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid command-line usage
    #[error("{0}")]
    Usage(String),
}

impl GhostSweepError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) => ExitCode::CONFIG_ERROR,
            Self::Device(_) => ExitCode::DEVICE_ERROR,
            Self::Engine(_) => ExitCode::ENGINE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Script loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the script file (`<inline>` for in-memory sources)
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Script validation failed
    #[error("validation failed for {path}: {}", summarize(errors))]
    ValidationError {
        /// Path to the script file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced script file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Script file exceeds the configured size limit
    #[error("script too large: {size} bytes (limit: {limit})")]
    TooLarge {
        /// Actual file size in bytes
        size: usize,
        /// Configured size limit in bytes
        limit: usize,
    },

    /// Built-in scenario name did not match any known scenario
    #[error("unknown scenario '{name}'{}", suggestion.as_ref().map(|s| format!(" (did you mean '{s}'?)")).unwrap_or_default())]
    UnknownScenario {
        /// Name that was requested
        name: String,
        /// Closest known name, if one is similar enough
        suggestion: Option<String>,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during script validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "steps[2].at")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents the script from being used
    Error,
    /// Warning - potential issue that does not prevent loading
    Warning,
}

// ============================================================================
// Device Errors
// ============================================================================

/// Hardware collaborator errors.
///
/// Only camera bring-up can fail loudly. A missing motion sensor is a
/// degraded mode, not an error.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// No capture device is present
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),
}

// ============================================================================
// Engine Errors
// ============================================================================

/// Game engine runtime errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine task panicked or was aborted
    #[error("engine task failed: {0}")]
    TaskFailed(String),

    /// The engine is no longer accepting events
    #[error("engine event channel closed")]
    ChannelClosed,
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `GhostSweep` operations.
pub type Result<T> = std::result::Result<T, GhostSweepError>;

// ============================================================================
// Tests
// ============================================================================
