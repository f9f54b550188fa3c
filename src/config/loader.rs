//! Script loader.
//!
//! Pipeline: size check, read, BOM strip, YAML parse, deserialize,
//! validate, freeze behind an `Arc`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::schema::Script;
use crate::config::validation::Validator;
use crate::error::ConfigError;

// ============================================================================
// Public API
// ============================================================================

/// Limits that keep a script from exhausting resources.
#[derive(Debug, Clone)]
pub struct ScriptLimits {
    /// Maximum number of timeline steps.
    pub max_steps: usize,

    /// Maximum script size in bytes.
    pub max_script_size: usize,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self {
            max_steps: env_or("GHOSTSWEEP_MAX_STEPS", 10_000),
            max_script_size: env_or("GHOSTSWEEP_MAX_SCRIPT_SIZE", 1024 * 1024),
        }
    }
}

/// Result of loading a script.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated script.
    pub script: Arc<Script>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during script loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} (at {location})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Script loader.
#[derive(Debug, Default)]
pub struct ScriptLoader {
    limits: ScriptLimits,
}

impl ScriptLoader {
    /// Creates a loader with the given limits.
    #[must_use]
    pub const fn new(limits: ScriptLimits) -> Self {
        Self { limits }
    }

    /// Creates a loader with limits taken from the environment.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ScriptLimits::default())
    }

    /// Loads and validates a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is too large, fails to
    /// parse, or fails validation.
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        self.check_size(size)?;

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        self.load_source(&raw, path)
    }

    /// Loads and validates a script from a YAML string.
    ///
    /// `origin` names the source in error messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is too large, fails to parse, or fails
    /// validation.
    pub fn load_from_str(&self, yaml: &str, origin: &str) -> Result<LoadResult, ConfigError> {
        self.check_size(yaml.len())?;
        self.load_source(yaml, &PathBuf::from(origin))
    }

    fn check_size(&self, size: usize) -> Result<(), ConfigError> {
        if size > self.limits.max_script_size {
            return Err(ConfigError::TooLarge {
                size,
                limit: self.limits.max_script_size,
            });
        }
        Ok(())
    }

    fn load_source(&self, raw: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        if raw.trim().is_empty() {
            return Err(ConfigError::ParseError {
                path: path.to_path_buf(),
                line: None,
                message: "Script file is empty".to_string(),
            });
        }

        let script: Script = serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })?;

        let result = Validator::new().validate(&script, &self.limits);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: result.errors,
            });
        }

        let warnings = result
            .warnings
            .into_iter()
            .map(|issue| LoadWarning {
                message: issue.message,
                location: Some(issue.path),
            })
            .collect();

        Ok(LoadResult {
            script: Arc::new(script),
            warnings,
        })
    }
}

/// Parses an environment variable with a default value.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const VALID: &str = "\
name: loader-test
steps:
  - at: 1s
    action: show_marker
  - at: 2s
    action: press_arm
";

    fn loader() -> ScriptLoader {
        ScriptLoader::new(ScriptLimits {
            max_steps: 100,
            max_script_size: 4096,
        })
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let result = loader().load(file.path()).unwrap();
        assert_eq!(result.script.name, "loader-test");
        assert_eq!(result.script.steps.len(), 2);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_load_strips_bom() {
        let text = format!("\u{feff}{VALID}");
        let result = loader().load_from_str(&text, "<inline>").unwrap();
        assert_eq!(result.script.name, "loader-test");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = loader().load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_load_too_large() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![b'#'; 5000]).unwrap();
        let err = loader().load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge { size: 5000, limit: 4096 }));
    }

    #[test]
    fn test_load_empty() {
        let err = loader().load_from_str("  \n", "<inline>").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_load_parse_error_has_line() {
        let err = loader()
            .load_from_str("name: x\nsteps:\n  - at: [\n", "<inline>")
            .unwrap_err();
        let ConfigError::ParseError { line, .. } = err else {
            panic!("expected parse error, got {err:?}");
        };
        assert!(line.is_some());
    }

    #[test]
    fn test_load_validation_error() {
        let yaml = "name: x\nsteps:\n  - at: 1s\n    action: shake\n";
        let err = loader().load_from_str(yaml, "bad.yaml").unwrap_err();
        let ConfigError::ValidationError { path, errors } = err else {
            panic!("expected validation error");
        };
        assert_eq!(path, "bad.yaml");
        assert_eq!(errors[0].path, "steps[0].accel");
    }

    #[test]
    fn test_load_surfaces_warnings() {
        let yaml = "name: x\nsteps:\n  - at: 4m\n    action: press_arm\n";
        let result = loader().load_from_str(yaml, "<inline>").unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].location.as_deref(), Some("steps[0].at"));
    }

    #[test]
    fn test_env_or_default() {
        assert_eq!(env_or("GHOSTSWEEP_TEST_UNSET_LIMIT", 7usize), 7);
    }
}
