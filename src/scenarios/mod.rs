//! Built-in play scripts.
//!
//! Curated scripts embedded in the binary at compile time, so
//! `ghostsweep play --scenario quick-win` works with no files on disk.

use std::sync::LazyLock;

use crate::config::{LoadResult, ScriptLoader};
use crate::error::ConfigError;

// ============================================================================
// Types
// ============================================================================

/// A built-in script embedded in the binary.
#[derive(Debug)]
pub struct BuiltinScenario {
    /// Unique identifier (kebab-case).
    pub name: &'static str,

    /// Short human-readable description.
    pub description: &'static str,

    /// Tags for filtering.
    pub tags: &'static [&'static str],

    /// Raw YAML content.
    pub yaml: &'static str,
}

impl BuiltinScenario {
    /// Loads and validates the embedded script.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the embedded YAML is invalid.
    pub fn load(&self) -> Result<LoadResult, ConfigError> {
        ScriptLoader::with_defaults().load_from_str(self.yaml, &format!("scenario:{}", self.name))
    }
}

// ============================================================================
// Registry
// ============================================================================

static BUILTIN_SCENARIOS: LazyLock<Vec<BuiltinScenario>> = LazyLock::new(|| {
    vec![
        BuiltinScenario {
            name: "quick-win",
            description: "Five shaken extractions with the marker always in view",
            tags: &["win", "shake"],
            yaml: include_str!("../../scenarios/quick-win.yaml"),
        },
        BuiltinScenario {
            name: "shake-rush",
            description: "Every extraction shaken down to the floor and forced",
            tags: &["win", "shake", "forced"],
            yaml: include_str!("../../scenarios/shake-rush.yaml"),
        },
        BuiltinScenario {
            name: "time-out",
            description: "One extraction, then the clock runs out",
            tags: &["lose"],
            yaml: include_str!("../../scenarios/time-out.yaml"),
        },
        BuiltinScenario {
            name: "flicker",
            description: "Marker flickers in and out with the camera left running",
            tags: &["lose", "marker"],
            yaml: include_str!("../../scenarios/flicker.yaml"),
        },
        BuiltinScenario {
            name: "no-motion-sensor",
            description: "No accelerometer; every extraction runs the full ten seconds",
            tags: &["win", "degraded"],
            yaml: include_str!("../../scenarios/no-motion-sensor.yaml"),
        },
    ]
});

/// Looks up a built-in scenario by name.
#[must_use]
pub fn find_scenario(name: &str) -> Option<&'static BuiltinScenario> {
    BUILTIN_SCENARIOS.iter().find(|s| s.name == name)
}

/// Looks up and loads a built-in scenario.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownScenario`] (with a suggestion when one is
/// close) if no scenario has that name.
pub fn load_scenario(name: &str) -> Result<LoadResult, ConfigError> {
    let scenario = find_scenario(name).ok_or_else(|| ConfigError::UnknownScenario {
        name: name.to_owned(),
        suggestion: suggest_scenario(name),
    })?;
    scenario.load()
}

/// Lists all scenarios, optionally filtered by tag.
#[must_use]
pub fn list_scenarios(tag: Option<&str>) -> Vec<&'static BuiltinScenario> {
    BUILTIN_SCENARIOS
        .iter()
        .filter(|s| tag.is_none_or(|t| s.tags.contains(&t)))
        .collect()
}

/// Suggests a similar scenario name for typo correction.
///
/// Returns the closest match if its Damerau-Levenshtein distance is ≤ 3.
#[must_use]
pub fn suggest_scenario(input: &str) -> Option<String> {
    BUILTIN_SCENARIOS
        .iter()
        .map(|s| (s.name, strsim::damerau_levenshtein(input, s.name)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(name, _)| name.to_string())
}

/// Returns all scenario names in registry order.
#[must_use]
pub fn list_scenario_names() -> Vec<&'static str> {
    BUILTIN_SCENARIOS.iter().map(|s| s.name).collect()
}

// ============================================================================
// Tests
// ============================================================================
