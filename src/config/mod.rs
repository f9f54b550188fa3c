//! Play scripts.
//!
//! Loads and validates YAML scripts that describe simulated hardware and a
//! timeline of player actions.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{LoadResult, LoadWarning, ScriptLimits, ScriptLoader};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
