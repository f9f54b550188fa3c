//! `scenarios list` and `scenarios show`.

use std::fmt::Write as _;

use crate::cli::args::{OutputFormat, ScenariosListArgs, ScenariosShowArgs};
use crate::error::GhostSweepError;
use crate::scenarios;

/// Lists built-in scenarios.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn list(args: &ScenariosListArgs) -> Result<(), GhostSweepError> {
    let results = scenarios::list_scenarios(args.tag.as_deref());

    match args.format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = results
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "name": s.name,
                        "description": s.description,
                        "tags": s.tags,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Human => {
            if results.is_empty() {
                println!("No scenarios match the given filters.");
                return Ok(());
            }

            println!("Built-in Scenarios ({} available)\n", results.len());
            for s in &results {
                let tags = format!("[{}]", s.tags.join(", "));
                println!("  {:<20}{:<60}{tags}", s.name, s.description);
            }
            println!();
            println!("Play a scenario: ghostsweep play --scenario <name>");
            println!("View YAML:       ghostsweep scenarios show <name>");
        }
    }

    Ok(())
}

/// Prints the YAML of a built-in scenario.
///
/// # Errors
///
/// Returns a usage error if the scenario name is not found.
pub fn show(args: &ScenariosShowArgs) -> Result<(), GhostSweepError> {
    let scenario = scenarios::find_scenario(&args.name).ok_or_else(|| {
        let mut message = format!("Unknown scenario '{}'", args.name);

        if let Some(suggestion) = scenarios::suggest_scenario(&args.name) {
            let _ = write!(message, "\n\nDid you mean '{suggestion}'?");
        }

        message.push_str("\n\nAvailable scenarios:");
        for s in scenarios::list_scenarios(None) {
            let _ = write!(message, "\n  {:<20}{}", s.name, s.description);
        }
        GhostSweepError::Usage(message)
    })?;

    print!("{}", scenario.yaml);
    Ok(())
}
