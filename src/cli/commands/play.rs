//! `play`: run one match from a script or built-in scenario.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{OutputFormat, PlayArgs};
use crate::config::{LoadResult, ScriptLoader};
use crate::error::GhostSweepError;
use crate::game::MatchReport;
use crate::observability::{EventEmitter, init_metrics};
use crate::scenarios;
use crate::sim::ScriptRunner;
use crate::ui::{ConsoleUi, GameUi, RecordingUi, banner_text};

/// Plays a match and prints its report.
///
/// With `quiet`, the live console UI is suppressed and only the report is
/// printed.
///
/// # Errors
///
/// Returns an error if the script fails to load, the metrics exporter or
/// events file cannot be set up, or the match fails to start.
pub async fn run(
    args: &PlayArgs,
    quiet: bool,
    cancel: CancellationToken,
) -> Result<(), GhostSweepError> {
    let loaded = load(args)?;
    for warning in &loaded.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }

    if args.metrics_port.is_some() {
        init_metrics(args.metrics_port)?;
    }

    let emitter = Arc::new(match &args.events_file {
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::noop(),
    });

    let ui: Arc<dyn GameUi> = if quiet {
        Arc::new(RecordingUi::new())
    } else {
        Arc::new(ConsoleUi::stdout())
    };

    let runner = ScriptRunner::new(loaded.script)?;
    tracing::info!(?runner, "starting scripted match");
    let report = runner.run(ui, emitter, cancel).await?;

    print_report(&report, args.format)
}

fn load(args: &PlayArgs) -> Result<LoadResult, GhostSweepError> {
    match (&args.script, &args.scenario) {
        (Some(path), _) => Ok(ScriptLoader::with_defaults().load(path)?),
        (None, Some(name)) => Ok(scenarios::load_scenario(name)?),
        (None, None) => Err(GhostSweepError::Usage(
            "either --script or --scenario is required".to_owned(),
        )),
    }
}

fn print_report(report: &MatchReport, format: OutputFormat) -> Result<(), GhostSweepError> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Human => {
            let result = report
                .outcome
                .map_or("Match abandoned", banner_text);
            println!("{result}");
            println!(
                "  script: {}  exterminated: {}  time left: {}s",
                report.script, report.exterminated, report.remaining_seconds
            );
            println!(
                "  extractions: {} ({} forced)  shakes: {}",
                report.extractions, report.forced_extractions, report.shakes
            );
        }
    }
    Ok(())
}
