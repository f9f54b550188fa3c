//! `validate`: check script files without playing them.

use std::path::Path;

use serde::Serialize;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::{LoadWarning, ScriptLoader};
use crate::error::{ConfigError, GhostSweepError, Severity, ValidationIssue};

/// Outcome for one file.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// Validates every file and reports the results.
///
/// All files are checked before returning; the first failure is returned
/// as the error.
///
/// # Errors
///
/// Returns the first file's [`ConfigError`], or a validation error built
/// from its warnings under `--strict`.
pub fn run(args: &ValidateArgs) -> Result<(), GhostSweepError> {
    let loader = ScriptLoader::with_defaults();
    let mut reports = Vec::with_capacity(args.files.len());
    let mut first_error: Option<ConfigError> = None;

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating script");
        let (report, error) = check(&loader, path, args.strict);
        if let Some(e) = error {
            first_error.get_or_insert(e);
        }
        reports.push(report);
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Human => {
            for report in &reports {
                let status = if report.valid { "ok" } else { "FAILED" };
                println!("{}: {status}", report.file);
                for e in &report.errors {
                    println!("  {e}");
                }
                for w in &report.warnings {
                    println!("  {w}");
                }
            }
        }
    }

    first_error.map_or(Ok(()), |e| Err(e.into()))
}

fn check(loader: &ScriptLoader, path: &Path, strict: bool) -> (FileReport, Option<ConfigError>) {
    let file = path.display().to_string();
    match loader.load(path) {
        Ok(result) => {
            let warnings: Vec<String> = result.warnings.iter().map(format_warning).collect();
            for w in &result.warnings {
                tracing::warn!(
                    location = w.location.as_deref().unwrap_or("<unknown>"),
                    "{}",
                    w.message
                );
            }
            if strict && !result.warnings.is_empty() {
                let errors = result
                    .warnings
                    .into_iter()
                    .map(|w| ValidationIssue {
                        path: w.location.unwrap_or_default(),
                        message: w.message,
                        severity: Severity::Error,
                    })
                    .collect::<Vec<_>>();
                let report = FileReport {
                    file: file.clone(),
                    valid: false,
                    errors: errors.iter().map(ToString::to_string).collect(),
                    warnings: Vec::new(),
                };
                return (
                    report,
                    Some(ConfigError::ValidationError {
                        path: file,
                        errors,
                    }),
                );
            }
            tracing::info!(file = %file, "script valid");
            (
                FileReport {
                    file,
                    valid: true,
                    errors: Vec::new(),
                    warnings,
                },
                None,
            )
        }
        Err(e) => {
            let errors = match &e {
                ConfigError::ValidationError { errors, .. } => {
                    errors.iter().map(ToString::to_string).collect()
                }
                other => vec![other.to_string()],
            };
            (
                FileReport {
                    file,
                    valid: false,
                    errors,
                    warnings: Vec::new(),
                },
                Some(e),
            )
        }
    }
}

fn format_warning(w: &LoadWarning) -> String {
    format!("warning: {w}")
}
