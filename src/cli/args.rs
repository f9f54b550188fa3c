//! CLI argument definitions.
//!
//! All Clap derive structs for `ghostsweep` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Marker-hunting extraction game, played from scripts.
#[derive(Parser, Debug)]
#[command(name = "ghostsweep", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "GHOSTSWEEP_COLOR")]
    pub color: ColorChoice,

    /// Log line format.
    #[arg(
        long,
        default_value = "human",
        global = true,
        env = "GHOSTSWEEP_LOG_FORMAT"
    )]
    pub log_format: LogFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play a match driven by a script or a built-in scenario.
    Play(PlayArgs),

    /// Validate script files without playing them.
    Validate(ValidateArgs),

    /// Browse built-in scenarios.
    Scenarios(ScenariosCommand),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Play
// ============================================================================

/// Arguments for `play`.
#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("source").required(true).multiple(false))]
pub struct PlayArgs {
    /// Path to a YAML play script.
    #[arg(short, long, group = "source", env = "GHOSTSWEEP_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Name of a built-in scenario.
    #[arg(long, group = "source")]
    pub scenario: Option<String>,

    /// Write the JSONL match event stream to this file.
    #[arg(long, env = "GHOSTSWEEP_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Serve Prometheus metrics on 127.0.0.1:<port>.
    #[arg(long, env = "GHOSTSWEEP_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Format of the final match report.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Validate
// ============================================================================

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Script files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

// ============================================================================
// Scenarios
// ============================================================================

/// Scenario commands.
#[derive(Args, Debug)]
pub struct ScenariosCommand {
    /// Scenarios subcommand.
    #[command(subcommand)]
    pub subcommand: ScenariosSubcommand,
}

/// Scenario subcommands.
#[derive(Subcommand, Debug)]
pub enum ScenariosSubcommand {
    /// List built-in scenarios.
    List(ScenariosListArgs),

    /// Print a built-in scenario's YAML.
    Show(ScenariosShowArgs),
}

/// Arguments for `scenarios list`.
#[derive(Args, Debug)]
pub struct ScenariosListArgs {
    /// Filter by tag.
    #[arg(long)]
    pub tag: Option<String>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `scenarios show`.
#[derive(Args, Debug)]
pub struct ScenariosShowArgs {
    /// Scenario name.
    pub name: String,
}

// ============================================================================
// Version
// ============================================================================

/// Arguments for `version`.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Color when stderr is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    /// Always color.
    Always,
    /// Never color.
    Never,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Human,
    /// Machine-readable JSON.
    Json,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_with_script() {
        let cli = Cli::try_parse_from(["ghostsweep", "play", "--script", "s.yaml"]);
        assert!(cli.is_ok(), "Failed to parse: {cli:?}");
    }

    #[test]
    fn test_play_with_scenario() {
        let cli = Cli::try_parse_from(["ghostsweep", "play", "--scenario", "quick-win"]).unwrap();
        let Commands::Play(args) = cli.command else {
            panic!("Expected PlayArgs");
        };
        assert_eq!(args.scenario.as_deref(), Some("quick-win"));
        assert_eq!(args.format, OutputFormat::Human);
        assert!(args.metrics_port.is_none());
    }

    #[test]
    fn test_play_requires_a_source() {
        assert!(Cli::try_parse_from(["ghostsweep", "play"]).is_err());
    }

    #[test]
    fn test_script_and_scenario_mutually_exclusive() {
        let cli = Cli::try_parse_from([
            "ghostsweep",
            "play",
            "--script",
            "s.yaml",
            "--scenario",
            "quick-win",
        ]);
        assert!(cli.is_err(), "Expected mutual exclusion error");
    }

    #[test]
    fn test_help_output() {
        let err = Cli::try_parse_from(["ghostsweep", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_output() {
        let err = Cli::try_parse_from(["ghostsweep", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "ghostsweep",
            "-vv",
            "--color",
            "never",
            "--log-format",
            "json",
            "scenarios",
            "list",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_validate_requires_files() {
        assert!(Cli::try_parse_from(["ghostsweep", "validate"]).is_err());
    }

    #[test]
    fn test_validate_strict_json() {
        let cli = Cli::try_parse_from([
            "ghostsweep",
            "validate",
            "a.yaml",
            "b.yaml",
            "--strict",
            "--format",
            "json",
        ])
        .unwrap();
        let Commands::Validate(args) = cli.command else {
            panic!("Expected ValidateArgs");
        };
        assert_eq!(args.files.len(), 2);
        assert!(args.strict);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_scenarios_show() {
        let cli = Cli::try_parse_from(["ghostsweep", "scenarios", "show", "flicker"]).unwrap();
        let Commands::Scenarios(cmd) = cli.command else {
            panic!("Expected ScenariosCommand");
        };
        assert!(matches!(cmd.subcommand, ScenariosSubcommand::Show(ref a) if a.name == "flicker"));
    }
}
