//! CLI command dispatch and handlers.

pub mod play;
pub mod scenarios;
pub mod validate;
pub mod version;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands, ScenariosSubcommand};
use crate::error::GhostSweepError;

/// Dispatches a parsed CLI invocation to its handler.
///
/// `cancel` fires on the first SIGINT/SIGTERM.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), GhostSweepError> {
    match cli.command {
        Commands::Play(args) => play::run(&args, cli.quiet, cancel).await,
        Commands::Validate(args) => validate::run(&args),
        Commands::Scenarios(cmd) => match cmd.subcommand {
            ScenariosSubcommand::List(args) => scenarios::list(&args),
            ScenariosSubcommand::Show(args) => scenarios::show(&args),
        },
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}
