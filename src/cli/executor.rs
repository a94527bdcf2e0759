//! Dispatches parsed commands that run to completion without the server.

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::error::AppResult;

/// Runs the selected command. For a plain `serve` (or no subcommand) this
/// only re-validates the settings; [`Cli::starts_server`] tells the caller
/// whether to start the server afterwards.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    match &cli.command {
        Some(Commands::Serve {
            dry_run, in_memory, ..
        }) => ServeCommandHandler::new(settings, *in_memory).execute(*dry_run),
        None => ServeCommandHandler::new(settings, false).execute(false),
        Some(Commands::Migrate { dry_run, rollback }) => {
            if let Some(steps) = rollback {
                tracing::warn!(steps, "Reverting migrations");
            }
            MigrateCommandHandler::new(settings)
                .execute(*dry_run, *rollback)
                .await
        }
    }
}
