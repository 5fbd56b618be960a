//! Database migration commands.

use clap::{Args, Subcommand};

use stash_core::config::AppConfig;
use stash_core::result::AppResult;
use stash_database::DatabasePool;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check that the database is reachable
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> AppResult<()> {
    let pool = DatabasePool::connect(&config.database).await?;

    let result = match args.command {
        MigrateCommand::Run => stash_database::migration::run_migrations(pool.pool())
            .await
            .map(|()| output::print_success("All migrations applied.")),
        MigrateCommand::Check => pool.health_check().await.map(|reachable| {
            if reachable {
                output::print_success("Database reachable.");
            } else {
                output::print_warning("Database answered unexpectedly.");
            }
        }),
    };

    pool.close().await;
    result
}
