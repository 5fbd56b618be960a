//! CLI command definitions and dispatch.

pub mod file;
pub mod folder;
pub mod migrate;
pub mod share;
pub mod trash;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use stash_core::config::AppConfig;
use stash_core::result::AppResult;

use crate::app::App;
use crate::output::OutputFormat;

/// Stash: folders, files, trash, and share links for multi-tenant storage
#[derive(Debug, Parser)]
#[command(name = "stash", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and per-environment overlays
    #[arg(long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to apply ({config_dir}/{env}.toml)
    #[arg(long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Folder management
    Folder(folder::FolderArgs),
    /// File management
    File(file::FileArgs),
    /// Share link management
    Share(share::ShareArgs),
    /// Trash, restore, and purge
    Trash(trash::TrashArgs),
}

impl Cli {
    /// Execute the selected command.
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        if let Commands::Migrate(args) = &self.command {
            return migrate::execute(args, &config).await;
        }

        let app = App::connect(&config).await?;
        let result = match &self.command {
            Commands::Folder(args) => folder::execute(args, &app, self.format).await,
            Commands::File(args) => file::execute(args, &app, self.format).await,
            Commands::Share(args) => share::execute(args, &app, self.format).await,
            Commands::Trash(args) => trash::execute(args, &app, self.format).await,
            Commands::Migrate(_) => Ok(()),
        };
        app.close().await;
        result
    }
}

/// Render a timestamp for table output.
pub(crate) fn fmt_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Render an optional timestamp, `-` when absent.
pub(crate) fn fmt_opt_time(at: Option<DateTime<Utc>>) -> String {
    at.map(fmt_time).unwrap_or_else(|| "-".to_string())
}
