//! Trash, restore, and purge CLI commands.

use clap::{Args, Subcommand};

use stash_core::result::AppResult;
use stash_core::types::{FileId, FolderId};

use super::file::FileRow;
use super::folder::FolderRow;
use crate::app::App;
use crate::output::{self, OutputFormat};

/// Arguments for trash commands
#[derive(Debug, Args)]
pub struct TrashArgs {
    /// Trash subcommand
    #[command(subcommand)]
    pub command: TrashCommand,
}

/// Trash subcommands
#[derive(Debug, Subcommand)]
pub enum TrashCommand {
    /// Show everything a tenant has in the trash
    List {
        /// Tenant key
        #[arg(short, long)]
        owner: String,
    },
    /// Trash a folder, its subfolders, and their files
    Folder {
        /// Folder ID
        id: String,
    },
    /// Trash one file
    File {
        /// File ID
        id: String,
    },
    /// Restore a folder, its subfolders, and their files
    RestoreFolder {
        /// Folder ID
        id: String,
    },
    /// Restore one file
    RestoreFile {
        /// File ID
        id: String,
    },
    /// Permanently delete a folder subtree and every file in it
    PurgeFolder {
        /// Folder ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Permanently delete one file, its content, and its shares
    PurgeFile {
        /// File ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Execute trash commands
pub async fn execute(args: &TrashArgs, app: &App, format: OutputFormat) -> AppResult<()> {
    match &args.command {
        TrashCommand::List { owner } => {
            let listing = app.trash.list(owner).await?;
            if listing.is_empty() {
                println!("Trash is empty.");
                return Ok(());
            }
            let folders: Vec<FolderRow> = listing.folders.iter().map(FolderRow::from).collect();
            let files: Vec<FileRow> = listing.files.iter().map(FileRow::from).collect();
            output::print_list(&folders, format);
            output::print_list(&files, format);
        }
        TrashCommand::Folder { id } => {
            let outcome = app.trash.trash_folder(FolderId::parse(id)?).await?;
            output::print_success(&format!(
                "Trashed '{}': {} folder(s), {} file(s).",
                outcome.folder.name, outcome.folders, outcome.files
            ));
        }
        TrashCommand::File { id } => {
            let file = app.files.soft_delete(FileId::parse(id)?).await?;
            output::print_success(&format!("Trashed '{}'.", file.display_name));
        }
        TrashCommand::RestoreFolder { id } => {
            let outcome = app.trash.restore_folder(FolderId::parse(id)?).await?;
            output::print_success(&format!(
                "Restored '{}': {} folder(s), {} file(s).",
                outcome.folder.name, outcome.folders, outcome.files
            ));
        }
        TrashCommand::RestoreFile { id } => {
            let file = app.files.restore(FileId::parse(id)?).await?;
            output::print_success(&format!("Restored '{}'.", file.display_name));
        }
        TrashCommand::PurgeFolder { id, yes } => {
            let folder_id = FolderId::parse(id)?;
            let folder = app.folders.get(folder_id).await?;
            let prompt = format!(
                "Permanently delete folder '{}' with all subfolders and files?",
                folder.name
            );
            if !output::confirm(&prompt, *yes)? {
                output::print_warning("Cancelled.");
                return Ok(());
            }
            let outcome = app.trash.purge_folder(folder_id).await?;
            output::print_success(&format!(
                "Purged {} folder(s) and {} file(s).",
                outcome.folders, outcome.files
            ));
        }
        TrashCommand::PurgeFile { id, yes } => {
            let file_id = FileId::parse(id)?;
            let file = app.files.get(file_id).await?;
            let prompt = format!("Permanently delete '{}'?", file.display_name);
            if !output::confirm(&prompt, *yes)? {
                output::print_warning("Cancelled.");
                return Ok(());
            }
            app.trash.purge_file(file_id).await?;
            output::print_success(&format!("Purged '{}'.", file.display_name));
        }
    }
    Ok(())
}
