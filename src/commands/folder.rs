//! Folder management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use stash_core::result::AppResult;
use stash_core::types::{FolderId, ParentRef};
use stash_entity::folder::Folder;
use stash_service::folder::{CreateFolderRequest, UpdateFolderRequest};

use super::{fmt_opt_time, fmt_time};
use crate::app::App;
use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// Create a folder
    Create {
        /// Tenant key
        #[arg(short, long)]
        owner: String,
        /// Folder name
        #[arg(short, long)]
        name: String,
        /// Parent folder ID, or "root"
        #[arg(short, long)]
        parent: Option<String>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List active folders directly under a parent
    List {
        /// Tenant key
        #[arg(short, long)]
        owner: String,
        /// Parent folder ID, or "root"
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Show one folder
    Show {
        /// Folder ID
        id: String,
    },
    /// Rename a folder or change its description
    Update {
        /// Folder ID
        id: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },
}

/// Folder display row
#[derive(Debug, Serialize, Tabled)]
pub(crate) struct FolderRow {
    /// Folder ID
    id: String,
    /// Name
    name: String,
    /// Parent ID
    parent: String,
    /// Physical path
    path: String,
    /// Description
    description: String,
    /// Created at
    created_at: String,
    /// Trashed at
    trashed_at: String,
}

impl From<&Folder> for FolderRow {
    fn from(f: &Folder) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.name.clone(),
            parent: f
                .parent_id
                .map(|p| p.to_string())
                .unwrap_or_else(|| "root".to_string()),
            path: f.physical_path.clone(),
            description: f.description.clone(),
            created_at: fmt_time(f.created_at),
            trashed_at: fmt_opt_time(f.deleted_at),
        }
    }
}

/// Execute folder commands
pub async fn execute(args: &FolderArgs, app: &App, format: OutputFormat) -> AppResult<()> {
    match &args.command {
        FolderCommand::Create {
            owner,
            name,
            parent,
            description,
        } => {
            let folder = app
                .folders
                .create(CreateFolderRequest {
                    owner: owner.clone(),
                    name: name.clone(),
                    parent: ParentRef::parse(parent.as_deref())?,
                    description: description.clone(),
                })
                .await?;
            output::print_item(FolderRow::from(&folder), format);
        }
        FolderCommand::List { owner, parent } => {
            let folders = app
                .folders
                .list(owner, ParentRef::parse(parent.as_deref())?)
                .await?;
            let rows: Vec<FolderRow> = folders.iter().map(FolderRow::from).collect();
            output::print_list(&rows, format);
        }
        FolderCommand::Show { id } => {
            let folder = app.folders.get(FolderId::parse(id)?).await?;
            output::print_item(FolderRow::from(&folder), format);
        }
        FolderCommand::Update {
            id,
            name,
            description,
        } => {
            let folder = app
                .folders
                .update(
                    FolderId::parse(id)?,
                    UpdateFolderRequest {
                        name: name.clone(),
                        description: description.clone(),
                    },
                )
                .await?;
            output::print_item(FolderRow::from(&folder), format);
        }
    }
    Ok(())
}
