//! File management CLI commands.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::{Args, Subcommand};
use futures::StreamExt;
use serde::Serialize;
use tabled::Tabled;
use tokio::io::AsyncWriteExt;

use stash_core::error::AppError;
use stash_core::result::AppResult;
use stash_core::traits::ByteStream;
use stash_core::types::{FileId, ParentRef};
use stash_entity::file::File;
use stash_service::file::{UpdateFileRequest, UploadContent};

use super::{fmt_opt_time, fmt_time};
use crate::app::App;
use crate::output::{self, OutputFormat};

/// Arguments for file commands
#[derive(Debug, Args)]
pub struct FileArgs {
    /// File subcommand
    #[command(subcommand)]
    pub command: FileCommand,
}

/// File subcommands
#[derive(Debug, Subcommand)]
pub enum FileCommand {
    /// Upload one or more local files
    Upload {
        /// Tenant key
        #[arg(short, long)]
        owner: String,
        /// Target folder ID, or "root"
        #[arg(long)]
        folder: Option<String>,
        /// MIME type (guessed from the file name when omitted)
        #[arg(short, long)]
        mime: Option<String>,
        /// Local files to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List active files directly inside a folder
    List {
        /// Tenant key
        #[arg(short, long)]
        owner: String,
        /// Folder ID, or "root"
        #[arg(long)]
        folder: Option<String>,
    },
    /// Show one file
    Show {
        /// File ID
        id: String,
    },
    /// Rename and/or move a file
    Update {
        /// File ID
        id: String,
        /// New display name
        #[arg(short, long)]
        name: Option<String>,
        /// New folder ID, or "root"
        #[arg(long)]
        folder: Option<String>,
    },
    /// Replace a file's content with a local file
    Replace {
        /// File ID
        id: String,
        /// Local file with the new content
        path: PathBuf,
        /// MIME type (guessed from the file name when omitted)
        #[arg(short, long)]
        mime: Option<String>,
    },
    /// Download a file's content
    Download {
        /// File ID
        id: String,
        /// Where to write the content
        #[arg(short, long)]
        out: PathBuf,
    },
}

/// File display row
#[derive(Debug, Serialize, Tabled)]
pub(crate) struct FileRow {
    /// File ID
    id: String,
    /// Display name
    name: String,
    /// Folder ID
    folder: String,
    /// MIME type
    mime_type: String,
    /// Size in bytes
    size: i64,
    /// Uploaded at
    created_at: String,
    /// Trashed at
    trashed_at: String,
}

impl From<&File> for FileRow {
    fn from(f: &File) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.display_name.clone(),
            folder: f
                .folder_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "root".to_string()),
            mime_type: f.mime_type.clone(),
            size: f.size_bytes,
            created_at: fmt_time(f.created_at),
            trashed_at: fmt_opt_time(f.deleted_at),
        }
    }
}

/// Execute file commands
pub async fn execute(args: &FileArgs, app: &App, format: OutputFormat) -> AppResult<()> {
    match &args.command {
        FileCommand::Upload {
            owner,
            folder,
            mime,
            paths,
        } => {
            let folder = ParentRef::parse(folder.as_deref())?;
            let mut contents = Vec::with_capacity(paths.len());
            for path in paths {
                contents.push(read_local(path, mime.clone()).await?);
            }
            let files = app.uploads.ingest_many(owner, folder, contents).await?;
            let rows: Vec<FileRow> = files.iter().map(FileRow::from).collect();
            output::print_list(&rows, format);
        }
        FileCommand::List { owner, folder } => {
            let files = app
                .files
                .list(owner, ParentRef::parse(folder.as_deref())?)
                .await?;
            let rows: Vec<FileRow> = files.iter().map(FileRow::from).collect();
            output::print_list(&rows, format);
        }
        FileCommand::Show { id } => {
            let file = app.files.get(FileId::parse(id)?).await?;
            output::print_item(FileRow::from(&file), format);
        }
        FileCommand::Update { id, name, folder } => {
            let folder = folder
                .as_deref()
                .map(|raw| ParentRef::parse(Some(raw)))
                .transpose()?;
            let file = app
                .files
                .update_metadata(
                    FileId::parse(id)?,
                    UpdateFileRequest {
                        display_name: name.clone(),
                        folder,
                    },
                )
                .await?;
            output::print_item(FileRow::from(&file), format);
        }
        FileCommand::Replace { id, path, mime } => {
            let content = read_local(path, mime.clone()).await?;
            let file = app
                .uploads
                .ingest_replacement(FileId::parse(id)?, content)
                .await?;
            output::print_item(FileRow::from(&file), format);
        }
        FileCommand::Download { id, out } => {
            let (file, stream) = app.files.open_content(FileId::parse(id)?).await?;
            let written = write_local(out, stream).await?;
            output::print_success(&format!(
                "Wrote '{}' ({written} bytes) to {}",
                file.display_name,
                out.display()
            ));
        }
    }
    Ok(())
}

/// Read a local file into an upload.
pub(crate) async fn read_local(path: &Path, mime_type: Option<String>) -> AppResult<UploadContent> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::validation(format!("Not a file path: {}", path.display())))?
        .to_string();
    let data = tokio::fs::read(path).await?;
    Ok(UploadContent {
        file_name,
        mime_type,
        data: Bytes::from(data),
    })
}

/// Drain a byte stream into a local file, returning the bytes written.
pub(crate) async fn write_local(path: &Path, mut stream: ByteStream) -> AppResult<u64> {
    let mut out = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        out.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    out.flush().await?;
    Ok(written)
}
