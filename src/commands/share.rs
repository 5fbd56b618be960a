//! Share link CLI commands.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use stash_core::error::AppError;
use stash_core::result::AppResult;
use stash_core::types::FileId;
use stash_entity::share::{Share, ShareState};
use stash_service::LinkService;

use super::file::write_local;
use super::{fmt_opt_time, fmt_time};
use crate::app::App;
use crate::output::{self, OutputFormat};

/// Arguments for share commands
#[derive(Debug, Args)]
pub struct ShareArgs {
    /// Share subcommand
    #[command(subcommand)]
    pub command: ShareCommand,
}

/// Share subcommands
#[derive(Debug, Subcommand)]
pub enum ShareCommand {
    /// Create a share link for a file
    Create {
        /// File ID
        file_id: String,
        /// Expire after this many hours
        #[arg(long, conflicts_with = "expires_at")]
        expires_in_hours: Option<i64>,
        /// Expire at this RFC 3339 time
        #[arg(long)]
        expires_at: Option<String>,
    },
    /// List shares of one file or of everything a tenant owns
    List {
        /// File ID
        #[arg(long, conflicts_with = "owner", required_unless_present = "owner")]
        file: Option<String>,
        /// Tenant key
        #[arg(short, long)]
        owner: Option<String>,
    },
    /// Check a token without counting a download
    Resolve {
        /// Share token
        token: String,
    },
    /// Revoke every share of a file
    Revoke {
        /// File ID
        file_id: String,
    },
    /// Download through a share token
    Open {
        /// Share token
        token: String,
        /// Where to write the content
        #[arg(long)]
        out: PathBuf,
    },
}

/// Share display row
#[derive(Debug, Serialize, Tabled)]
struct ShareRow {
    /// Share ID
    id: String,
    /// File ID
    file_id: String,
    /// Public URL
    url: String,
    /// Current state
    state: String,
    /// Expires at
    expires_at: String,
    /// Downloads
    downloads: i64,
    /// Last accessed
    last_accessed_at: String,
    /// Created at
    created_at: String,
}

impl ShareRow {
    fn new(share: &Share, links: &LinkService) -> Self {
        let state = match share.state_at(Utc::now()) {
            ShareState::Active => "active",
            ShareState::Revoked => "revoked",
            ShareState::Expired => "expired",
        };
        let link = links.build_link(share);
        Self {
            id: link.share_id.to_string(),
            file_id: link.file_id.to_string(),
            url: link.url,
            state: state.to_string(),
            expires_at: fmt_opt_time(share.expires_at),
            downloads: share.download_count,
            last_accessed_at: fmt_opt_time(share.last_accessed_at),
            created_at: fmt_time(share.created_at),
        }
    }
}

fn parse_expiry(hours: Option<i64>, at: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    if let Some(hours) = hours {
        return Ok(Some(Utc::now() + Duration::hours(hours)));
    }
    at.map(|raw| {
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| AppError::validation(format!("Invalid expiry time '{raw}': {e}")))
    })
    .transpose()
}

/// Execute share commands
pub async fn execute(args: &ShareArgs, app: &App, format: OutputFormat) -> AppResult<()> {
    let links = app.shares.links();
    match &args.command {
        ShareCommand::Create {
            file_id,
            expires_in_hours,
            expires_at,
        } => {
            let expiry = parse_expiry(*expires_in_hours, expires_at.as_deref())?;
            let share = app.shares.create(FileId::parse(file_id)?, expiry).await?;
            output::print_item(ShareRow::new(&share, links), format);
        }
        ShareCommand::List { file, owner } => {
            let shares = match (file, owner) {
                (Some(file), _) => app.shares.list_by_file(FileId::parse(file)?).await?,
                (None, Some(owner)) => app.shares.list_by_owner(owner).await?,
                (None, None) => return Err(AppError::validation("Pass --file or --owner")),
            };
            let rows: Vec<ShareRow> = shares.iter().map(|s| ShareRow::new(s, links)).collect();
            output::print_list(&rows, format);
        }
        ShareCommand::Resolve { token } => {
            let share = app.shares.resolve(token).await?;
            output::print_item(ShareRow::new(&share, links), format);
        }
        ShareCommand::Revoke { file_id } => {
            let revoked = app.shares.revoke(FileId::parse(file_id)?).await?;
            output::print_success(&format!("Revoked {revoked} share(s)."));
        }
        ShareCommand::Open { token, out } => {
            let download = app.access.open(token).await?;
            let written = write_local(out, download.stream).await?;
            output::print_success(&format!(
                "Wrote '{}' ({written} bytes) to {}; download #{}",
                download.file.display_name,
                out.display(),
                download.share.download_count
            ));
        }
    }
    Ok(())
}
