//! Load paperwork CLI commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use haulmark_core::error::AppError;
use haulmark_core::result::AppResult;
use haulmark_core::types::{DocumentId, LoadId};
use haulmark_entity::document::LoadDocumentType;
use haulmark_service::DocumentTracker;

use super::Session;
use super::documents;
use crate::output::OutputFormat;

/// Arguments for load paperwork commands
#[derive(Debug, Args)]
pub struct LoadDocArgs {
    /// Load the paperwork belongs to
    #[arg(long, global = true)]
    pub load: Option<LoadId>,

    /// Load paperwork subcommand
    #[command(subcommand)]
    pub command: LoadDocCommand,
}

/// Load paperwork subcommands
#[derive(Debug, Subcommand)]
pub enum LoadDocCommand {
    /// Show the status of every paperwork slot
    Status,
    /// List uploaded paperwork
    Documents,
    /// Upload a file into a paperwork slot
    Upload {
        /// lorry_receipt, invoice, eway_bill, proof_of_delivery or weight_slip
        document_type: LoadDocumentType,
        /// File to upload
        file: PathBuf,
        /// MIME type; guessed from the extension when omitted
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Delete uploaded paperwork
    Delete {
        /// Document id
        id: DocumentId,
    },
}

/// Execute load paperwork commands
pub async fn execute(
    args: &LoadDocArgs,
    session: &Session,
    format: OutputFormat,
) -> AppResult<()> {
    let tracker = DocumentTracker::load_paperwork(
        session.records.clone(),
        session.blobs.clone(),
        session.notifier.clone(),
        &session.config.storage,
    );
    let ctx = &session.ctx;
    let load = || {
        args.load
            .map(LoadId::into_uuid)
            .ok_or_else(|| AppError::validation("--load is required"))
    };

    match &args.command {
        LoadDocCommand::Status => {
            let load_id = load()?;
            tracker.fetch(ctx, load_id).await?;
            documents::print_statuses(&tracker, load_id, format);
        }
        LoadDocCommand::Documents => {
            let docs = tracker.fetch(ctx, load()?).await?;
            documents::print_documents(&docs, format);
        }
        LoadDocCommand::Upload {
            document_type,
            file,
            content_type,
        } => {
            let request =
                documents::read_upload(file, load()?, *document_type, content_type.clone())
                    .await?;
            let document = tracker.upload(ctx, request).await?;
            documents::print_uploaded(&document, format);
        }
        LoadDocCommand::Delete { id } => {
            tracker.delete(ctx, *id).await?;
        }
    }

    Ok(())
}
