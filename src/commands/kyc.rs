//! KYC document CLI commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use haulmark_core::error::AppError;
use haulmark_core::result::AppResult;
use haulmark_core::types::{DocumentId, UserId};
use haulmark_entity::document::KycDocumentType;
use haulmark_service::DocumentTracker;

use super::Session;
use super::documents;
use crate::output::OutputFormat;

/// Arguments for KYC commands
#[derive(Debug, Args)]
pub struct KycArgs {
    /// KYC subcommand
    #[command(subcommand)]
    pub command: KycCommand,
}

/// KYC subcommands
#[derive(Debug, Subcommand)]
pub enum KycCommand {
    /// Show the review status of every KYC slot
    Status {
        /// Another user's documents (admins only)
        #[arg(long)]
        of: Option<UserId>,
    },
    /// List uploaded KYC documents
    Documents {
        /// Another user's documents (admins only)
        #[arg(long)]
        of: Option<UserId>,
    },
    /// Upload a file into a KYC slot
    Upload {
        /// pan_card, aadhaar_card, driving_license, gst_certificate, vehicle_rc or cancelled_cheque
        document_type: KycDocumentType,
        /// File to upload
        file: PathBuf,
        /// MIME type; guessed from the extension when omitted
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Delete an uploaded KYC document
    Delete {
        /// Document id
        id: DocumentId,
    },
}

/// Execute KYC commands
pub async fn execute(
    args: &KycArgs,
    session: &Session,
    format: OutputFormat,
) -> AppResult<()> {
    let tracker = DocumentTracker::kyc(
        session.records.clone(),
        session.blobs.clone(),
        session.notifier.clone(),
        &session.config.storage,
    );
    let ctx = &session.ctx;

    match &args.command {
        KycCommand::Status { of } => {
            let owner = subject(session, *of)?;
            tracker.fetch(ctx, owner.into_uuid()).await?;
            documents::print_statuses(&tracker, owner.into_uuid(), format);
        }
        KycCommand::Documents { of } => {
            let owner = subject(session, *of)?;
            let docs = tracker.fetch(ctx, owner.into_uuid()).await?;
            documents::print_documents(&docs, format);
        }
        KycCommand::Upload {
            document_type,
            file,
            content_type,
        } => {
            let owner = ctx.require_user()?;
            let request = documents::read_upload(
                file,
                owner.into_uuid(),
                *document_type,
                content_type.clone(),
            )
            .await?;
            let document = tracker.upload(ctx, request).await?;
            documents::print_uploaded(&document, format);
        }
        KycCommand::Delete { id } => {
            tracker.delete(ctx, *id).await?;
        }
    }

    Ok(())
}

/// Whose documents to show: the caller's, unless an admin names someone.
fn subject(session: &Session, of: Option<UserId>) -> AppResult<UserId> {
    let me = session.ctx.require_user()?;
    match of {
        Some(other) if other != me && !session.ctx.is_admin() => Err(AppError::authorization(
            "Only admins can view another user's KYC documents",
        )),
        Some(other) => Ok(other),
        None => Ok(me),
    }
}
