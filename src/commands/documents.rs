//! Rendering and file helpers shared by the document commands.

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use haulmark_core::error::{AppError, ErrorKind};
use haulmark_core::result::AppResult;
use haulmark_entity::document::{Document, DocumentCategory, DocumentKind, DocumentStatus};
use haulmark_service::{DocumentTracker, UploadRequest};

use crate::output::{self, OutputFormat, cell};

/// One document slot and its review status
#[derive(Debug, Serialize, Tabled)]
pub struct SlotRow {
    /// Document type
    #[tabled(rename = "type")]
    document_type: String,
    /// Display name
    name: String,
    /// Whether the slot must be verified
    required: String,
    /// Review status
    status: String,
}

/// A stored document
#[derive(Debug, Serialize, Tabled)]
pub struct DocumentRow {
    /// Document ID
    id: String,
    /// Document type
    #[tabled(rename = "type")]
    document_type: String,
    /// Original file name
    file: String,
    /// Review status
    status: String,
    /// Why the reviewer rejected it
    reason: String,
    /// Upload time
    uploaded: String,
}

impl From<&Document> for DocumentRow {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id.to_string(),
            document_type: document.document_type.clone(),
            file: cell(document.file_name.as_deref()),
            status: document.effective_status().to_string(),
            reason: cell(document.rejection_reason.as_deref()),
            uploaded: cell(
                document
                    .uploaded_at
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string()),
            ),
        }
    }
}

/// Print every slot of a parent with a completeness summary.
pub fn print_statuses<C: DocumentCategory>(
    tracker: &DocumentTracker<C>,
    parent_id: Uuid,
    format: OutputFormat,
) {
    let rows: Vec<SlotRow> = tracker
        .statuses(parent_id)
        .into_iter()
        .map(|(kind, status)| SlotRow {
            document_type: kind.as_str().to_string(),
            name: kind.label().to_string(),
            required: if kind.is_required() { "yes" } else { "no" }.to_string(),
            status: status.to_string(),
        })
        .collect();
    output::print_list(&rows, format);

    if format == OutputFormat::Table {
        if tracker.is_complete(parent_id) {
            output::print_success("All required documents verified");
        } else {
            let outstanding: Vec<&str> = tracker
                .outstanding(parent_id)
                .iter()
                .map(|kind| kind.label())
                .collect();
            if !outstanding.is_empty() {
                output::print_warning(&format!("Needs upload: {}", outstanding.join(", ")));
            }
        }
    }
}

/// Print a parent's stored documents.
pub fn print_documents(documents: &[Document], format: OutputFormat) {
    let rows: Vec<DocumentRow> = documents.iter().map(DocumentRow::from).collect();
    output::print_list(&rows, format);
}

/// Print the outcome of one upload.
pub fn print_uploaded(document: &Document, format: OutputFormat) {
    output::print_item(&DocumentRow::from(document), format);
    if format == OutputFormat::Table && document.effective_status() == DocumentStatus::Pending {
        output::print_kv("Awaiting review", &document.document_type);
    }
}

/// Read a file from disk into an upload request.
pub async fn read_upload<K>(
    path: &Path,
    parent_id: Uuid,
    document_type: K,
    content_type: Option<String>,
) -> AppResult<UploadRequest<K>> {
    let data = tokio::fs::read(path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Validation,
            format!("Cannot read '{}'", path.display()),
            e,
        )
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::validation(format!("'{}' is not a file", path.display())))?;

    Ok(UploadRequest {
        parent_id,
        document_type,
        file_name,
        content_type,
        data: Bytes::from(data),
    })
}
