//! Document upload flow and per-parent status tracking.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use chrono::Utc;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use haulmark_core::config::StorageConfig;
use haulmark_core::error::AppError;
use haulmark_core::result::AppResult;
use haulmark_core::traits::{BlobStore, Notification, NotificationSink, RecordStore};
use haulmark_core::types::query::{ID_FIELD, from_row, to_row};
use haulmark_core::types::{DocumentId, FilterField, Row, SelectQuery, SortField};
use haulmark_entity::document::{
    Document, DocumentCategory, DocumentKind, DocumentStatus, DocumentUpsert, Kyc, LoadPaperwork,
    PARENT_ID_FIELD,
};
use haulmark_storage::keys::{document_key, mime_from_name};

use super::status::DocumentIndex;
use crate::context::RequestContext;
use crate::state::{FetchSequence, InFlight, Versioned};

const DOCUMENT_TYPE_FIELD: &str = "document_type";
const UPLOADED_AT_FIELD: &str = "uploaded_at";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file to attach to a parent record.
#[derive(Debug, Clone)]
pub struct UploadRequest<K> {
    /// The user (KYC) or load (paperwork) the document belongs to.
    pub parent_id: Uuid,
    /// Slot being filled.
    pub document_type: K,
    /// Original file name; its extension is kept in the storage key.
    pub file_name: String,
    /// MIME type. Guessed from the file name when absent.
    pub content_type: Option<String>,
    /// File content.
    pub data: Bytes,
}

/// The latest snapshot fetched for one parent.
#[derive(Debug, Clone, Default)]
struct ParentDocuments {
    documents: Vec<Document>,
    index: DocumentIndex,
}

impl ParentDocuments {
    fn new(documents: Vec<Document>) -> Self {
        let index = DocumentIndex::build(&documents);
        Self { documents, index }
    }
}

/// Uploads documents of one category and tracks their review status.
///
/// An upload stores the blob, registers a `pending` metadata row keyed on
/// `(parent, document_type)`, then re-fetches the parent's documents. Status
/// is always derived from the latest fetched snapshot; this type never
/// writes `verified` or `rejected`.
///
/// A metadata failure after a successful blob upload leaves the blob in
/// place. It is logged and not cleaned up.
pub struct DocumentTracker<C: DocumentCategory> {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
    notifier: Arc<dyn NotificationSink>,
    /// Size and content-type limits.
    limits: StorageConfig,
    bucket: String,
    snapshots: RwLock<HashMap<Uuid, Versioned<ParentDocuments>>>,
    sequence: FetchSequence,
    in_flight: InFlight,
    shutdown: CancellationToken,
    _category: PhantomData<C>,
}

impl<C: DocumentCategory> std::fmt::Debug for DocumentTracker<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentTracker")
            .field("table", &C::TABLE)
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl DocumentTracker<Kyc> {
    /// Tracker for KYC documents using the configured bucket.
    pub fn kyc(
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        notifier: Arc<dyn NotificationSink>,
        config: &StorageConfig,
    ) -> Self {
        Self::new(records, blobs, notifier, config.clone()).with_bucket(&config.kyc_bucket)
    }
}

impl DocumentTracker<LoadPaperwork> {
    /// Tracker for load paperwork using the configured bucket.
    pub fn load_paperwork(
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        notifier: Arc<dyn NotificationSink>,
        config: &StorageConfig,
    ) -> Self {
        Self::new(records, blobs, notifier, config.clone()).with_bucket(&config.load_bucket)
    }
}

impl<C: DocumentCategory> DocumentTracker<C> {
    /// Creates a tracker storing blobs in the category's default bucket.
    pub fn new(
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        notifier: Arc<dyn NotificationSink>,
        limits: StorageConfig,
    ) -> Self {
        Self {
            records,
            blobs,
            notifier,
            limits,
            bucket: C::BUCKET.to_string(),
            snapshots: RwLock::new(HashMap::new()),
            sequence: FetchSequence::default(),
            in_flight: InFlight::default(),
            shutdown: CancellationToken::new(),
            _category: PhantomData,
        }
    }

    /// Store blobs in another bucket.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// The blob bucket.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Uploads a file into a document slot and returns the registered row.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        request: UploadRequest<C::Kind>,
    ) -> AppResult<Document> {
        let kind = request.document_type;
        match self.try_upload(ctx, request).await {
            Ok(document) => {
                info!(
                    table = C::TABLE,
                    parent_id = %document.parent_id,
                    document_type = kind.as_str(),
                    "Document uploaded"
                );
                self.notifier.notify(Notification::success(
                    format!("{} uploaded", kind.label()),
                    "Your document has been submitted for verification.",
                ));
                Ok(document)
            }
            Err(e) => Err(self.report_failure(format!("Failed to upload {}", kind.label()), e)),
        }
    }

    /// Fetches a parent's documents, newest first, and rebuilds its index.
    pub async fn fetch(&self, ctx: &RequestContext, parent_id: Uuid) -> AppResult<Vec<Document>> {
        debug!(table = C::TABLE, %parent_id, caller = ?ctx.user_id, "Fetching documents");
        match self.load(parent_id).await {
            Ok(documents) => Ok(documents),
            Err(e) => Err(self.report_failure(format!("Failed to load {}s", C::LABEL), e)),
        }
    }

    /// Deletes a document row, then its blob.
    pub async fn delete(&self, ctx: &RequestContext, document_id: DocumentId) -> AppResult<()> {
        match self.try_delete(ctx, document_id).await {
            Ok(()) => {
                info!(table = C::TABLE, %document_id, "Document deleted");
                self.notifier.notify(Notification::success(
                    format!("{} deleted", C::LABEL),
                    format!("{} {document_id} was removed.", C::LABEL),
                ));
                Ok(())
            }
            Err(e) => Err(self.report_failure(format!("Failed to delete {}", C::LABEL), e)),
        }
    }

    /// Status of one slot in the latest snapshot of `parent_id`.
    pub fn status(&self, parent_id: Uuid, document_type: C::Kind) -> DocumentStatus {
        self.snapshots()
            .get(&parent_id)
            .map(|snapshot| snapshot.get().index.status(parent_id, document_type.as_str()))
            .unwrap_or_default()
    }

    /// Every slot of the category with its status, in display order.
    pub fn statuses(&self, parent_id: Uuid) -> Vec<(C::Kind, DocumentStatus)> {
        let snapshots = self.snapshots();
        let index = snapshots.get(&parent_id).map(|s| &s.get().index);
        C::Kind::all()
            .iter()
            .map(|kind| {
                let status = index
                    .map(|index| index.status(parent_id, kind.as_str()))
                    .unwrap_or_default();
                (*kind, status)
            })
            .collect()
    }

    /// The latest snapshot of `parent_id`, newest first.
    pub fn documents(&self, parent_id: Uuid) -> Vec<Document> {
        self.snapshots()
            .get(&parent_id)
            .map(|snapshot| snapshot.get().documents.clone())
            .unwrap_or_default()
    }

    /// Whether every required slot is verified.
    pub fn is_complete(&self, parent_id: Uuid) -> bool {
        self.statuses(parent_id)
            .into_iter()
            .filter(|(kind, _)| kind.is_required())
            .all(|(_, status)| status == DocumentStatus::Verified)
    }

    /// Slots that need a (new) upload: never uploaded or rejected.
    pub fn outstanding(&self, parent_id: Uuid) -> Vec<C::Kind> {
        self.statuses(parent_id)
            .into_iter()
            .filter(|(_, status)| status.needs_upload())
            .map(|(kind, _)| kind)
            .collect()
    }

    /// Whether any operation is waiting on a store.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_active()
    }

    /// Cancels in-flight fetches. Their results are never applied.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    async fn try_upload(
        &self,
        ctx: &RequestContext,
        request: UploadRequest<C::Kind>,
    ) -> AppResult<Document> {
        let uploaded_by = ctx.require_user()?;
        let content_type = self.check_payload(&request)?;

        let UploadRequest {
            parent_id,
            document_type,
            file_name,
            data,
            ..
        } = request;
        let uploaded_at = Utc::now();
        let key = document_key(&parent_id, document_type.as_str(), &file_name, uploaded_at);

        {
            let _busy = self.in_flight.enter();
            self.blobs
                .upload(&self.bucket, &key, data, Some(&content_type))
                .await?;
        }
        debug!(bucket = %self.bucket, key = %key, "Blob stored");

        let file_url = self.blobs.public_url(&self.bucket, &key);
        let mut row = to_row(&DocumentUpsert {
            document_type: document_type.as_str().to_string(),
            file_name,
            file_url,
            storage_key: key.clone(),
            status: DocumentStatus::Pending,
            uploaded_by,
            uploaded_at,
        })?;
        row.insert(C::PARENT_FIELD.to_string(), Value::String(parent_id.to_string()));

        let written = {
            let _busy = self.in_flight.enter();
            self.records
                .upsert(C::TABLE, vec![row], &[C::PARENT_FIELD, DOCUMENT_TYPE_FIELD])
                .await
        };
        let written = match written {
            Ok(rows) => rows,
            Err(e) => {
                warn!(
                    bucket = %self.bucket,
                    key = %key,
                    error = %e,
                    "Metadata write failed after upload; blob left without a record"
                );
                return Err(e);
            }
        };

        match self.load(parent_id).await {
            Ok(documents) => documents
                .into_iter()
                .find(|document| document.document_type == document_type.as_str())
                .ok_or_else(|| {
                    AppError::not_found(format!(
                        "Uploaded {} is not visible after refresh",
                        document_type.label()
                    ))
                }),
            // Shut down mid-refresh: the write stands, so return what was written.
            Err(e) if e.is_cancelled() => {
                debug!(table = C::TABLE, %parent_id, "Refresh after upload cancelled");
                let row = written.into_iter().next().ok_or_else(|| {
                    AppError::database(format!("upsert on '{}' returned no row", C::TABLE))
                })?;
                from_row(rename(row, C::PARENT_FIELD, PARENT_ID_FIELD))
            }
            Err(e) => Err(e),
        }
    }

    async fn try_delete(&self, ctx: &RequestContext, document_id: DocumentId) -> AppResult<()> {
        ctx.require_user()?;
        let id = document_id.to_string();

        let rows = {
            let _busy = self.in_flight.enter();
            self.records
                .select(
                    C::TABLE,
                    &SelectQuery::new().filter(FilterField::eq(ID_FIELD, id.as_str())),
                )
                .await?
        };
        let row = rows.into_iter().next().ok_or_else(|| {
            AppError::not_found(format!("{} {document_id} not found", C::LABEL))
        })?;
        let document: Document = from_row(rename(row, C::PARENT_FIELD, PARENT_ID_FIELD))?;

        {
            let _busy = self.in_flight.enter();
            self.records.delete(C::TABLE, &id).await?;
            if let Some(key) = &document.storage_key {
                self.blobs.remove(&self.bucket, std::slice::from_ref(key)).await?;
            }
        }

        match self.load(document.parent_id).await {
            Err(e) if !e.is_cancelled() => Err(e),
            _ => Ok(()),
        }
    }

    /// Reject empty, oversized and disallowed files before any remote call.
    fn check_payload(&self, request: &UploadRequest<C::Kind>) -> AppResult<String> {
        if request.file_name.trim().is_empty() {
            return Err(AppError::validation("File name is required"));
        }
        if request.data.is_empty() {
            return Err(AppError::validation("File is empty"));
        }
        if request.data.len() as u64 > self.limits.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.limits.max_upload_size_bytes
            )));
        }

        let content_type = request
            .content_type
            .clone()
            .or_else(|| mime_from_name(&request.file_name).map(str::to_string))
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
        if !self.limits.accepts(&content_type) {
            return Err(AppError::validation(format!(
                "File type '{content_type}' is not accepted"
            )));
        }
        Ok(content_type)
    }

    /// Fetch a parent's documents and apply them if no newer fetch landed.
    async fn load(&self, parent_id: Uuid) -> AppResult<Vec<Document>> {
        let query = SelectQuery::new()
            .filter(FilterField::eq(C::PARENT_FIELD, parent_id))
            .order_by(SortField::desc(UPLOADED_AT_FIELD));

        let ticket = self.sequence.issue();
        let _busy = self.in_flight.enter();

        let rows = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Err(Self::cancelled()),
            rows = self.records.select(C::TABLE, &query) => rows?,
        };
        if self.shutdown.is_cancelled() {
            return Err(Self::cancelled());
        }

        let documents = rows
            .into_iter()
            .map(|row| from_row::<Document>(rename(row, C::PARENT_FIELD, PARENT_ID_FIELD)))
            .collect::<AppResult<Vec<_>>>()?;

        let applied = self
            .snapshots_mut()
            .entry(parent_id)
            .or_default()
            .replace_if_newer(ticket, ParentDocuments::new(documents.clone()));
        if applied {
            debug!(table = C::TABLE, %parent_id, ticket, count = documents.len(), "Documents refreshed");
        } else {
            debug!(table = C::TABLE, %parent_id, ticket, "Discarded stale document response");
        }
        Ok(documents)
    }

    fn cancelled() -> AppError {
        AppError::cancelled(format!("{} tracker was shut down", C::LABEL))
    }

    fn report_failure(&self, title: String, err: AppError) -> AppError {
        if err.is_cancelled() {
            debug!(table = C::TABLE, "Document operation cancelled");
            return err;
        }
        warn!(
            table = C::TABLE,
            kind = %err.kind,
            error = %err.message,
            "Document operation failed"
        );
        self.notifier
            .notify(Notification::error(title, err.message.clone()));
        err
    }

    fn snapshots(&self) -> RwLockReadGuard<'_, HashMap<Uuid, Versioned<ParentDocuments>>> {
        self.snapshots
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn snapshots_mut(&self) -> RwLockWriteGuard<'_, HashMap<Uuid, Versioned<ParentDocuments>>> {
        self.snapshots
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Move a column to another name, leaving the row otherwise untouched.
fn rename(mut row: Row, from: &str, to: &str) -> Row {
    if let Some(value) = row.remove(from) {
        row.insert(to.to_string(), value);
    }
    row
}
