//! Entity service: list, create, update and delete one record type.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use validator::Validate;

use haulmark_core::error::AppError;
use haulmark_core::result::AppResult;
use haulmark_core::traits::{Notification, NotificationSink, RecordStore};
use haulmark_core::types::query::{CREATED_AT_FIELD, from_row, to_row};
use haulmark_core::types::{Row, SelectQuery, SortField};
use haulmark_entity::Entity;

use super::scope::ListScope;
use crate::context::RequestContext;
use crate::state::{FetchSequence, InFlight, Versioned};

/// Operations reported to the notification sink.
#[derive(Debug, Clone, Copy)]
enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn verb(self) -> &'static str {
        match self {
            Self::Fetch => "load",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            Self::Fetch => "loaded",
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }
}

/// CRUD façade over one collection with a locally cached, newest-first list.
///
/// Every mutation is followed by a full refresh of the list; there is no
/// optimistic local patching. Each fetch takes a ticket and a response is
/// applied only if no newer fetch has been applied already, so overlapping
/// fetches settle on the most recently issued one.
///
/// Failures are logged, reported once to the notification sink and returned.
/// Successful mutations report once; fetches only report failures.
pub struct EntityService<E: Entity> {
    /// Remote record store bound to the caller.
    store: Arc<dyn RecordStore>,
    /// User-facing message channel.
    notifier: Arc<dyn NotificationSink>,
    /// Which rows the list holds.
    scope: ListScope,
    /// Last applied list.
    cache: RwLock<Versioned<Vec<E>>>,
    /// Fetch ticket source.
    sequence: FetchSequence,
    /// Operations awaiting the store.
    in_flight: InFlight,
    /// Cancelled by [`EntityService::shutdown`].
    shutdown: CancellationToken,
}

impl<E: Entity> std::fmt::Debug for EntityService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityService")
            .field("table", &E::TABLE)
            .field("scope", &self.scope)
            .field("backend", &self.store.backend_type())
            .finish()
    }
}

impl<E: Entity> EntityService<E> {
    /// Creates a service listing every row visible to the caller.
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self::with_scope(store, notifier, ListScope::Visible)
    }

    /// Creates a service with an explicit list scope.
    pub fn with_scope(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn NotificationSink>,
        scope: ListScope,
    ) -> Self {
        Self {
            store,
            notifier,
            scope,
            cache: RwLock::new(Versioned::default()),
            sequence: FetchSequence::default(),
            in_flight: InFlight::default(),
            shutdown: CancellationToken::new(),
        }
    }

    /// The list scope.
    pub fn scope(&self) -> &ListScope {
        &self.scope
    }

    /// Fetches the list, newest first, and replaces the cache.
    ///
    /// An empty collection yields an empty `Vec`. On failure the cache is
    /// left as it was.
    pub async fn fetch_list(&self, ctx: &RequestContext) -> AppResult<Vec<E>> {
        match self.load(ctx).await {
            Ok(records) => Ok(records),
            Err(e) => Err(self.report_failure(Operation::Fetch, e)),
        }
    }

    /// Creates a record owned by the caller, refreshes, and returns it.
    pub async fn create(&self, ctx: &RequestContext, draft: &E::Draft) -> AppResult<E> {
        match self.try_create(ctx, draft).await {
            Ok(record) => {
                let id = record.id();
                info!(table = E::TABLE, %id, "Record created");
                self.report_success(Operation::Create, &id);
                Ok(record)
            }
            Err(e) => Err(self.report_failure(Operation::Create, e)),
        }
    }

    /// Applies a partial update, refreshes, and returns the record.
    ///
    /// Last write wins; there is no version check.
    pub async fn update<P>(&self, ctx: &RequestContext, id: E::Id, patch: &P) -> AppResult<E>
    where
        P: Serialize + Sync,
    {
        match self.try_update(ctx, id, patch).await {
            Ok(record) => {
                info!(table = E::TABLE, %id, "Record updated");
                self.report_success(Operation::Update, &id);
                Ok(record)
            }
            Err(e) => Err(self.report_failure(Operation::Update, e)),
        }
    }

    /// Deletes a record and refreshes.
    pub async fn delete(&self, ctx: &RequestContext, id: E::Id) -> AppResult<()> {
        match self.try_delete(ctx, id).await {
            Ok(()) => {
                info!(table = E::TABLE, %id, "Record deleted");
                self.report_success(Operation::Delete, &id);
                Ok(())
            }
            Err(e) => Err(self.report_failure(Operation::Delete, e)),
        }
    }

    /// Snapshot of the cached list.
    pub fn records(&self) -> Vec<E> {
        self.cache().get().clone()
    }

    /// A cached record by id.
    pub fn get(&self, id: E::Id) -> Option<E> {
        self.cache().get().iter().find(|r| r.id() == id).cloned()
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.cache().get().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache().get().is_empty()
    }

    /// Whether any operation is waiting on the store.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_active()
    }

    /// Cancels in-flight fetches. Their results are never applied.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Whether [`EntityService::shutdown`] has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    async fn try_create(&self, ctx: &RequestContext, draft: &E::Draft) -> AppResult<E> {
        let user = ctx.require_user()?;
        draft.validate()?;

        let mut row = to_row(draft)?;
        row.insert(E::OWNER_FIELD.to_string(), Value::String(user.to_string()));

        let inserted = {
            let _busy = self.in_flight.enter();
            self.store.insert(E::TABLE, vec![row]).await?
        };
        let created: E = Self::first_record(inserted, "insert")?;

        self.refresh_after_write(ctx).await?;
        Ok(self.get(created.id()).unwrap_or(created))
    }

    async fn try_update<P>(&self, ctx: &RequestContext, id: E::Id, patch: &P) -> AppResult<E>
    where
        P: Serialize + Sync,
    {
        ctx.require_user()?;
        let fields = to_row(patch)?;
        if fields.is_empty() {
            return Err(AppError::validation(format!(
                "Nothing to update on {} {id}",
                E::LABEL
            )));
        }

        let row = {
            let _busy = self.in_flight.enter();
            self.store.update(E::TABLE, &id.to_string(), fields).await?
        };
        let updated: E = from_row(row)?;

        self.refresh_after_write(ctx).await?;
        Ok(self.get(id).unwrap_or(updated))
    }

    async fn try_delete(&self, ctx: &RequestContext, id: E::Id) -> AppResult<()> {
        ctx.require_user()?;
        {
            let _busy = self.in_flight.enter();
            self.store.delete(E::TABLE, &id.to_string()).await?;
        }
        self.refresh_after_write(ctx).await?;
        Ok(())
    }

    /// Refresh once a write has landed. A shutdown during the refresh leaves
    /// the write standing, so the mutation still reports its outcome.
    async fn refresh_after_write(&self, ctx: &RequestContext) -> AppResult<()> {
        match self.load(ctx).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_cancelled() => {
                debug!(table = E::TABLE, "Refresh after write cancelled");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch the scoped list and apply it if no newer fetch already landed.
    async fn load(&self, ctx: &RequestContext) -> AppResult<Vec<E>> {
        let query = SelectQuery::new()
            .filters(self.scope.filters(ctx, E::OWNER_FIELD)?)
            .order_by(SortField::desc(CREATED_AT_FIELD));

        let ticket = self.sequence.issue();
        let _busy = self.in_flight.enter();

        let rows = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Err(Self::cancelled()),
            rows = self.store.select(E::TABLE, &query) => rows?,
        };
        if self.shutdown.is_cancelled() {
            return Err(Self::cancelled());
        }

        let records = rows
            .into_iter()
            .map(from_row::<E>)
            .collect::<AppResult<Vec<E>>>()?;

        if self.cache_mut().replace_if_newer(ticket, records.clone()) {
            debug!(table = E::TABLE, ticket, count = records.len(), "List refreshed");
        } else {
            debug!(table = E::TABLE, ticket, "Discarded stale list response");
        }
        Ok(records)
    }

    fn first_record(rows: Vec<Row>, op: &str) -> AppResult<E> {
        let row = rows.into_iter().next().ok_or_else(|| {
            AppError::database(format!("{op} on '{}' returned no row", E::TABLE))
        })?;
        from_row(row)
    }

    fn cancelled() -> AppError {
        AppError::cancelled(format!("{} service was shut down", E::LABEL))
    }

    fn report_success(&self, op: Operation, id: &E::Id) {
        self.notifier.notify(Notification::success(
            format!("{} {}", E::LABEL, op.past_tense()),
            format!("{} {id} was {}.", E::LABEL, op.past_tense()),
        ));
    }

    /// Log and report a failure, then hand the error back for returning.
    fn report_failure(&self, op: Operation, err: AppError) -> AppError {
        if err.is_cancelled() {
            debug!(table = E::TABLE, op = op.verb(), "Operation cancelled");
            return err;
        }
        warn!(
            table = E::TABLE,
            op = op.verb(),
            kind = %err.kind,
            error = %err.message,
            "Entity operation failed"
        );
        let title = match op {
            Operation::Fetch => format!("Failed to load {} records", E::LABEL.to_lowercase()),
            _ => format!("Failed to {} {}", op.verb(), E::LABEL.to_lowercase()),
        };
        self.notifier
            .notify(Notification::error(title, err.message.clone()));
        err
    }

    fn cache(&self) -> RwLockReadGuard<'_, Versioned<Vec<E>>> {
        self.cache.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cache_mut(&self) -> RwLockWriteGuard<'_, Versioned<Vec<E>>> {
        self.cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
