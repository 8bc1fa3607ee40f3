//! Overlapping fetches and shutdown against a store whose reads are held open.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use haulmark_core::result::AppResult;
use haulmark_core::traits::{RecordStore, Severity};
use haulmark_core::types::query::to_row;
use haulmark_core::types::{Row, SelectQuery, UserId};
use haulmark_database::MemoryRecordStore;
use haulmark_entity::truck::Truck;
use haulmark_entity::user::UserRole;
use haulmark_service::{EntityService, ListScope, MemoryNotifier, RequestContext};

use crate::helpers::truck_draft;

/// Reads a snapshot immediately but holds each select's response until
/// the test releases it.
#[derive(Debug)]
struct HeldSelects {
    inner: MemoryRecordStore,
    held: Mutex<Vec<oneshot::Sender<()>>>,
}

impl HeldSelects {
    fn new(inner: MemoryRecordStore) -> Self {
        Self {
            inner,
            held: Mutex::new(Vec::new()),
        }
    }

    fn held_count(&self) -> usize {
        self.held.lock().map(|held| held.len()).unwrap_or(0)
    }

    async fn wait_for_held(&self, count: usize) {
        while self.held_count() < count {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    /// Let the select issued `nth` (0-based) respond.
    fn release(&self, nth: usize) {
        let gate = {
            let mut held = self.held.lock().unwrap();
            std::mem::replace(&mut held[nth], oneshot::channel().0)
        };
        let _ = gate.send(());
    }
}

#[async_trait]
impl RecordStore for HeldSelects {
    fn backend_type(&self) -> &str {
        "held"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn select(&self, table: &str, query: &SelectQuery) -> AppResult<Vec<Row>> {
        let rows = self.inner.select(table, query).await;
        let (tx, rx) = oneshot::channel();
        self.held.lock().unwrap().push(tx);
        let _ = rx.await;
        rows
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> AppResult<Vec<Row>> {
        self.inner.insert(table, rows).await
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Row>,
        on_conflict: &[&str],
    ) -> AppResult<Vec<Row>> {
        self.inner.upsert(table, rows, on_conflict).await
    }

    async fn update(&self, table: &str, id: &str, fields: Row) -> AppResult<Row> {
        self.inner.update(table, id, fields).await
    }

    async fn delete(&self, table: &str, id: &str) -> AppResult<()> {
        self.inner.delete(table, id).await
    }
}

fn seeded_truck_row(owner: &RequestContext) -> Row {
    let mut row = to_row(&truck_draft("UP32ZZ9999")).unwrap();
    row.insert(
        "owner_id".to_string(),
        serde_json::json!(owner.user_id.unwrap().to_string()),
    );
    row
}

#[tokio::test]
async fn test_stale_fetch_is_discarded() {
    let memory = MemoryRecordStore::with_marketplace_policy();
    let ctx = RequestContext::authenticated(UserId::new(), UserRole::FleetOwner);
    let principal = memory.as_principal(ctx.user_id);
    let store = Arc::new(HeldSelects::new(principal.clone()));
    let notifier = Arc::new(MemoryNotifier::new());
    let trucks: EntityService<Truck> =
        EntityService::with_scope(store.clone(), notifier.clone(), ListScope::Owned);

    let older = trucks.fetch_list(&ctx);
    let newer = async {
        store.wait_for_held(1).await;
        principal
            .insert("enhanced_trucks", vec![seeded_truck_row(&ctx)])
            .await
            .unwrap();
        trucks.fetch_list(&ctx).await
    };
    let controller = async {
        store.wait_for_held(2).await;
        store.release(1);
        // Give the newer response time to land before the older one.
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.release(0);
    };

    let (older, newer, ()) = tokio::join!(older, newer, controller);
    assert!(older.unwrap().is_empty());
    assert_eq!(newer.unwrap().len(), 1);

    assert_eq!(trucks.len(), 1);
    assert!(notifier.is_empty());
}

#[tokio::test]
async fn test_shutdown_cancels_fetch_quietly() {
    let memory = MemoryRecordStore::with_marketplace_policy();
    let ctx = RequestContext::authenticated(UserId::new(), UserRole::FleetOwner);
    let store = Arc::new(HeldSelects::new(memory.as_principal(ctx.user_id)));
    let notifier = Arc::new(MemoryNotifier::new());
    let trucks: EntityService<Truck> =
        EntityService::with_scope(store.clone(), notifier.clone(), ListScope::Owned);

    let fetch = trucks.fetch_list(&ctx);
    let stopper = async {
        store.wait_for_held(1).await;
        trucks.shutdown();
    };

    let (result, ()) = tokio::join!(fetch, stopper);
    assert!(result.unwrap_err().is_cancelled());
    assert!(trucks.is_empty());
    assert!(!trucks.is_loading());
    assert_eq!(notifier.count(Severity::Error), 0);
}
