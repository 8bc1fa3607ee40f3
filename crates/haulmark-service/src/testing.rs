//! Test doubles shared by the service unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use haulmark_core::error::AppError;
use haulmark_core::result::AppResult;
use haulmark_core::traits::RecordStore;
use haulmark_core::types::{Row, SelectQuery};

/// Select calls wait for rows sent through a oneshot, in call order.
/// Writes succeed at once and echo their rows back.
#[derive(Debug, Default)]
pub struct GatedStore {
    gates: Mutex<VecDeque<oneshot::Receiver<Vec<Row>>>>,
    selects: AtomicUsize,
}

impl GatedStore {
    /// Queue the response for the next unanswered select.
    pub fn gate(&self) -> oneshot::Sender<Vec<Row>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    /// Wait until `n` selects have been issued.
    pub async fn wait_for_selects(&self, n: usize) {
        while self.selects.load(Ordering::SeqCst) < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl RecordStore for GatedStore {
    fn backend_type(&self) -> &str {
        "gated"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn select(&self, _table: &str, _query: &SelectQuery) -> AppResult<Vec<Row>> {
        let gate = self.gates.lock().unwrap().pop_front();
        self.selects.fetch_add(1, Ordering::SeqCst);
        match gate {
            Some(rx) => rx.await.map_err(|_| AppError::database("gate dropped")),
            None => Ok(Vec::new()),
        }
    }

    async fn insert(&self, _table: &str, rows: Vec<Row>) -> AppResult<Vec<Row>> {
        Ok(rows.into_iter().map(with_id).collect())
    }

    async fn upsert(&self, _table: &str, rows: Vec<Row>, _: &[&str]) -> AppResult<Vec<Row>> {
        Ok(rows.into_iter().map(with_id).collect())
    }

    async fn update(&self, _table: &str, id: &str, mut fields: Row) -> AppResult<Row> {
        fields.insert("id".to_string(), Value::String(id.to_string()));
        Ok(fields)
    }

    async fn delete(&self, _table: &str, _id: &str) -> AppResult<()> {
        Ok(())
    }
}

fn with_id(mut row: Row) -> Row {
    row.entry("id".to_string())
        .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
    row
}
