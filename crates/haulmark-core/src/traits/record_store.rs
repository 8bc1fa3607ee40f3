//! Record store trait for the hosted relational backend.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::query::{Row, SelectQuery};

/// Access to named collections of untyped rows.
///
/// Authorization is entirely the store's concern: a handle is bound to a
/// caller when it is constructed, and the store decides which rows that
/// caller may see or change. Implementations live in `haulmark-database`.
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g., "rest", "memory").
    fn backend_type(&self) -> &str;

    /// Check whether the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Return every visible row of `table` matching the query.
    async fn select(&self, table: &str, query: &SelectQuery) -> AppResult<Vec<Row>>;

    /// Insert rows and return them as stored (with server-assigned fields).
    async fn insert(&self, table: &str, rows: Vec<Row>) -> AppResult<Vec<Row>>;

    /// Insert rows, replacing any existing row that collides on the
    /// `on_conflict` columns.
    async fn upsert(&self, table: &str, rows: Vec<Row>, on_conflict: &[&str])
    -> AppResult<Vec<Row>>;

    /// Apply a partial update to the row with the given id and return it.
    async fn update(&self, table: &str, id: &str, fields: Row) -> AppResult<Row>;

    /// Delete the row with the given id.
    async fn delete(&self, table: &str, id: &str) -> AppResult<()>;
}
