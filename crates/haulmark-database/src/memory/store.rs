//! In-memory record store using dashmap.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use haulmark_core::error::AppError;
use haulmark_core::result::AppResult;
use haulmark_core::traits::RecordStore;
use haulmark_core::types::query::{CREATED_AT_FIELD, ID_FIELD};
use haulmark_core::types::{Row, SelectQuery, UserId};

use super::matcher;
use super::policy::{OwnerRule, StorePolicy, key_of};

/// Column refreshed on every update.
const UPDATED_AT_FIELD: &str = "updated_at";

/// In-process stand-in for the hosted record store.
///
/// Assigns `id` and `created_at` on insert, enforces per-table ownership
/// rules against the handle's principal, and honours unique constraints.
/// Handles created with [`MemoryRecordStore::as_principal`] share the same
/// tables, the way several sessions share one remote database.
#[derive(Debug, Clone)]
pub struct MemoryRecordStore {
    /// Table name → rows in insertion order.
    tables: Arc<DashMap<String, Vec<Row>>>,
    /// Ownership rules and unique constraints.
    policy: Arc<StorePolicy>,
    /// The caller this handle acts for.
    principal: Option<UserId>,
    /// Number of store calls made through any handle.
    calls: Arc<AtomicU64>,
}

impl MemoryRecordStore {
    /// Create an empty store with no rules and no principal.
    pub fn new() -> Self {
        Self {
            tables: Arc::new(DashMap::new()),
            policy: Arc::new(StorePolicy::default()),
            principal: None,
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a store with the ownership rules and constraints of the hosted
    /// marketplace schema.
    pub fn with_marketplace_policy() -> Self {
        Self::new()
            .with_owner("enhanced_trucks", OwnerRule::writes("owner_id"))
            .with_owner("enhanced_drivers", OwnerRule::private("owner_id"))
            .with_owner("enhanced_loads", OwnerRule::writes("shipper_id"))
            .with_owner("kyc_documents", OwnerRule::private("user_id"))
            .with_unique("kyc_documents", &["user_id", "document_type"])
            .with_unique("load_documents", &["load_id", "document_type"])
    }

    /// Add an ownership rule. Must be called before handles are shared.
    pub fn with_owner(mut self, table: &str, rule: OwnerRule) -> Self {
        Arc::make_mut(&mut self.policy).set_owner(table, rule);
        self
    }

    /// Add a unique constraint. Must be called before handles are shared.
    pub fn with_unique(mut self, table: &str, columns: &[&str]) -> Self {
        Arc::make_mut(&mut self.policy).add_unique(table, columns);
        self
    }

    /// A handle over the same tables acting for another caller.
    pub fn as_principal(&self, principal: Option<UserId>) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            policy: Arc::clone(&self.policy),
            principal,
            calls: Arc::clone(&self.calls),
        }
    }

    /// The caller this handle acts for.
    pub fn principal(&self) -> Option<UserId> {
        self.principal
    }

    /// Total number of store calls made so far.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of rows in a table, ignoring read rules.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map(|rows| rows.len()).unwrap_or(0)
    }

    fn record_call(&self, op: &str, table: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!(op, table, principal = ?self.principal, "Memory store call");
    }

    fn now() -> Value {
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
    }

    fn stamp_new(mut row: Row) -> Row {
        if row.get(ID_FIELD).is_none_or(Value::is_null) {
            row.insert(ID_FIELD.to_string(), Value::String(Uuid::new_v4().to_string()));
        }
        if row.get(CREATED_AT_FIELD).is_none_or(Value::is_null) {
            row.insert(CREATED_AT_FIELD.to_string(), Self::now());
        }
        row
    }

    /// Position of the first row (other than `skip`) sharing a unique key with `row`.
    fn find_collision(
        &self,
        table: &str,
        rows: &[Row],
        row: &Row,
        skip: Option<usize>,
    ) -> Option<(usize, Vec<String>)> {
        for columns in self.policy.unique(table) {
            let Some(key) = key_of(row, columns) else {
                continue;
            };
            let hit = rows
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != skip)
                .find(|(_, existing)| key_of(existing, columns).as_ref() == Some(&key));
            if let Some((i, _)) = hit {
                return Some((i, columns.clone()));
            }
        }
        None
    }

    fn position_of(rows: &[Row], id: &str) -> Option<usize> {
        rows.iter()
            .position(|row| row.get(ID_FIELD).and_then(Value::as_str) == Some(id))
    }

    fn denied(&self, action: &str, table: &str) -> AppError {
        AppError::authorization(format!(
            "Policy on '{table}' does not allow {action} for this caller"
        ))
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn backend_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn select(&self, table: &str, query: &SelectQuery) -> AppResult<Vec<Row>> {
        self.record_call("select", table);
        let mut rows: Vec<Row> = match self.tables.get(table) {
            Some(rows) => rows
                .iter()
                .filter(|row| self.policy.can_read(table, row, self.principal))
                .filter(|row| matcher::matches_all(row, &query.filters))
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        if let Some(order) = &query.order {
            matcher::sort_rows(&mut rows, order);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> AppResult<Vec<Row>> {
        self.record_call("insert", table);
        let mut entry = self.tables.entry(table.to_string()).or_default();
        let mut staged = entry.clone();
        let mut inserted = Vec::with_capacity(rows.len());

        for row in rows {
            if !self.policy.can_write(table, &row, self.principal) {
                return Err(self.denied("insert", table));
            }
            let row = Self::stamp_new(row);
            if let Some((_, columns)) = self.find_collision(table, &staged, &row, None) {
                return Err(AppError::conflict(format!(
                    "Duplicate key on '{table}' ({})",
                    columns.join(", ")
                )));
            }
            staged.push(row.clone());
            inserted.push(row);
        }

        *entry = staged;
        Ok(inserted)
    }

    async fn upsert(
        &self,
        table: &str,
        rows: Vec<Row>,
        on_conflict: &[&str],
    ) -> AppResult<Vec<Row>> {
        self.record_call("upsert", table);
        let conflict_columns: Vec<String> = on_conflict.iter().map(|c| c.to_string()).collect();
        let mut entry = self.tables.entry(table.to_string()).or_default();
        let mut staged = entry.clone();
        let mut written = Vec::with_capacity(rows.len());

        for row in rows {
            if !self.policy.can_write(table, &row, self.principal) {
                return Err(self.denied("upsert", table));
            }
            let existing = key_of(&row, &conflict_columns).and_then(|key| {
                staged
                    .iter()
                    .position(|r| key_of(r, &conflict_columns).as_ref() == Some(&key))
            });

            let stored = match existing {
                Some(i) => {
                    if !self.policy.can_write(table, &staged[i], self.principal) {
                        return Err(self.denied("upsert", table));
                    }
                    let mut merged = staged[i].clone();
                    for (k, v) in row {
                        if k != ID_FIELD && k != CREATED_AT_FIELD {
                            merged.insert(k, v);
                        }
                    }
                    merged.insert(UPDATED_AT_FIELD.to_string(), Self::now());
                    if self.find_collision(table, &staged, &merged, Some(i)).is_some() {
                        return Err(AppError::conflict(format!("Duplicate key on '{table}'")));
                    }
                    staged[i] = merged.clone();
                    merged
                }
                None => {
                    let row = Self::stamp_new(row);
                    if self.find_collision(table, &staged, &row, None).is_some() {
                        return Err(AppError::conflict(format!("Duplicate key on '{table}'")));
                    }
                    staged.push(row.clone());
                    row
                }
            };
            written.push(stored);
        }

        *entry = staged;
        Ok(written)
    }

    async fn update(&self, table: &str, id: &str, fields: Row) -> AppResult<Row> {
        self.record_call("update", table);
        let mut rows = self
            .tables
            .get_mut(table)
            .ok_or_else(|| AppError::not_found(format!("No row '{id}' in '{table}'")))?;

        let index = Self::position_of(&rows, id)
            .filter(|i| self.policy.can_read(table, &rows[*i], self.principal))
            .ok_or_else(|| AppError::not_found(format!("No row '{id}' in '{table}'")))?;

        if !self.policy.can_write(table, &rows[index], self.principal) {
            return Err(self.denied("update", table));
        }

        let mut updated = rows[index].clone();
        for (k, v) in fields {
            if k != ID_FIELD {
                updated.insert(k, v);
            }
        }
        updated.insert(UPDATED_AT_FIELD.to_string(), Self::now());

        // The new values must still belong to the caller.
        if !self.policy.can_write(table, &updated, self.principal) {
            return Err(self.denied("update", table));
        }
        if self.find_collision(table, &rows, &updated, Some(index)).is_some() {
            return Err(AppError::conflict(format!("Duplicate key on '{table}'")));
        }

        rows[index] = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, table: &str, id: &str) -> AppResult<()> {
        self.record_call("delete", table);
        let mut rows = self
            .tables
            .get_mut(table)
            .ok_or_else(|| AppError::not_found(format!("No row '{id}' in '{table}'")))?;

        let index = Self::position_of(&rows, id)
            .filter(|i| self.policy.can_read(table, &rows[*i], self.principal))
            .ok_or_else(|| AppError::not_found(format!("No row '{id}' in '{table}'")))?;

        if !self.policy.can_write(table, &rows[index], self.principal) {
            return Err(self.denied("delete", table));
        }

        rows.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haulmark_core::error::ErrorKind;
    use haulmark_core::types::{FilterField, SortField};
    use serde_json::json;

    fn truck(owner: UserId, plate: &str) -> Row {
        let mut row = Row::new();
        row.insert("owner_id".into(), json!(owner.to_string()));
        row.insert("registration_number".into(), json!(plate));
        row
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_created_at() {
        let owner = UserId::new();
        let store = MemoryRecordStore::with_marketplace_policy().as_principal(Some(owner));

        let rows = store
            .insert("enhanced_trucks", vec![truck(owner, "MH12AB1234")])
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert!(rows[0].get("id").and_then(Value::as_str).is_some());
        assert!(rows[0].get("created_at").and_then(Value::as_str).is_some());
        assert_eq!(store.row_count("enhanced_trucks"), 1);
    }

    #[tokio::test]
    async fn test_select_on_missing_table_is_empty() {
        let store = MemoryRecordStore::new();
        let rows = store
            .select("enhanced_loads", &SelectQuery::new())
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_select_filters_and_orders() {
        let owner = UserId::new();
        let store = MemoryRecordStore::new().as_principal(Some(owner));
        for plate in ["A1", "B2", "C3"] {
            store
                .insert("enhanced_trucks", vec![truck(owner, plate)])
                .await
                .unwrap();
        }

        let rows = store
            .select(
                "enhanced_trucks",
                &SelectQuery::new().order_by(SortField::desc("registration_number")),
            )
            .await
            .unwrap();
        let plates: Vec<_> = rows
            .iter()
            .map(|r| r["registration_number"].as_str().unwrap())
            .collect();
        assert_eq!(plates, vec!["C3", "B2", "A1"]);

        let rows = store
            .select(
                "enhanced_trucks",
                &SelectQuery::new().filter(FilterField::eq("registration_number", "B2")),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_denied() {
        let owner = UserId::new();
        let store = MemoryRecordStore::with_marketplace_policy();
        let as_owner = store.as_principal(Some(owner));
        let rows = as_owner
            .insert("enhanced_trucks", vec![truck(owner, "KA01XY9999")])
            .await
            .unwrap();
        let id = rows[0]["id"].as_str().unwrap().to_string();

        let stranger = store.as_principal(Some(UserId::new()));
        let mut fields = Row::new();
        fields.insert("status".into(), json!("inactive"));
        let err = stranger
            .update("enhanced_trucks", &id, fields.clone())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let updated = as_owner
            .update("enhanced_trucks", &id, fields)
            .await
            .unwrap();
        assert_eq!(updated["status"], json!("inactive"));
        assert!(updated.contains_key("updated_at"));
    }

    #[tokio::test]
    async fn test_insert_for_someone_else_is_denied() {
        let store = MemoryRecordStore::with_marketplace_policy().as_principal(Some(UserId::new()));
        let err = store
            .insert("enhanced_trucks", vec![truck(UserId::new(), "GJ05ZZ0001")])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert_eq!(store.row_count("enhanced_trucks"), 0);
    }

    #[tokio::test]
    async fn test_private_rows_are_invisible_to_others() {
        let owner = UserId::new();
        let store = MemoryRecordStore::with_marketplace_policy();
        let mut row = Row::new();
        row.insert("user_id".into(), json!(owner.to_string()));
        row.insert("document_type".into(), json!("pan_card"));
        store
            .as_principal(Some(owner))
            .insert("kyc_documents", vec![row])
            .await
            .unwrap();

        let others = store
            .as_principal(Some(UserId::new()))
            .select("kyc_documents", &SelectQuery::new())
            .await
            .unwrap();
        assert!(others.is_empty());
    }

    #[tokio::test]
    async fn test_unique_constraint_and_upsert() {
        let owner = UserId::new();
        let store = MemoryRecordStore::with_marketplace_policy().as_principal(Some(owner));
        let doc = |url: &str| {
            let mut row = Row::new();
            row.insert("user_id".into(), json!(owner.to_string()));
            row.insert("document_type".into(), json!("pan_card"));
            row.insert("file_url".into(), json!(url));
            row
        };

        store
            .insert("kyc_documents", vec![doc("https://a")])
            .await
            .unwrap();
        let err = store
            .insert("kyc_documents", vec![doc("https://b")])
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let written = store
            .upsert(
                "kyc_documents",
                vec![doc("https://c")],
                &["user_id", "document_type"],
            )
            .await
            .unwrap();
        assert_eq!(written[0]["file_url"], json!("https://c"));
        assert_eq!(store.row_count("kyc_documents"), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_row_is_not_found() {
        let store = MemoryRecordStore::new();
        let err = store
            .delete("enhanced_loads", &Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_call_count_is_shared_between_handles() {
        let store = MemoryRecordStore::new();
        let other = store.as_principal(Some(UserId::new()));
        store
            .select("enhanced_loads", &SelectQuery::new())
            .await
            .unwrap();
        other
            .select("enhanced_loads", &SelectQuery::new())
            .await
            .unwrap();
        assert_eq!(store.call_count(), 2);
    }
}
