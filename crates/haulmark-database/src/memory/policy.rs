//! Row-level rules enforced by the in-memory store.

use std::collections::HashMap;

use serde_json::Value;

use haulmark_core::types::{Row, UserId};

/// Ownership rule for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRule {
    /// Column holding the owning user id.
    pub column: String,
    /// Whether only the owner may read rows (otherwise reads are public).
    pub private_reads: bool,
}

impl OwnerRule {
    /// Owner-only writes, public reads.
    pub fn writes(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            private_reads: false,
        }
    }

    /// Owner-only reads and writes.
    pub fn private(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            private_reads: true,
        }
    }

    /// Whether `principal` owns `row`.
    pub fn is_owner(&self, row: &Row, principal: Option<UserId>) -> bool {
        match (principal, row.get(&self.column)) {
            (Some(user), Some(Value::String(owner))) => owner == &user.to_string(),
            _ => false,
        }
    }
}

/// Table rules: ownership and unique constraints.
#[derive(Debug, Clone, Default)]
pub struct StorePolicy {
    owners: HashMap<String, OwnerRule>,
    unique: HashMap<String, Vec<Vec<String>>>,
}

impl StorePolicy {
    /// Register an ownership rule for a table.
    pub fn set_owner(&mut self, table: &str, rule: OwnerRule) {
        self.owners.insert(table.to_string(), rule);
    }

    /// Register a unique constraint over `columns`.
    pub fn add_unique(&mut self, table: &str, columns: &[&str]) {
        self.unique
            .entry(table.to_string())
            .or_default()
            .push(columns.iter().map(|c| c.to_string()).collect());
    }

    /// Ownership rule for a table, if any.
    pub fn owner(&self, table: &str) -> Option<&OwnerRule> {
        self.owners.get(table)
    }

    /// Unique constraints of a table.
    pub fn unique(&self, table: &str) -> &[Vec<String>] {
        self.unique.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `principal` may read `row`.
    pub fn can_read(&self, table: &str, row: &Row, principal: Option<UserId>) -> bool {
        match self.owner(table) {
            Some(rule) if rule.private_reads => rule.is_owner(row, principal),
            _ => true,
        }
    }

    /// Whether `principal` may insert, change or delete `row`.
    pub fn can_write(&self, table: &str, row: &Row, principal: Option<UserId>) -> bool {
        match self.owner(table) {
            Some(rule) => rule.is_owner(row, principal),
            None => true,
        }
    }
}

/// Values of `columns` in `row`, or `None` when any is missing or null.
///
/// Rows with a null in a constrained column never collide, as in SQL.
pub fn key_of(row: &Row, columns: &[String]) -> Option<Vec<Value>> {
    columns
        .iter()
        .map(|column| match row.get(column) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value.clone()),
        })
        .collect()
}
