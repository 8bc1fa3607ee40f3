//! Binding between a record type and its remote collection.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;
use validator::Validate;

use haulmark_core::types::UserId;

/// A record type stored in a named remote collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// Server-assigned identifier type.
    type Id: Copy + Eq + Hash + Display + FromStr + Debug + Send + Sync + 'static;
    /// Fields supplied by the caller when creating a record.
    type Draft: Serialize + Validate + Debug + Send + Sync;

    /// Collection name in the remote store.
    const TABLE: &'static str;
    /// Column stamped with the creating caller's id.
    const OWNER_FIELD: &'static str;
    /// Human-readable singular name used in notifications.
    const LABEL: &'static str;

    /// The record's identifier.
    fn id(&self) -> Self::Id;

    /// The owning user, when the store returned it.
    fn owner_id(&self) -> Option<UserId>;
}
