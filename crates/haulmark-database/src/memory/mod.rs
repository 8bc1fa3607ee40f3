//! In-process record store.

pub mod matcher;
pub mod policy;
pub mod store;

pub use policy::{OwnerRule, StorePolicy};
pub use store::MemoryRecordStore;
