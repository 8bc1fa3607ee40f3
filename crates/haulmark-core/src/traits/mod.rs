//! Core traits defined in `haulmark-core` and implemented by other crates.

pub mod blob_store;
pub mod notification;
pub mod record_store;

pub use blob_store::BlobStore;
pub use notification::{Notification, NotificationSink, Severity};
pub use record_store::RecordStore;
