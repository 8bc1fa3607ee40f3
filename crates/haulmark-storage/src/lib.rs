//! # haulmark-storage
//!
//! [`BlobStore`](haulmark_core::traits::BlobStore) providers for uploaded
//! documents, plus the storage-key scheme shared by all of them.

pub mod factory;
pub mod keys;
pub mod providers;

pub use factory::create_blob_store;
pub use providers::{LocalBlobStore, MemoryBlobStore, RestBlobStore};
