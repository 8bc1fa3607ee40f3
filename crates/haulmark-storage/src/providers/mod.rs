//! Blob storage provider implementations.

pub mod local;
pub mod memory;
pub mod rest;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use rest::RestBlobStore;
