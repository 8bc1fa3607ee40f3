//! # haulmark-database
//!
//! [`RecordStore`](haulmark_core::traits::RecordStore) backends: a client for
//! the hosted PostgREST-style API and an in-process store that mimics its
//! row-level policies for tests and offline use.

pub mod connection;
pub mod memory;
pub mod rest;

pub use connection::connect;
pub use memory::{MemoryRecordStore, OwnerRule};
pub use rest::RestRecordStore;
