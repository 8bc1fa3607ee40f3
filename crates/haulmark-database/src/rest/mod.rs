//! Client for the hosted PostgREST-style record API.

pub mod client;
pub mod query;

pub use client::RestRecordStore;
