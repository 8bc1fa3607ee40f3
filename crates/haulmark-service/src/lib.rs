//! # haulmark-service
//!
//! Service layer for Haulmark. Services orchestrate the record store, the
//! blob store and the notification sink to implement marketplace use cases.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time via `Arc` references, and the acting caller is passed
//! explicitly as a [`RequestContext`] into every operation.

pub mod context;
pub mod documents;
pub mod entity;
pub mod fleet;
pub mod load;
pub mod notification;
mod state;
#[cfg(test)]
mod testing;

pub use context::RequestContext;
pub use documents::{DocumentIndex, DocumentTracker, UploadRequest, derive_status};
pub use entity::{EntityService, ListScope};
pub use fleet::FleetService;
pub use load::LoadService;
pub use notification::{ChannelNotifier, MemoryNotifier, TracingNotifier};
