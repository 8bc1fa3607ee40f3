//! Document upload and review-status tracking.

pub mod status;
pub mod tracker;

pub use status::{DocumentIndex, derive_status};
pub use tracker::{DocumentTracker, UploadRequest};
