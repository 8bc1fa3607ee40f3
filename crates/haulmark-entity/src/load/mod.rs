//! Freight loads posted on the marketplace.

pub mod model;
pub mod status;

pub use model::{Load, LoadPatch, NewLoad};
pub use status::LoadStatus;
