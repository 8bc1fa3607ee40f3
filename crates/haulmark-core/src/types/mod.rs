//! Core type definitions used across the Haulmark workspace.

pub mod filter;
pub mod id;
pub mod query;
pub mod sorting;

pub use filter::{FilterField, FilterOp, FilterValue};
pub use id::*;
pub use query::{Row, SelectQuery};
pub use sorting::{SortDirection, SortField};
