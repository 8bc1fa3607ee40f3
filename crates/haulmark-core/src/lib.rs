//! # haulmark-core
//!
//! Core crate for Haulmark. Contains the record store, blob store and
//! notification seams, configuration schemas, typed identifiers,
//! filter/sort/query types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Haulmark crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
