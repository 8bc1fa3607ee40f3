//! Convenience result type alias for Haulmark.

use crate::error::AppError;

/// A specialized `Result` type for Haulmark operations.
pub type AppResult<T> = Result<T, AppError>;
