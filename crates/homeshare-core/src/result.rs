//! Convenience result type alias for Homeshare.

use crate::error::AppError;

/// A specialized `Result` type for Homeshare operations.
pub type AppResult<T> = Result<T, AppError>;
