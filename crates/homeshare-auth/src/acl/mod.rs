//! Folder-scoped access evaluation.

pub mod evaluator;

pub use evaluator::{has_access, require_access};
