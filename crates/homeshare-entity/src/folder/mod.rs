//! Folder listing value objects.

use serde::{Deserialize, Serialize};

/// Identifier of the root folder scope.
pub const ROOT_FOLDER: &str = "/";

/// One non-directory entry of a listed folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name without its extension.
    pub file_name: String,
    /// Extension including the leading dot, or empty.
    pub file_extension: String,
    pub file_size_bytes: u64,
}
