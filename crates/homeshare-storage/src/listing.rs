//! Folder listings.

use std::path::Path;

use homeshare_core::error::{AppError, ErrorKind};
use homeshare_core::result::AppResult;
use homeshare_entity::folder::FileEntry;

/// Lists the regular files directly inside `dir`, sorted by name.
///
/// Subdirectories, including chunk staging areas, are not listed.
pub async fn list_files(dir: &Path) -> AppResult<Vec<FileEntry>> {
    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            AppError::not_found(format!("Folder not found: {}", dir.display()))
        } else {
            AppError::with_source(ErrorKind::Storage, "Failed to read folder", e)
        }
    })?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if metadata.is_dir() {
            continue;
        }

        let path = entry.path();
        let file_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        files.push(FileEntry {
            file_name,
            file_extension,
            file_size_bytes: metadata.len(),
        });
    }

    files.sort_by(|a, b| {
        (a.file_name.as_str(), a.file_extension.as_str())
            .cmp(&(b.file_name.as_str(), b.file_extension.as_str()))
    });
    Ok(files)
}
