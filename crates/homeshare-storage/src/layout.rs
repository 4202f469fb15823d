//! Mapping folder ids onto directories.

use std::path::PathBuf;

use homeshare_core::config::storage::StorageConfig;
use homeshare_core::error::{AppError, ErrorKind};
use homeshare_core::result::AppResult;
use homeshare_entity::folder::ROOT_FOLDER;

use crate::validation::validate_folder_id;

/// Resolves `"/"` to the upload area and any other id to a shared folder.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    upload_root: PathBuf,
    sharing_root: PathBuf,
    chunks_dir: String,
}

impl StorageLayout {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            upload_root: config.upload_root(),
            sharing_root: config.sharing_root(),
            chunks_dir: config.chunks_dir.clone(),
        }
    }

    pub fn upload_root(&self) -> &PathBuf {
        &self.upload_root
    }

    pub fn sharing_root(&self) -> &PathBuf {
        &self.sharing_root
    }

    pub fn chunks_dir(&self) -> &str {
        &self.chunks_dir
    }

    /// Directory for `folder_id`, which need not exist yet.
    pub fn folder_path(&self, folder_id: &str) -> AppResult<PathBuf> {
        validate_folder_id(folder_id)?;
        if folder_id == ROOT_FOLDER {
            Ok(self.upload_root.clone())
        } else {
            Ok(self.sharing_root.join(folder_id))
        }
    }

    /// Like [`folder_path`](Self::folder_path) but the folder must exist.
    pub async fn existing_folder(&self, folder_id: &str) -> AppResult<PathBuf> {
        let path = self.folder_path(folder_id)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => Ok(path),
            Ok(_) => Err(AppError::not_found(format!("Folder not found: {folder_id}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::not_found(format!("Folder not found: {folder_id}")))
            }
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to stat folder {folder_id}"),
                e,
            )),
        }
    }

    /// Creates the upload area and sharing root.
    pub async fn ensure_directories(&self) -> AppResult<()> {
        for dir in [&self.upload_root, &self.sharing_root] {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create directory {}", dir.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}
