//! Read-side access to published files.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use homeshare_auth::acl::require_access;
use homeshare_auth::jwt::Claims;
use homeshare_core::error::{AppError, ErrorKind};
use homeshare_core::result::AppResult;
use homeshare_entity::AccessLevel;
use homeshare_entity::folder::FileEntry;
use homeshare_storage::layout::StorageLayout;
use homeshare_storage::listing::list_files;
use homeshare_storage::lock::{LockRegistry, file_key};
use homeshare_storage::validation::validate_file_name;

/// An opened file ready to be streamed to a client.
#[derive(Debug)]
pub struct DownloadHandle {
    pub file: tokio::fs::File,
    pub size: u64,
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct FileService {
    layout: StorageLayout,
    locks: Arc<LockRegistry>,
}

impl FileService {
    pub fn new(layout: StorageLayout, locks: Arc<LockRegistry>) -> Self {
        Self { layout, locks }
    }

    /// Lists published files in a folder the caller may read.
    pub async fn list_folder(&self, claims: &Claims, folder_id: &str) -> AppResult<Vec<FileEntry>> {
        require_access(claims, folder_id, AccessLevel::Read)?;
        let dir = self.layout.existing_folder(folder_id).await?;
        list_files(&dir).await
    }

    /// Fails with a conflict while a same-named file is being assembled.
    pub async fn check_available(
        &self,
        claims: &Claims,
        folder_id: &str,
        file_name: &str,
    ) -> AppResult<()> {
        self.resolve(claims, folder_id, file_name).await.map(|_| ())
    }

    pub async fn open_download(
        &self,
        claims: &Claims,
        folder_id: &str,
        file_name: &str,
    ) -> AppResult<DownloadHandle> {
        let (path, size) = self.resolve(claims, folder_id, file_name).await?;
        let file = tokio::fs::File::open(&path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to open {file_name}"), e)
        })?;

        debug!(folder_id = %folder_id, file_name = %file_name, size, "Serving download");
        Ok(DownloadHandle {
            file,
            size,
            file_name: file_name.to_string(),
        })
    }

    async fn resolve(
        &self,
        claims: &Claims,
        folder_id: &str,
        file_name: &str,
    ) -> AppResult<(PathBuf, u64)> {
        validate_file_name(file_name)?;
        require_access(claims, folder_id, AccessLevel::Read)?;

        if self.locks.is_held(&file_key(folder_id, file_name)) {
            return Err(AppError::conflict(format!(
                "{file_name} is being written, try again shortly"
            )));
        }

        let path = self.layout.existing_folder(folder_id).await?.join(file_name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok((path, meta.len())),
            Ok(_) => Err(AppError::not_found(format!("File not found: {file_name}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::not_found(format!("File not found: {file_name}")))
            }
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to stat {file_name}"),
                e,
            )),
        }
    }
}
