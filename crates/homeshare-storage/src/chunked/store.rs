//! On-disk chunk staging for in-flight transfers.
//!
//! Each transfer stages its chunks in `<dest>/<chunks_dir>/<transfer_id>/`
//! as `chunk_<index>`. Distinct transfer ids never share a staging
//! directory, so chunk writes need no locking.

use std::path::{Path, PathBuf};
use std::time::Duration;

use uuid::Uuid;

use homeshare_core::error::{AppError, ErrorKind};
use homeshare_core::result::AppResult;

const CHUNK_PREFIX: &str = "chunk_";
const PARTIAL_SUFFIX: &str = ".part";

/// A validated `(index, total)` pair with `0 <= index < total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPosition {
    index: u32,
    total: u32,
}

impl ChunkPosition {
    pub fn new(index: i64, total: i64) -> AppResult<Self> {
        if total <= 0 {
            return Err(AppError::validation(format!(
                "total chunks must be positive, got {total}"
            )));
        }
        if index < 0 || index >= total {
            return Err(AppError::validation(format!(
                "chunk index {index} out of range 0..{total}"
            )));
        }
        let total = u32::try_from(total)
            .map_err(|_| AppError::validation(format!("total chunks too large: {total}")))?;
        Ok(Self {
            index: index as u32,
            total,
        })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn total(&self) -> u32 {
        self.total
    }
}

/// Writes and counts staged chunks.
#[derive(Debug, Clone)]
pub struct ChunkStore {
    chunks_dir: String,
}

impl ChunkStore {
    pub fn new(chunks_dir: impl Into<String>) -> Self {
        Self {
            chunks_dir: chunks_dir.into(),
        }
    }

    /// Staging directory for one transfer under `dest`.
    pub fn staging_dir(&self, dest: &Path, transfer_id: Uuid) -> PathBuf {
        dest.join(&self.chunks_dir).join(transfer_id.to_string())
    }

    pub fn chunk_path(&self, dest: &Path, transfer_id: Uuid, index: u32) -> PathBuf {
        self.staging_dir(dest, transfer_id)
            .join(format!("{CHUNK_PREFIX}{index}"))
    }

    /// Persists one chunk and returns how many chunks are now staged.
    ///
    /// The chunk is written under a temporary name and renamed into place,
    /// so a concurrent count never sees a half-written chunk. Re-sending
    /// a chunk overwrites it without changing the count.
    pub async fn accept_chunk(
        &self,
        dest: &Path,
        transfer_id: Uuid,
        position: ChunkPosition,
        data: &[u8],
    ) -> AppResult<u32> {
        let staging = self.staging_dir(dest, transfer_id);
        tokio::fs::create_dir_all(&staging).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to create chunk staging dir", e)
        })?;

        let final_path = self.chunk_path(dest, transfer_id, position.index());
        let partial_path = staging.join(format!(
            "{CHUNK_PREFIX}{}{PARTIAL_SUFFIX}",
            position.index()
        ));

        tokio::fs::write(&partial_path, data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to write chunk", e)
        })?;
        tokio::fs::rename(&partial_path, &final_path)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to commit chunk", e))?;

        tracing::debug!(
            transfer_id = %transfer_id,
            chunk_index = position.index(),
            total_chunks = position.total(),
            bytes = data.len(),
            "Chunk staged"
        );

        self.received_count(dest, transfer_id).await
    }

    /// Number of fully written chunks staged for a transfer.
    pub async fn received_count(&self, dest: &Path, transfer_id: Uuid) -> AppResult<u32> {
        let staging = self.staging_dir(dest, transfer_id);
        let mut entries = match tokio::fs::read_dir(&staging).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    "Failed to read chunk staging dir",
                    e,
                ));
            }
        };

        let mut count = 0;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with(CHUNK_PREFIX) && !name.ends_with(PARTIAL_SUFFIX) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Removes a transfer's staging directory if it exists.
    pub async fn discard(&self, dest: &Path, transfer_id: Uuid) -> AppResult<()> {
        match tokio::fs::remove_dir_all(self.staging_dir(dest, transfer_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                "Failed to remove chunk staging dir",
                e,
            )),
        }
    }

    /// Removes staging directories under `dest` that have not changed for
    /// `max_age` and whose transfer `is_active` does not claim.
    ///
    /// Catches transfers whose client gave up and chunks re-sent after
    /// assembly already cleaned up. Returns the number removed.
    pub async fn prune_stale(
        &self,
        dest: &Path,
        max_age: Duration,
        is_active: impl Fn(&Uuid) -> bool,
    ) -> AppResult<usize> {
        let root = dest.join(&self.chunks_dir);
        let mut entries = match tokio::fs::read_dir(&root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    "Failed to read chunk staging root",
                    e,
                ));
            }
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let Ok(transfer_id) = Uuid::parse_str(&entry.file_name().to_string_lossy()) else {
                continue;
            };
            let metadata = entry.metadata().await?;
            let stale = metadata
                .modified()
                .ok()
                .and_then(|modified| modified.elapsed().ok())
                .is_some_and(|idle| idle >= max_age);
            if !metadata.is_dir() || !stale || is_active(&transfer_id) {
                continue;
            }

            match tokio::fs::remove_dir_all(entry.path()).await {
                Ok(()) => {
                    tracing::info!(transfer_id = %transfer_id, "Removed abandoned chunk staging dir");
                    removed += 1;
                }
                Err(e) => tracing::warn!(
                    transfer_id = %transfer_id,
                    error = %e,
                    "Failed to remove abandoned chunk staging dir"
                ),
            }
        }
        Ok(removed)
    }
}
