//! Chunk submission, completion detection and assembly hand-off.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info};
use uuid::Uuid;

use homeshare_auth::acl::require_access;
use homeshare_auth::jwt::Claims;
use homeshare_core::error::AppError;
use homeshare_core::result::AppResult;
use homeshare_entity::AccessLevel;
use homeshare_storage::chunked::{AssemblyJob, ChunkAssembler, ChunkPosition, ChunkStore};
use homeshare_storage::layout::StorageLayout;
use homeshare_storage::lock::{LockRegistry, file_key, transfer_key};
use homeshare_storage::validation::{validate_extension, validate_file_name, validate_folder_id};

use crate::tasks::BackgroundTasks;

/// One chunk as received from a client.
#[derive(Debug, Clone)]
pub struct ChunkSubmission {
    pub transfer_id: String,
    /// `"/"` for the upload area, otherwise a shared folder id.
    pub folder_id: String,
    pub file_name: String,
    pub file_extension: String,
    /// Hex MD5 of the whole file.
    pub declared_hash: String,
    pub chunk_index: i64,
    pub total_chunks: i64,
    pub data: Bytes,
}

/// Synchronous acknowledgment of an accepted chunk.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ChunkReceipt {
    pub transfer_id: Uuid,
    pub received_chunks: u32,
    pub total_chunks: u32,
    /// True only for the request that handed the transfer to the assembler.
    pub assembly_started: bool,
}

struct ValidatedChunk {
    transfer_id: Uuid,
    position: ChunkPosition,
    declared_hash: String,
}

/// Accepts chunks and starts exactly one assembly per completed transfer.
#[derive(Debug, Clone)]
pub struct UploadService {
    layout: StorageLayout,
    store: ChunkStore,
    assembler: ChunkAssembler,
    locks: Arc<LockRegistry>,
    tasks: BackgroundTasks,
    max_chunk_size: usize,
}

impl UploadService {
    pub fn new(
        layout: StorageLayout,
        locks: Arc<LockRegistry>,
        tasks: BackgroundTasks,
        max_chunk_size: usize,
    ) -> Self {
        let store = ChunkStore::new(layout.chunks_dir());
        Self {
            assembler: ChunkAssembler::new(store.clone()),
            store,
            layout,
            locks,
            tasks,
            max_chunk_size,
        }
    }

    /// Validates, authorizes and stages one chunk.
    ///
    /// Nothing is written unless the submission is well-formed and the
    /// caller may write to the destination folder.
    pub async fn submit_chunk(
        &self,
        claims: &Claims,
        submission: ChunkSubmission,
    ) -> AppResult<ChunkReceipt> {
        let validated = self.validate(&submission)?;
        require_access(claims, &submission.folder_id, AccessLevel::Write)?;
        let dest_dir = self.layout.existing_folder(&submission.folder_id).await?;

        let received = self
            .store
            .accept_chunk(
                &dest_dir,
                validated.transfer_id,
                validated.position,
                &submission.data,
            )
            .await?;
        let total = validated.position.total();

        let mut receipt = ChunkReceipt {
            transfer_id: validated.transfer_id,
            received_chunks: received,
            total_chunks: total,
            assembly_started: false,
        };

        if received != total {
            return Ok(receipt);
        }

        let Some(transfer_guard) = self.locks.try_lock(&transfer_key(&validated.transfer_id))
        else {
            debug!(transfer_id = %validated.transfer_id, "Assembly already running");
            return Ok(receipt);
        };

        let final_name = format!("{}{}", submission.file_name, submission.file_extension);
        let file_guard = self
            .locks
            .try_lock(&file_key(&submission.folder_id, &final_name));

        let job = AssemblyJob {
            dest_dir,
            transfer_id: validated.transfer_id,
            file_name: submission.file_name,
            file_extension: submission.file_extension,
            total_chunks: total,
            declared_hash: validated.declared_hash,
        };

        info!(
            transfer_id = %job.transfer_id,
            folder_id = %submission.folder_id,
            subject = %claims.sub,
            "All chunks received, scheduling assembly"
        );

        let assembler = self.assembler.clone();
        self.tasks.spawn(async move {
            // Outcomes are logged by the assembler.
            let mut held = vec![&transfer_guard];
            held.extend(file_guard.as_ref());
            let _ = assembler.assemble(&job, &held).await;
            drop(held);
            drop(file_guard);
            drop(transfer_guard);
        });

        receipt.assembly_started = true;
        Ok(receipt)
    }

    /// Removes staging directories left behind by abandoned transfers in
    /// the upload area and every shared folder. Transfers whose lock is
    /// held are never touched.
    pub async fn prune_abandoned_staging(&self, max_age: Duration) -> AppResult<usize> {
        let mut destinations = vec![self.layout.upload_root().clone()];
        match tokio::fs::read_dir(self.layout.sharing_root()).await {
            Ok(mut entries) => {
                while let Some(entry) = entries.next_entry().await? {
                    if entry.file_type().await?.is_dir() {
                        destinations.push(entry.path());
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut removed = 0;
        for dest in &destinations {
            removed += self
                .store
                .prune_stale(dest, max_age, |id| self.locks.is_held(&transfer_key(id)))
                .await?;
        }
        Ok(removed)
    }

    fn validate(&self, submission: &ChunkSubmission) -> AppResult<ValidatedChunk> {
        let transfer_id = Uuid::parse_str(submission.transfer_id.trim()).map_err(|_| {
            AppError::validation(format!(
                "transfer id must be a UUID: {:?}",
                submission.transfer_id
            ))
        })?;
        validate_file_name(&submission.file_name)?;
        validate_extension(&submission.file_extension)?;
        validate_folder_id(&submission.folder_id)?;

        let declared_hash = submission.declared_hash.trim().to_string();
        if declared_hash.len() != 32 || !declared_hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AppError::validation("file hash must be 32 hex characters"));
        }

        let position = ChunkPosition::new(submission.chunk_index, submission.total_chunks)?;

        if submission.data.is_empty() {
            return Err(AppError::validation("chunk file is empty"));
        }
        if submission.data.len() > self.max_chunk_size {
            return Err(AppError::validation(format!(
                "chunk of {} bytes exceeds the {} byte limit",
                submission.data.len(),
                self.max_chunk_size
            )));
        }

        Ok(ValidatedChunk {
            transfer_id,
            position,
            declared_hash,
        })
    }
}
