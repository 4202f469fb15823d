//! Chunk assembler: streams staged chunks into the final file.

use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

use homeshare_core::error::{AppError, ErrorKind};
use homeshare_core::result::AppResult;

use super::naming::candidate_file_name;
use super::store::ChunkStore;
use crate::lock::LockGuard;

const ASSEMBLY_FILE: &str = "assembled.part";
const COPY_BUFFER_BYTES: usize = 64 * 1024;

/// Everything the assembler needs to finish one transfer.
#[derive(Debug, Clone)]
pub struct AssemblyJob {
    /// Folder the final file is published into.
    pub dest_dir: PathBuf,
    pub transfer_id: Uuid,
    /// Declared name without extension.
    pub file_name: String,
    /// Declared extension including the leading dot.
    pub file_extension: String,
    pub total_chunks: u32,
    /// Declared hex MD5 of the whole file.
    pub declared_hash: String,
}

/// Terminal state of an assembly attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyOutcome {
    /// Hash matched; the file is published at `path`.
    Published { path: PathBuf, bytes: u64 },
    /// Hash mismatch; nothing was published.
    Rejected { expected: String, computed: String },
    /// The staging directory was gone before assembly started.
    NothingToAssemble,
    /// A held lock was taken over by another holder mid-assembly. The
    /// staging directory is left to that holder.
    Superseded,
}

/// Reassembles staged chunks in index order and verifies the result.
#[derive(Debug, Clone)]
pub struct ChunkAssembler {
    store: ChunkStore,
}

impl ChunkAssembler {
    pub fn new(store: ChunkStore) -> Self {
        Self { store }
    }

    /// Assembles a completed transfer.
    ///
    /// `held` locks are touched after every chunk so the sweep never
    /// evicts them mid-assembly. The staging directory is removed on every
    /// path out of this function except [`AssemblyOutcome::Superseded`],
    /// and a published file never replaces an existing one.
    pub async fn assemble(
        &self,
        job: &AssemblyJob,
        held: &[&LockGuard],
    ) -> AppResult<AssemblyOutcome> {
        let staging = self.store.staging_dir(&job.dest_dir, job.transfer_id);

        if !tokio::fs::try_exists(&staging).await.unwrap_or(false) {
            tracing::warn!(
                transfer_id = %job.transfer_id,
                staging = %staging.display(),
                "Chunk directory missing, nothing to assemble"
            );
            return Ok(AssemblyOutcome::NothingToAssemble);
        }

        tracing::info!(
            transfer_id = %job.transfer_id,
            total_chunks = job.total_chunks,
            file_name = %job.file_name,
            "Assembling chunks"
        );

        let result = self.assemble_staged(job, &staging, held).await;

        if !matches!(result, Ok(AssemblyOutcome::Superseded)) {
            if let Err(e) = self.store.discard(&job.dest_dir, job.transfer_id).await {
                tracing::warn!(transfer_id = %job.transfer_id, error = %e, "Failed to remove staging dir");
            }
        }

        match &result {
            Ok(AssemblyOutcome::Published { path, bytes }) => tracing::info!(
                transfer_id = %job.transfer_id,
                path = %path.display(),
                bytes,
                "Assembly complete"
            ),
            Ok(AssemblyOutcome::Rejected { expected, computed }) => {
                let err = AppError::integrity(format!(
                    "expected MD5 {expected}, computed {computed}"
                ));
                tracing::warn!(
                    transfer_id = %job.transfer_id,
                    error = %err,
                    "Assembled file failed hash check, discarded"
                );
            }
            Ok(AssemblyOutcome::Superseded) => tracing::warn!(
                transfer_id = %job.transfer_id,
                "Lock taken over by another holder, abandoning assembly"
            ),
            Ok(AssemblyOutcome::NothingToAssemble) => {}
            Err(e) => tracing::error!(
                transfer_id = %job.transfer_id,
                error = %e,
                "Assembly failed"
            ),
        }

        result
    }

    async fn assemble_staged(
        &self,
        job: &AssemblyJob,
        staging: &Path,
        held: &[&LockGuard],
    ) -> AppResult<AssemblyOutcome> {
        let assembled_path = staging.join(ASSEMBLY_FILE);
        let mut output = tokio::fs::File::create(&assembled_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to create assembly file", e)
        })?;

        let mut hasher = Md5::new();
        let mut buffer = vec![0u8; COPY_BUFFER_BYTES];
        let mut total_bytes = 0u64;

        for index in 0..job.total_chunks {
            let chunk_path = self.store.chunk_path(&job.dest_dir, job.transfer_id, index);
            let mut chunk = tokio::fs::File::open(&chunk_path).await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, format!("Failed to open chunk {index}"), e)
            })?;

            loop {
                let read = chunk.read(&mut buffer).await?;
                if read == 0 {
                    break;
                }
                hasher.update(&buffer[..read]);
                output.write_all(&buffer[..read]).await.map_err(|e| {
                    AppError::with_source(ErrorKind::Storage, "Failed to write chunk to assembly", e)
                })?;
                total_bytes += read as u64;
            }

            if !held.iter().all(|guard| guard.touch()) {
                return Ok(AssemblyOutcome::Superseded);
            }
        }

        output.flush().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to flush assembly file", e)
        })?;
        drop(output);

        let computed = hex::encode(hasher.finalize());
        let expected = job.declared_hash.trim();
        if !computed.eq_ignore_ascii_case(expected) {
            return Ok(AssemblyOutcome::Rejected {
                expected: expected.to_string(),
                computed,
            });
        }

        let path = publish(&assembled_path, &job.dest_dir, &job.file_name, &job.file_extension).await?;
        Ok(AssemblyOutcome::Published {
            path,
            bytes: total_bytes,
        })
    }
}

/// How the assembled file is moved under its final name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PublishMode {
    /// `hard_link` fails when the target exists, which makes the name
    /// reservation atomic even against a concurrent assembly of the same name.
    HardLink,
    /// For filesystems without hard links: reserve the name with
    /// `create_new`, then rename the assembled file over the placeholder.
    Rename,
}

/// Publishes the assembled file under the first free `name (N).ext`.
async fn publish(
    assembled: &Path,
    dest_dir: &Path,
    file_name: &str,
    extension: &str,
) -> AppResult<PathBuf> {
    let linked =
        publish_with(PublishMode::HardLink, assembled, dest_dir, file_name, extension).await;
    let published = match linked {
        Err(e) if hard_links_unsupported(&e) => {
            tracing::warn!(
                dest = %dest_dir.display(),
                error = %e,
                "Hard links unavailable, publishing by rename"
            );
            publish_with(PublishMode::Rename, assembled, dest_dir, file_name, extension).await
        }
        other => other,
    };
    published.map_err(|e| {
        AppError::with_source(ErrorKind::Storage, "Failed to publish assembled file", e)
    })
}

fn hard_links_unsupported(e: &std::io::Error) -> bool {
    // exFAT and several FUSE mounts report EPERM rather than ENOTSUP.
    matches!(
        e.kind(),
        std::io::ErrorKind::Unsupported | std::io::ErrorKind::PermissionDenied
    )
}

async fn publish_with(
    mode: PublishMode,
    assembled: &Path,
    dest_dir: &Path,
    file_name: &str,
    extension: &str,
) -> std::io::Result<PathBuf> {
    let mut attempt = 0u32;
    loop {
        let candidate = dest_dir.join(candidate_file_name(file_name, extension, attempt));
        let claimed = match mode {
            PublishMode::HardLink => tokio::fs::hard_link(assembled, &candidate).await,
            PublishMode::Rename => tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await
                .map(drop),
        };
        match claimed {
            Ok(()) => {
                if mode == PublishMode::Rename {
                    if let Err(e) = tokio::fs::rename(assembled, &candidate).await {
                        let _ = tokio::fs::remove_file(&candidate).await;
                        return Err(e);
                    }
                }
                return Ok(candidate);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}
