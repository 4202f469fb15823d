//! Periodic cleanup of expired shares and abandoned uploads.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing;

use homeshare_core::result::AppResult;
use homeshare_service::{SharingService, UploadService};

/// Runs the expiry sweeps against the sharing service and the staging
/// sweep against the upload service.
#[derive(Debug, Clone)]
pub struct ExpiryCleanupJob {
    sharing: SharingService,
    uploads: Arc<UploadService>,
    staging_max_age: Duration,
}

impl ExpiryCleanupJob {
    pub fn new(
        sharing: SharingService,
        uploads: Arc<UploadService>,
        staging_max_age: Duration,
    ) -> Self {
        Self {
            sharing,
            uploads,
            staging_max_age,
        }
    }

    /// Deletes share records past their expiry. Returns the count removed.
    pub async fn sweep_share_records(&self) -> AppResult<u64> {
        tracing::debug!("Running share record sweep");
        let removed = self.sharing.purge_expired_records(Utc::now()).await?;
        tracing::info!("Share record sweep removed {} record(s)", removed);
        Ok(removed)
    }

    /// Deletes shared folders past their expiry. Returns the count removed.
    pub async fn sweep_shared_folders(&self) -> AppResult<usize> {
        tracing::debug!("Running shared folder sweep");
        let report = self.sharing.purge_expired_folders(Utc::now()).await?;
        tracing::info!(
            "Shared folder sweep removed {} folder(s), kept {}, skipped {}",
            report.removed.len(),
            report.retained,
            report.skipped.len()
        );
        Ok(report.removed.len())
    }

    /// Deletes chunk staging dirs of abandoned transfers. Returns the count removed.
    pub async fn sweep_abandoned_staging(&self) -> AppResult<usize> {
        tracing::debug!("Running chunk staging sweep");
        let removed = self.uploads.prune_abandoned_staging(self.staging_max_age).await?;
        tracing::info!("Chunk staging sweep removed {} dir(s)", removed);
        Ok(removed)
    }
}
