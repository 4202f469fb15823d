//! Interval scheduler for the expiry and staging sweeps.

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use homeshare_core::config::worker::WorkerConfig;
use homeshare_core::error::AppError;

use crate::jobs::ExpiryCleanupJob;

/// Owns the job scheduler and the registered sweeps.
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    cleanup: Arc<ExpiryCleanupJob>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    pub async fn new(cleanup: ExpiryCleanupJob) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self {
            scheduler,
            cleanup: Arc::new(cleanup),
        })
    }

    /// Registers every sweep at its configured interval.
    pub async fn register_default_tasks(&self, config: &WorkerConfig) -> Result<(), AppError> {
        self.register_share_record_sweep(config.share_sweep_interval())
            .await?;
        self.register_shared_folder_sweep(config.folder_sweep_interval())
            .await?;
        self.register_staging_sweep(config.staging_sweep_interval())
            .await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Scheduler shut down");
        Ok(())
    }

    async fn register_share_record_sweep(&self, every: Duration) -> Result<(), AppError> {
        let cleanup = Arc::clone(&self.cleanup);
        let job = CronJob::new_repeated_async(every, move |_uuid, _lock| {
            let cleanup = Arc::clone(&cleanup);
            Box::pin(async move {
                if let Err(e) = cleanup.sweep_share_records().await {
                    tracing::error!("Share record sweep failed: {}", e);
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create share_record_sweep schedule: {}", e))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add share_record_sweep schedule: {}", e))
        })?;

        tracing::info!("Registered: share_record_sweep (every {}s)", every.as_secs());
        Ok(())
    }

    async fn register_shared_folder_sweep(&self, every: Duration) -> Result<(), AppError> {
        let cleanup = Arc::clone(&self.cleanup);
        let job = CronJob::new_repeated_async(every, move |_uuid, _lock| {
            let cleanup = Arc::clone(&cleanup);
            Box::pin(async move {
                if let Err(e) = cleanup.sweep_shared_folders().await {
                    tracing::error!("Shared folder sweep failed: {}", e);
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!(
                "Failed to create shared_folder_sweep schedule: {}",
                e
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add shared_folder_sweep schedule: {}", e))
        })?;

        tracing::info!("Registered: shared_folder_sweep (every {}s)", every.as_secs());
        Ok(())
    }

    async fn register_staging_sweep(&self, every: Duration) -> Result<(), AppError> {
        let cleanup = Arc::clone(&self.cleanup);
        let job = CronJob::new_repeated_async(every, move |_uuid, _lock| {
            let cleanup = Arc::clone(&cleanup);
            Box::pin(async move {
                if let Err(e) = cleanup.sweep_abandoned_staging().await {
                    tracing::error!("Chunk staging sweep failed: {}", e);
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create staging_sweep schedule: {}", e)))?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add staging_sweep schedule: {}", e))
        })?;

        tracing::info!("Registered: staging_sweep (every {}s)", every.as_secs());
        Ok(())
    }
}
