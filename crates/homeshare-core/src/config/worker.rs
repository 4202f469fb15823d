//! Background worker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Lock registry and expiry sweep timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduled sweeps run.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Idle time after which a held resource lock is evicted.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_seconds: u64,
    /// Interval between lock registry sweeps.
    #[serde(default = "default_lock_sweep_interval")]
    pub lock_sweep_interval_seconds: u64,
    /// Interval between expired share record sweeps.
    #[serde(default = "default_share_sweep_interval")]
    pub share_sweep_interval_seconds: u64,
    /// Interval between expired shared folder sweeps.
    #[serde(default = "default_folder_sweep_interval")]
    pub folder_sweep_interval_seconds: u64,
    /// Interval between abandoned chunk staging sweeps.
    #[serde(default = "default_staging_sweep_interval")]
    pub staging_sweep_interval_seconds: u64,
    /// Age after which an untouched, unlocked staging directory is removed.
    #[serde(default = "default_staging_max_age")]
    pub staging_max_age_seconds: u64,
}

impl WorkerConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_seconds)
    }

    pub fn lock_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.lock_sweep_interval_seconds)
    }

    pub fn share_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.share_sweep_interval_seconds)
    }

    pub fn folder_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.folder_sweep_interval_seconds)
    }

    pub fn staging_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.staging_sweep_interval_seconds)
    }

    pub fn staging_max_age(&self) -> Duration {
        Duration::from_secs(self.staging_max_age_seconds)
    }

    /// Rejects zero timings; timers and repeated jobs need a positive period.
    pub fn validate(&self) -> Result<(), AppError> {
        let timings = [
            ("lock_timeout_seconds", self.lock_timeout_seconds),
            ("lock_sweep_interval_seconds", self.lock_sweep_interval_seconds),
            ("share_sweep_interval_seconds", self.share_sweep_interval_seconds),
            ("folder_sweep_interval_seconds", self.folder_sweep_interval_seconds),
            ("staging_sweep_interval_seconds", self.staging_sweep_interval_seconds),
            ("staging_max_age_seconds", self.staging_max_age_seconds),
        ];
        match timings.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(AppError::configuration(format!(
                "worker.{name} must be positive"
            ))),
            None => Ok(()),
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lock_timeout_seconds: default_lock_timeout(),
            lock_sweep_interval_seconds: default_lock_sweep_interval(),
            share_sweep_interval_seconds: default_share_sweep_interval(),
            folder_sweep_interval_seconds: default_folder_sweep_interval(),
            staging_sweep_interval_seconds: default_staging_sweep_interval(),
            staging_max_age_seconds: default_staging_max_age(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_lock_timeout() -> u64 {
    45
}

fn default_lock_sweep_interval() -> u64 {
    60
}

fn default_share_sweep_interval() -> u64 {
    1800
}

fn default_folder_sweep_interval() -> u64 {
    1800
}

fn default_staging_sweep_interval() -> u64 {
    3600
}

fn default_staging_max_age() -> u64 {
    86400
}
