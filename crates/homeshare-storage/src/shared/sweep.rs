//! Removal of shared folders whose embedded lifetime has passed.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use homeshare_core::error::{AppError, ErrorKind};
use homeshare_core::result::AppResult;

use super::name::SharedFolderName;

/// What one sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSweepReport {
    pub removed: Vec<String>,
    /// Directory names that could not be decoded and were left alone.
    pub skipped: Vec<String>,
    pub retained: usize,
}

/// Deletes every directory under `root` whose name decodes to an expiry
/// before `now`. Undecodable names are logged and skipped.
pub async fn sweep_expired_folders(root: &Path, now: DateTime<Utc>) -> AppResult<FolderSweepReport> {
    let mut report = FolderSweepReport::default();

    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(report),
        Err(e) => {
            return Err(AppError::with_source(
                ErrorKind::Storage,
                "Failed to read sharing directory",
                e,
            ));
        }
    };

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();

        let Some(decoded) = SharedFolderName::decode(&name) else {
            warn!(folder = %name, "Skipping shared folder with unparseable name");
            report.skipped.push(name);
            continue;
        };

        if !decoded.is_expired_at(now) {
            report.retained += 1;
            continue;
        }

        match tokio::fs::remove_dir_all(entry.path()).await {
            Ok(()) => {
                info!(folder = %name, expired_at = %decoded.expires_at(), "Removed expired shared folder");
                report.removed.push(name);
            }
            Err(e) => warn!(folder = %name, error = %e, "Failed to remove expired shared folder"),
        }
    }

    Ok(report)
}
