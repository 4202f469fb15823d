//! Self-describing shared folder names.
//!
//! A shared folder is named `<created:%Y%m%d%H%M%S>_<duration>_<owner>`,
//! for example `20250101120000_48h0m0s_6f1c...`. The name alone decides
//! when the folder expires, so the sweep still works if the share records
//! are lost. This module is the only place that knows the format.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};

use super::duration::{format_duration, parse_duration};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const TIMESTAMP_LEN: usize = 14;

/// The decoded parts of a shared folder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedFolderName {
    pub created_at: DateTime<Utc>,
    pub lifetime: Duration,
    pub owner_id: String,
}

impl SharedFolderName {
    /// `created_at` is truncated to whole seconds.
    pub fn new(created_at: DateTime<Utc>, lifetime: Duration, owner_id: impl Into<String>) -> Self {
        let created_at = DateTime::from_timestamp(created_at.timestamp(), 0).unwrap_or(created_at);
        Self {
            created_at,
            lifetime,
            owner_id: owner_id.into(),
        }
    }

    pub fn encode(&self) -> String {
        format!(
            "{}_{}_{}",
            self.created_at.format(TIMESTAMP_FORMAT),
            format_duration(self.lifetime),
            self.owner_id
        )
    }

    /// Parses a folder name. `None` means the name is not ours.
    pub fn decode(name: &str) -> Option<Self> {
        let mut parts = name.splitn(3, '_');
        let timestamp = parts.next()?;
        let lifetime = parts.next()?;
        let owner_id = parts.next()?;

        if timestamp.len() != TIMESTAMP_LEN || owner_id.is_empty() {
            return None;
        }

        let created_at = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .ok()?
            .and_utc();
        let lifetime = parse_duration(lifetime)?;

        Some(Self {
            created_at,
            lifetime,
            owner_id: owner_id.to_string(),
        })
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.lifetime)
            .ok()
            .and_then(|lifetime| self.created_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at() < now
    }
}

impl fmt::Display for SharedFolderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
