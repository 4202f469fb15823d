//! Share record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::access::AccessLevel;

/// An OTP-protected, time-boxed grant to one shared folder.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShareRecord {
    /// Link identifier presented by the recipient.
    pub link_id: Uuid,
    /// Name of the backing shared folder on disk.
    pub folder_id: String,
    /// Human-readable label chosen by the creator.
    pub folder_name: String,
    /// Per-record Argon2 salt, unpadded base64.
    #[serde(skip_serializing)]
    pub salt: String,
    /// Argon2id PHC string of the OTP under `salt`.
    #[serde(skip_serializing)]
    pub otp_hash: String,
    /// Access level granted on redemption.
    pub access: AccessLevel,
    /// Instant after which the share can no longer be redeemed.
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ShareRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Data required to insert a new share record.
#[derive(Debug, Clone)]
pub struct CreateShareRecord {
    pub link_id: Uuid,
    pub folder_id: String,
    pub folder_name: String,
    pub salt: String,
    pub otp_hash: String,
    pub access: AccessLevel,
    pub expires_at: DateTime<Utc>,
}
