//! User entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::access::AccessLevel;

/// A password-authenticated account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub username: String,
    pub email: String,
    /// Argon2 PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Folder scope granted on login; `"/"` for administrators.
    pub folder_id: String,
    pub access: AccessLevel,
}

/// Data required to create or refresh a user record.
#[derive(Debug, Clone)]
pub struct UpsertUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub folder_id: String,
    pub access: AccessLevel,
}
