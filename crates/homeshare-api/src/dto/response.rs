//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use homeshare_entity::AccessLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Login response. The refresh token travels in a cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub folder_id: String,
    pub access: AccessLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareCreatedResponse {
    pub link_id: Uuid,
    pub folder_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareRedeemedResponse {
    pub access_token: String,
    pub folder_id: String,
    pub access: AccessLevel,
}

/// Acknowledgment of one uploaded chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkAcceptedResponse {
    pub received_chunks: u32,
    pub total_chunks: u32,
    /// True for the request that completed the transfer.
    pub assembling: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
