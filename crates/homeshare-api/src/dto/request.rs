//! Request DTOs with validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use homeshare_entity::AccessLevel;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Share creation request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateShareRequest {
    /// Display name for the recipients.
    #[validate(length(min = 1, max = 255, message = "Folder name is required"))]
    pub folder_name: String,
    #[validate(length(min = 1, max = 128, message = "OTP is required"))]
    pub otp: String,
    pub access: AccessLevel,
    /// RFC 3339 timestamp after which the share stops working.
    pub expiration_date: DateTime<Utc>,
}

/// Share redemption request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RedeemShareRequest {
    /// The link id handed out at share creation.
    #[validate(length(min = 1, message = "Link is required"))]
    pub link_url: String,
    #[validate(length(min = 1, message = "OTP is required"))]
    pub otp: String,
}
