//! JWT claims structure used in access and refresh tokens.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use homeshare_entity::AccessLevel;

/// Claims payload embedded in every capability token.
///
/// Every field is required; a token missing any of them fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: a username or the display name of a redeemed share.
    pub sub: String,
    /// Folder scope. `"/"` grants every folder.
    pub folder_id: String,
    /// Access level within the folder scope.
    pub access: AccessLevel,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Token type: "access" or "refresh".
    pub token_type: TokenType,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token presented on every request.
    Access,
    /// Long-lived token only accepted by the refresh endpoint.
    Refresh,
}

/// What a new token should carry and for how long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenParameters {
    pub subject: String,
    pub folder_id: String,
    pub access: AccessLevel,
    pub ttl: Duration,
}

impl TokenParameters {
    pub fn new(
        subject: impl Into<String>,
        folder_id: impl Into<String>,
        access: AccessLevel,
        ttl: Duration,
    ) -> Self {
        Self {
            subject: subject.into(),
            folder_id: folder_id.into(),
            access,
            ttl,
        }
    }

    /// Parameters for a token with the same scope as `claims`.
    pub fn from_claims(claims: &Claims, ttl: Duration) -> Self {
        Self::new(&claims.sub, &claims.folder_id, claims.access, ttl)
    }
}

impl Claims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Returns the remaining TTL in seconds (0 if expired).
    pub fn remaining_ttl_seconds(&self) -> u64 {
        let remaining = self.exp - Utc::now().timestamp();
        if remaining > 0 { remaining as u64 } else { 0 }
    }
}
