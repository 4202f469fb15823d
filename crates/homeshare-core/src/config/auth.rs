//! Authentication configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Token lifetimes, signing secret and admin bootstrap credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for HMAC-SHA256 signing. Empty means "load or create
    /// `secret_file`".
    #[serde(default)]
    pub jwt_secret: String,
    /// File holding the generated signing secret.
    #[serde(default = "default_secret_file")]
    pub secret_file: PathBuf,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_hours: u64,
    /// Access token TTL in minutes for tokens minted by share redemption.
    #[serde(default = "default_share_access_ttl")]
    pub share_access_ttl_minutes: u64,
    /// Name of the cookie carrying the refresh token.
    #[serde(default = "default_cookie_name")]
    pub refresh_cookie_name: String,
    /// Admin account upserted at startup.
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default)]
    pub admin_email: String,
    /// Admin password. The admin is only seeded when this is non-empty.
    #[serde(default)]
    pub admin_password: String,
}

impl AuthConfig {
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_minutes * 60)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_hours * 3600)
    }

    pub fn share_access_ttl(&self) -> Duration {
        Duration::from_secs(self.share_access_ttl_minutes * 60)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            secret_file: default_secret_file(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_hours: default_refresh_ttl(),
            share_access_ttl_minutes: default_share_access_ttl(),
            refresh_cookie_name: default_cookie_name(),
            admin_username: default_admin_username(),
            admin_email: String::new(),
            admin_password: String::new(),
        }
    }
}

fn default_secret_file() -> PathBuf {
    PathBuf::from("secrets/JWT")
}

fn default_access_ttl() -> u64 {
    15
}

fn default_refresh_ttl() -> u64 {
    720
}

fn default_share_access_ttl() -> u64 {
    5
}

fn default_cookie_name() -> String {
    "refresh_token".to_string()
}

fn default_admin_username() -> String {
    "admin".to_string()
}
