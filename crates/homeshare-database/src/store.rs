//! Persistence seams used by the services.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use homeshare_core::result::AppResult;
use homeshare_entity::share::{CreateShareRecord, ShareRecord};
use homeshare_entity::user::{UpsertUser, UserRecord};

/// Durable keyed storage for share records.
#[async_trait]
pub trait ShareStore: Send + Sync + 'static {
    /// Inserts a new record. A duplicate link id is a conflict.
    async fn create(&self, record: CreateShareRecord) -> AppResult<ShareRecord>;

    async fn find_by_link(&self, link_id: Uuid) -> AppResult<Option<ShareRecord>>;

    /// Deletes one record. Returns `true` if it existed.
    async fn delete(&self, link_id: Uuid) -> AppResult<bool>;

    /// Deletes every record with `expires_at < now`, returning the count.
    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// Durable keyed storage for password accounts.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>>;

    /// Inserts or replaces the account keyed by username.
    async fn upsert(&self, user: UpsertUser) -> AppResult<UserRecord>;
}
