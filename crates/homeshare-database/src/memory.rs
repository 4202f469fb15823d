//! Process-local stores for single-node setups without PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use homeshare_core::error::AppError;
use homeshare_core::result::AppResult;
use homeshare_entity::share::{CreateShareRecord, ShareRecord};
use homeshare_entity::user::{UpsertUser, UserRecord};

use crate::store::{ShareStore, UserStore};

/// Share records held in memory.
#[derive(Debug, Default)]
pub struct MemoryShareStore {
    records: DashMap<Uuid, ShareRecord>,
}

impl MemoryShareStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ShareStore for MemoryShareStore {
    async fn create(&self, record: CreateShareRecord) -> AppResult<ShareRecord> {
        match self.records.entry(record.link_id) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Share link {} already exists",
                record.link_id
            ))),
            Entry::Vacant(slot) => {
                let stored = ShareRecord {
                    link_id: record.link_id,
                    folder_id: record.folder_id,
                    folder_name: record.folder_name,
                    salt: record.salt,
                    otp_hash: record.otp_hash,
                    access: record.access,
                    expires_at: record.expires_at,
                    created_at: Utc::now(),
                };
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn find_by_link(&self, link_id: Uuid) -> AppResult<Option<ShareRecord>> {
        Ok(self.records.get(&link_id).map(|r| r.value().clone()))
    }

    async fn delete(&self, link_id: Uuid) -> AppResult<bool> {
        Ok(self.records.remove(&link_id).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let before = self.records.len();
        self.records.retain(|_, record| !record.is_expired_at(now));
        Ok(before.saturating_sub(self.records.len()) as u64)
    }
}

/// User accounts held in memory.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: DashMap<String, UserRecord>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        Ok(self.users.get(username).map(|u| u.value().clone()))
    }

    async fn upsert(&self, user: UpsertUser) -> AppResult<UserRecord> {
        let record = UserRecord {
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            folder_id: user.folder_id,
            access: user.access,
        };
        self.users.insert(record.username.clone(), record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use homeshare_entity::AccessLevel;

    use super::*;

    fn record(link_id: Uuid, expires_at: DateTime<Utc>) -> CreateShareRecord {
        CreateShareRecord {
            link_id,
            folder_id: "folder".to_string(),
            folder_name: "Holiday".to_string(),
            salt: "00".to_string(),
            otp_hash: "ff".to_string(),
            access: AccessLevel::Read,
            expires_at,
        }
    }

    #[tokio::test]
    async fn test_share_store_crud() {
        let store = MemoryShareStore::new();
        let id = Uuid::new_v4();
        let now = Utc::now();

        store.create(record(id, now + Duration::hours(1))).await.unwrap();
        let duplicate = store.create(record(id, now)).await.unwrap_err();
        assert_eq!(duplicate.kind, homeshare_core::ErrorKind::Conflict);

        assert!(store.find_by_link(id).await.unwrap().is_some());
        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert!(store.find_by_link(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let store = MemoryShareStore::new();
        let now = Utc::now();
        store.create(record(Uuid::new_v4(), now - Duration::minutes(1))).await.unwrap();
        store.create(record(Uuid::new_v4(), now + Duration::minutes(1))).await.unwrap();

        assert_eq!(store.delete_expired(now).await.unwrap(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_user_upsert_replaces() {
        let store = MemoryUserStore::new();
        let user = |hash: &str| UpsertUser {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: hash.to_string(),
            folder_id: "/".to_string(),
            access: AccessLevel::ReadWrite,
        };

        store.upsert(user("one")).await.unwrap();
        store.upsert(user("two")).await.unwrap();

        let found = store.find_by_username("admin").await.unwrap().unwrap();
        assert_eq!(found.password_hash, "two");
        assert!(store.find_by_username("ghost").await.unwrap().is_none());
    }
}
