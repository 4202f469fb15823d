//! Share record repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use homeshare_core::error::{AppError, ErrorKind};
use homeshare_core::result::AppResult;
use homeshare_entity::share::{CreateShareRecord, ShareRecord};

use crate::store::ShareStore;

/// Repository for the `share_records` table.
#[derive(Debug, Clone)]
pub struct ShareRepository {
    pool: PgPool,
}

impl ShareRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareStore for ShareRepository {
    async fn create(&self, record: CreateShareRecord) -> AppResult<ShareRecord> {
        sqlx::query_as::<_, ShareRecord>(
            r#"INSERT INTO share_records
                (link_id, folder_id, folder_name, salt, otp_hash, access, expires_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(record.link_id)
        .bind(&record.folder_id)
        .bind(&record.folder_name)
        .bind(&record.salt)
        .bind(&record.otp_hash)
        .bind(record.access)
        .bind(record.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if duplicate {
                AppError::conflict(format!("Share link {} already exists", record.link_id))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create share record", e)
            }
        })
    }

    async fn find_by_link(&self, link_id: Uuid) -> AppResult<Option<ShareRecord>> {
        sqlx::query_as::<_, ShareRecord>("SELECT * FROM share_records WHERE link_id = $1")
            .bind(link_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find share record", e)
            })
    }

    async fn delete(&self, link_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM share_records WHERE link_id = $1")
            .bind(link_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete share record", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM share_records WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete expired shares", e)
            })?;
        Ok(result.rows_affected())
    }
}
