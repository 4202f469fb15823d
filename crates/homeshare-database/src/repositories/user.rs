//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use homeshare_core::error::{AppError, ErrorKind};
use homeshare_core::result::AppResult;
use homeshare_entity::user::{UpsertUser, UserRecord};

use crate::store::UserStore;

/// Repository for the `users` table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    async fn upsert(&self, user: UpsertUser) -> AppResult<UserRecord> {
        sqlx::query_as::<_, UserRecord>(
            r#"INSERT INTO users (username, email, password_hash, folder_id, access)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (username) DO UPDATE SET
                   email = EXCLUDED.email,
                   password_hash = EXCLUDED.password_hash,
                   folder_id = EXCLUDED.folder_id,
                   access = EXCLUDED.access
               RETURNING *"#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.folder_id)
        .bind(user.access)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert user", e))
    }
}
