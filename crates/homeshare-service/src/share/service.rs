//! Share creation, redemption, revocation and expiry sweeps.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use homeshare_auth::acl::require_access;
use homeshare_auth::jwt::{Claims, JwtEncoder, TokenPair, TokenParameters};
use homeshare_auth::password::OtpHasher;
use homeshare_core::error::{AppError, ErrorKind};
use homeshare_core::result::AppResult;
use homeshare_database::store::ShareStore;
use homeshare_entity::AccessLevel;
use homeshare_entity::folder::ROOT_FOLDER;
use homeshare_entity::share::CreateShareRecord;
use homeshare_storage::layout::StorageLayout;
use homeshare_storage::shared::{FolderSweepReport, SharedFolderName, sweep_expired_folders};

/// Parameters for a new share.
#[derive(Debug, Clone)]
pub struct CreateShareRequest {
    /// Label shown to recipients and used as the token subject.
    pub folder_name: String,
    pub otp: String,
    pub access: AccessLevel,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CreatedShare {
    pub link_id: Uuid,
    pub folder_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Tokens minted by a successful redemption.
#[derive(Debug, Clone)]
pub struct RedeemedShare {
    pub tokens: TokenPair,
    pub folder_id: String,
    pub access: AccessLevel,
}

/// Owns the lifecycle of share records and their folders.
#[derive(Clone)]
pub struct SharingService {
    store: Arc<dyn ShareStore>,
    layout: StorageLayout,
    encoder: Arc<JwtEncoder>,
    otp: OtpHasher,
    access_ttl: Duration,
}

impl std::fmt::Debug for SharingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharingService")
            .field("layout", &self.layout)
            .field("access_ttl", &self.access_ttl)
            .finish_non_exhaustive()
    }
}

/// `now` without its sub-second part.
fn truncate_to_seconds(now: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}

impl SharingService {
    pub fn new(
        store: Arc<dyn ShareStore>,
        layout: StorageLayout,
        encoder: Arc<JwtEncoder>,
        access_ttl: Duration,
    ) -> Self {
        Self {
            store,
            layout,
            encoder,
            otp: OtpHasher::new(),
            access_ttl,
        }
    }

    /// Mints a share link over a freshly created folder.
    ///
    /// Only a root read-write capability may create shares.
    pub async fn create_share(
        &self,
        claims: &Claims,
        req: CreateShareRequest,
    ) -> AppResult<CreatedShare> {
        require_access(claims, ROOT_FOLDER, AccessLevel::ReadWrite)?;

        let folder_name = req.folder_name.trim();
        if folder_name.is_empty() {
            return Err(AppError::validation("folder name is required"));
        }
        if req.otp.is_empty() {
            return Err(AppError::validation("otp is required"));
        }

        let now = truncate_to_seconds(Utc::now());
        if req.expires_at <= now {
            return Err(AppError::validation("expiration date must be in the future"));
        }
        let lifetime = (req.expires_at - now)
            .to_std()
            .map_err(|_| AppError::validation("expiration date must be in the future"))?;

        let link_id = Uuid::new_v4();
        let folder_id = SharedFolderName::new(now, lifetime, link_id.to_string()).encode();
        let folder_path = self.layout.folder_path(&folder_id)?;

        tokio::fs::create_dir_all(&folder_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to create shared folder", e)
        })?;

        let salt = self.otp.generate_salt()?;
        let otp_hash = self.otp.hash(&req.otp, &salt)?;
        let record = CreateShareRecord {
            link_id,
            folder_id: folder_id.clone(),
            folder_name: folder_name.to_string(),
            otp_hash,
            salt,
            access: req.access,
            expires_at: req.expires_at,
        };

        if let Err(e) = self.store.create(record).await {
            if let Err(cleanup) = tokio::fs::remove_dir_all(&folder_path).await {
                warn!(folder_id = %folder_id, error = %cleanup, "Failed to remove orphaned shared folder");
            }
            return Err(e);
        }

        info!(
            link_id = %link_id,
            folder_id = %folder_id,
            access = %req.access,
            expires_at = %req.expires_at,
            creator = %claims.sub,
            "Share created"
        );

        Ok(CreatedShare {
            link_id,
            folder_id,
            expires_at: req.expires_at,
        })
    }

    /// Exchanges a link id and OTP for a token pair scoped to the share.
    ///
    /// The refresh token never outlives the share itself.
    pub async fn redeem_share(&self, link_id: &str, otp: &str) -> AppResult<RedeemedShare> {
        let link_id = Uuid::parse_str(link_id.trim())
            .map_err(|_| AppError::not_found("Share link not found"))?;

        let record = self
            .store
            .find_by_link(link_id)
            .await?
            .ok_or_else(|| AppError::not_found("Share link not found"))?;

        if !self.otp.verify(otp, &record.salt, &record.otp_hash)? {
            warn!(link_id = %link_id, "Share redemption with wrong OTP");
            return Err(AppError::authentication("Invalid credentials"));
        }

        let now = Utc::now();
        if record.is_expired_at(now) {
            self.store.delete(link_id).await?;
            info!(link_id = %link_id, "Removed share found expired at redemption");
            return Err(AppError::expired("Share link has expired"));
        }

        let remaining = (record.expires_at - now)
            .to_std()
            .map_err(|_| AppError::expired("Share link has expired"))?;

        let access = TokenParameters::new(
            &record.folder_name,
            &record.folder_id,
            record.access,
            self.access_ttl.min(remaining),
        );
        let refresh = TokenParameters {
            ttl: remaining,
            ..access.clone()
        };
        let tokens = self.encoder.issue_pair(&access, &refresh)?;

        info!(link_id = %link_id, folder_id = %record.folder_id, "Share redeemed");

        Ok(RedeemedShare {
            tokens,
            folder_id: record.folder_id,
            access: record.access,
        })
    }

    /// Deletes a share record and its folder.
    pub async fn revoke_share(&self, claims: &Claims, link_id: &str) -> AppResult<()> {
        require_access(claims, ROOT_FOLDER, AccessLevel::ReadWrite)?;

        let link_id = Uuid::parse_str(link_id.trim())
            .map_err(|_| AppError::validation("link id must be a UUID"))?;
        let record = self
            .store
            .find_by_link(link_id)
            .await?
            .ok_or_else(|| AppError::not_found("Share link not found"))?;

        self.store.delete(link_id).await?;

        let folder_path = self.layout.folder_path(&record.folder_id)?;
        match tokio::fs::remove_dir_all(&folder_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    "Failed to remove shared folder",
                    e,
                ));
            }
        }

        info!(link_id = %link_id, folder_id = %record.folder_id, revoked_by = %claims.sub, "Share revoked");
        Ok(())
    }

    /// Deletes share records whose expiry has passed.
    pub async fn purge_expired_records(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let removed = self.store.delete_expired(now).await?;
        if removed > 0 {
            info!(removed, "Purged expired share records");
        }
        Ok(removed)
    }

    /// Deletes shared folders whose name-encoded expiry has passed.
    pub async fn purge_expired_folders(&self, now: DateTime<Utc>) -> AppResult<FolderSweepReport> {
        sweep_expired_folders(self.layout.sharing_root(), now).await
    }
}
