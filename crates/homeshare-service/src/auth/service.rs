//! Account login, refresh and admin seeding.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use homeshare_auth::acl::has_access;
use homeshare_auth::jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder, TokenPair, TokenParameters};
use homeshare_auth::password::PasswordHasher;
use homeshare_core::config::auth::AuthConfig;
use homeshare_core::error::AppError;
use homeshare_core::result::AppResult;
use homeshare_database::store::UserStore;
use homeshare_entity::AccessLevel;
use homeshare_entity::folder::ROOT_FOLDER;
use homeshare_entity::user::UpsertUser;

/// Tokens and scope returned by a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub tokens: TokenPair,
    pub folder_id: String,
    pub access: AccessLevel,
}

/// Handles password logins and token refresh.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            users,
            hasher: PasswordHasher::new(),
            encoder,
            decoder,
            access_ttl: config.access_ttl(),
            refresh_ttl: config.refresh_ttl(),
        }
    }

    /// Verifies credentials and issues a token pair with the account's scope.
    ///
    /// Unknown users and wrong passwords produce the same error.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginOutcome> {
        let Some(user) = self.users.find_by_username(username).await? else {
            warn!(username = %username, "Login for unknown user");
            return Err(AppError::authentication("Invalid credentials"));
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            warn!(username = %username, "Login with wrong password");
            return Err(AppError::authentication("Invalid credentials"));
        }

        let access = TokenParameters::new(&user.username, &user.folder_id, user.access, self.access_ttl);
        let refresh = TokenParameters {
            ttl: self.refresh_ttl,
            ..access.clone()
        };
        let tokens = self.encoder.issue_pair(&access, &refresh)?;

        info!(username = %user.username, folder_id = %user.folder_id, "User logged in");
        Ok(LoginOutcome {
            tokens,
            folder_id: user.folder_id,
            access: user.access,
        })
    }

    /// Exchanges a refresh token for a new access token of identical scope.
    pub fn refresh(&self, refresh_token: &str) -> AppResult<IssuedToken> {
        let claims = self.decoder.decode_refresh_token(refresh_token)?;
        let ttl = self
            .access_ttl
            .min(Duration::from_secs(claims.remaining_ttl_seconds()));
        let issued = self.encoder.refresh_access(&claims, ttl)?;
        debug!(subject = %claims.sub, folder_id = %claims.folder_id, "Access token refreshed");
        Ok(issued)
    }

    pub fn decode_access(&self, token: &str) -> AppResult<Claims> {
        Ok(self.decoder.decode_access_token(token)?)
    }

    /// Whether an existing refresh cookie already grants `required` on
    /// `folder_id`. Any undecodable cookie grants nothing.
    pub fn cookie_grants(&self, cookie: Option<&str>, folder_id: &str, required: AccessLevel) -> bool {
        cookie
            .and_then(|token| self.decoder.decode_refresh_token(token).ok())
            .is_some_and(|claims| has_access(&claims, folder_id, required))
    }

    /// Creates or updates the configured administrator with root read-write.
    ///
    /// Does nothing when no admin password is configured.
    pub async fn seed_admin(&self, config: &AuthConfig) -> AppResult<()> {
        if config.admin_password.is_empty() {
            info!("No admin password configured, skipping admin seeding");
            return Ok(());
        }

        let password_hash = self.hasher.hash_password(&config.admin_password)?;
        self.users
            .upsert(UpsertUser {
                username: config.admin_username.clone(),
                email: config.admin_email.clone(),
                password_hash,
                folder_id: ROOT_FOLDER.to_string(),
                access: AccessLevel::ReadWrite,
            })
            .await?;

        info!(username = %config.admin_username, "Admin account seeded");
        Ok(())
    }
}
