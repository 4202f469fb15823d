//! JWT token creation with HMAC-SHA256 signing.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

use homeshare_core::error::AppError;

use super::claims::{Claims, TokenParameters, TokenType};

/// Creates signed access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder").finish_non_exhaustive()
    }
}

/// A single signed token and the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful token pair generation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from the signing secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
        }
    }

    /// Signs a token of the given type carrying `params`.
    pub fn issue(
        &self,
        params: &TokenParameters,
        token_type: TokenType,
    ) -> Result<IssuedToken, AppError> {
        let now = Utc::now();
        let exp = now.timestamp() + params.ttl.as_secs() as i64;

        let claims = Claims {
            sub: params.subject.clone(),
            folder_id: params.folder_id.clone(),
            access: params.access,
            iat: now.timestamp(),
            exp,
            token_type,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode {token_type:?} token: {e}")))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.expires_at(),
        })
    }

    /// Issues an access and a refresh token with independent lifetimes.
    pub fn issue_pair(
        &self,
        access: &TokenParameters,
        refresh: &TokenParameters,
    ) -> Result<TokenPair, AppError> {
        let access_token = self.issue(access, TokenType::Access)?;
        let refresh_token = self.issue(refresh, TokenType::Refresh)?;

        Ok(TokenPair {
            access_token: access_token.token,
            refresh_token: refresh_token.token,
            access_expires_at: access_token.expires_at,
            refresh_expires_at: refresh_token.expires_at,
        })
    }

    /// Issues a fresh access token with exactly the scope of a decoded
    /// refresh token.
    pub fn refresh_access(
        &self,
        refresh_claims: &Claims,
        ttl: std::time::Duration,
    ) -> Result<IssuedToken, AppError> {
        let params = TokenParameters::from_claims(refresh_claims, ttl);
        self.issue(&params, TokenType::Access)
    }
}
