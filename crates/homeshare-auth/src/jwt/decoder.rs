//! JWT token validation.

use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use thiserror::Error;

use homeshare_core::error::{AppError, ErrorKind};

use super::claims::{Claims, TokenType};

/// Why a presented token was rejected.
///
/// All variants mean "reject the request"; they are kept apart for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("malformed token claims: {0}")]
    MalformedClaims(String),
    #[error("wrong token type: expected {expected:?}")]
    WrongTokenType { expected: TokenType },
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::with_source(ErrorKind::Authentication, err.to_string(), err)
    }
}

/// Validates HS256-signed capability tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from the signing secret.
    pub fn new(secret: &[u8]) -> Self {
        // Pinning HS256 rejects "none" and every asymmetric algorithm.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verifies signature and expiry and returns the typed claims.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                JwtErrorKind::InvalidSignature | JwtErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                _ => TokenError::MalformedClaims(e.to_string()),
            })?;

        let claims = token_data.claims;
        if claims.sub.is_empty() {
            return Err(TokenError::MalformedClaims("empty subject".to_string()));
        }
        if claims.folder_id.is_empty() {
            return Err(TokenError::MalformedClaims("empty folder scope".to_string()));
        }

        Ok(claims)
    }

    /// Decodes a token that must be an access token.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_typed(token, TokenType::Access)
    }

    /// Decodes a token that must be a refresh token.
    pub fn decode_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.decode_typed(token, TokenType::Refresh)
    }

    fn decode_typed(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongTokenType { expected });
        }
        Ok(claims)
    }
}
