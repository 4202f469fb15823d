//! `AuthClaims` extractor: validates the bearer access token.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use homeshare_auth::jwt::Claims;
use homeshare_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Claims of a valid access token presented in the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

impl std::ops::Deref for AuthClaims {
    type Target = Claims;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let claims = state.auth.decode_access(token.trim())?;
        Ok(AuthClaims(claims))
    }
}
