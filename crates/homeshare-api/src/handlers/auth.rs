//! Auth handlers: login, refresh, logout.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar};

use homeshare_core::error::AppError;

use crate::dto::request::LoginRequest;
use crate::dto::response::{AccessTokenResponse, LoginResponse, MessageResponse};
use crate::error::{ApiError, validate_request};
use crate::handlers::refresh_cookie;
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    validate_request(&req)?;

    let outcome = state.auth.login(&req.username, &req.password).await?;
    let jar = jar.add(refresh_cookie(
        &state.refresh_cookie,
        outcome.tokens.refresh_token,
        outcome.tokens.refresh_expires_at,
    ));

    Ok((
        jar,
        Json(LoginResponse {
            access_token: outcome.tokens.access_token,
            folder_id: outcome.folder_id,
            access: outcome.access,
        }),
    ))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let token = jar
        .get(&state.refresh_cookie)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::authentication("Missing refresh cookie"))?;

    let issued = state.auth.refresh(&token)?;

    Ok(Json(AccessTokenResponse {
        access_token: issued.token,
        expires_at: issued.expires_at,
    }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(
        Cookie::build((state.refresh_cookie.clone(), ""))
            .path("/")
            .secure(true),
    );
    (
        jar,
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
}
