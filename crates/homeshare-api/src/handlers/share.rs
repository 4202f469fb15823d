//! Share handlers: create, revoke, redeem.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use homeshare_core::error::{AppError, ErrorKind};
use homeshare_service::share::CreateShareRequest as SvcCreateShare;

use crate::dto::request::{CreateShareRequest, RedeemShareRequest};
use crate::dto::response::{ShareCreatedResponse, ShareRedeemedResponse};
use crate::error::{ApiError, validate_request};
use crate::extractors::AuthClaims;
use crate::handlers::refresh_cookie;
use crate::state::AppState;

/// POST /api/shares
pub async fn create_share(
    State(state): State<AppState>,
    auth: AuthClaims,
    Json(req): Json<CreateShareRequest>,
) -> Result<(StatusCode, Json<ShareCreatedResponse>), ApiError> {
    validate_request(&req)?;

    let created = state
        .sharing
        .create_share(
            &auth,
            SvcCreateShare {
                folder_name: req.folder_name,
                otp: req.otp,
                access: req.access,
                expires_at: req.expiration_date,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ShareCreatedResponse {
            link_id: created.link_id,
            folder_id: created.folder_id,
            expires_at: created.expires_at,
        }),
    ))
}

/// DELETE /api/shares/{link_id}
pub async fn revoke_share(
    State(state): State<AppState>,
    auth: AuthClaims,
    Path(link_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sharing.revoke_share(&auth, &link_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/shares/redeem
///
/// An unknown link answers exactly like a wrong OTP.
pub async fn redeem_share(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RedeemShareRequest>,
) -> Result<(CookieJar, Json<ShareRedeemedResponse>), ApiError> {
    validate_request(&req)?;

    let redeemed = state
        .sharing
        .redeem_share(&req.link_url, &req.otp)
        .await
        .map_err(|e| match e.kind {
            ErrorKind::NotFound | ErrorKind::Authentication => {
                AppError::authentication("Invalid link or OTP")
            }
            _ => e,
        })?;

    let existing = jar.get(&state.refresh_cookie).map(|c| c.value());
    let jar = if state
        .auth
        .cookie_grants(existing, &redeemed.folder_id, redeemed.access)
    {
        jar
    } else {
        jar.add(refresh_cookie(
            &state.refresh_cookie,
            redeemed.tokens.refresh_token,
            redeemed.tokens.refresh_expires_at,
        ))
    };

    Ok((
        jar,
        Json(ShareRedeemedResponse {
            access_token: redeemed.tokens.access_token,
            folder_id: redeemed.folder_id,
            access: redeemed.access,
        }),
    ))
}
