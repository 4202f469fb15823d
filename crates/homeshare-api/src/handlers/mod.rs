//! Request handlers grouped by resource.

pub mod auth;
pub mod folder;
pub mod health;
pub mod share;
pub mod upload;

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use time::OffsetDateTime;

/// The HTTP-only refresh cookie, expiring together with its token.
pub(crate) fn refresh_cookie(
    name: &str,
    token: String,
    expires_at: DateTime<Utc>,
) -> Cookie<'static> {
    let max_age = (expires_at - Utc::now()).num_seconds().max(0);
    Cookie::build((name.to_string(), token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(max_age))
        .expires(OffsetDateTime::from_unix_timestamp(expires_at.timestamp()).ok())
        .build()
}
