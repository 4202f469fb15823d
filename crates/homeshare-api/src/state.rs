//! Application state shared across all handlers.

use std::sync::Arc;

use homeshare_service::{AuthService, FileService, SharingService, UploadService};

/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub sharing: Arc<SharingService>,
    pub uploads: Arc<UploadService>,
    pub files: Arc<FileService>,
    /// Name of the HTTP-only cookie carrying the refresh token.
    pub refresh_cookie: String,
    /// Largest accepted request body on the upload route.
    pub upload_body_limit: usize,
}
