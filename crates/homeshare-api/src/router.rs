//! Route definitions for the Homeshare HTTP API.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete router with every route and layer.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(share_routes())
        .merge(upload_routes(state.upload_body_limit))
        .merge(folder_routes());

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
}

fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/shares", post(handlers::share::create_share))
        .route("/shares/redeem", post(handlers::share::redeem_share))
        .route("/shares/{link_id}", delete(handlers::share::revoke_share))
}

fn upload_routes(body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/uploads", post(handlers::upload::upload_chunk))
        .layer(DefaultBodyLimit::max(body_limit))
}

fn folder_routes() -> Router<AppState> {
    Router::new()
        .route("/folders/{folder_id}/files", get(handlers::folder::list_files))
        .route(
            "/folders/{folder_id}/files/{file_name}",
            get(handlers::folder::download_file),
        )
        .route(
            "/folders/{folder_id}/files/{file_name}/available",
            get(handlers::folder::check_available),
        )
}
