//! # homeshare-service
//!
//! Business logic for Homeshare. Each service validates and authorizes
//! its inputs before touching disk or the store, then delegates to the
//! storage, database and auth crates.

pub mod auth;
pub mod files;
pub mod share;
pub mod tasks;
pub mod upload;

pub use auth::AuthService;
pub use files::FileService;
pub use share::SharingService;
pub use tasks::BackgroundTasks;
pub use upload::UploadService;
