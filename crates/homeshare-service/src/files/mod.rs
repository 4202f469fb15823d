//! Folder listings and downloads.

pub mod service;

pub use service::{DownloadHandle, FileService};
