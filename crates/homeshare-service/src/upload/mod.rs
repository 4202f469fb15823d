//! Chunked upload intake.

pub mod service;

pub use service::{ChunkReceipt, ChunkSubmission, UploadService};
