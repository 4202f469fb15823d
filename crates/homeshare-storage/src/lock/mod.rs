//! Per-resource mutual exclusion.

pub mod registry;

pub use registry::{LockGuard, LockRegistry};

/// Registry key for a published file, held while a same-named file is
/// being assembled into the folder.
pub fn file_key(folder_id: &str, file_name: &str) -> String {
    format!("file:{folder_id}/{file_name}")
}

/// Registry key for a chunked transfer.
pub fn transfer_key(transfer_id: &uuid::Uuid) -> String {
    format!("transfer:{transfer_id}")
}
