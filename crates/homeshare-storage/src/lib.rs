//! # homeshare-storage
//!
//! Filesystem-side building blocks for Homeshare: the per-key lock
//! registry, chunk staging and reassembly, the shared folder naming
//! scheme and its expiry sweep, and folder listings.

pub mod chunked;
pub mod layout;
pub mod listing;
pub mod lock;
pub mod shared;
pub mod validation;

pub use chunked::{AssemblyJob, AssemblyOutcome, ChunkAssembler, ChunkPosition, ChunkStore};
pub use layout::StorageLayout;
pub use lock::{LockGuard, LockRegistry};
pub use shared::{SharedFolderName, sweep_expired_folders};
