//! Time-boxed shared folders.

pub mod duration;
pub mod name;
pub mod sweep;

pub use name::SharedFolderName;
pub use sweep::{FolderSweepReport, sweep_expired_folders};
