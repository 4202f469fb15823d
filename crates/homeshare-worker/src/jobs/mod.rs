//! Job bodies run by the scheduler.

pub mod cleanup;

pub use cleanup::ExpiryCleanupJob;
