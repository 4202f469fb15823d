//! Scheduled maintenance for Homeshare.
//!
//! Two sweeps run on fixed intervals:
//! - expired share records are deleted from the store
//! - shared folders whose name-encoded expiry has passed are deleted from disk
//!
//! The sweeps are independent. A folder may briefly outlive its record or
//! the other way round; both converge on the next run.

pub mod jobs;
pub mod scheduler;

pub use jobs::ExpiryCleanupJob;
pub use scheduler::CronScheduler;
