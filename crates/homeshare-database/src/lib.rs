//! # homeshare-database
//!
//! PostgreSQL connection management, embedded migrations, and the
//! share/user stores. Services depend on the [`ShareStore`] and
//! [`UserStore`] traits; the `memory` module provides process-local
//! implementations of both.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::{MemoryShareStore, MemoryUserStore};
pub use repositories::{ShareRepository, UserRepository};
pub use store::{ShareStore, UserStore};
