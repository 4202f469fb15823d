//! # homeshare-entity
//!
//! Domain entity models for Homeshare. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities additionally derive `sqlx::FromRow`.

pub mod access;
pub mod folder;
pub mod share;
pub mod user;

pub use access::AccessLevel;
