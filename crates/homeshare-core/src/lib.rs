//! # homeshare-core
//!
//! Core crate for Homeshare. Contains the configuration schema and the
//! unified error system shared by every other crate.
//!
//! This crate has **no** internal dependencies on other Homeshare crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
