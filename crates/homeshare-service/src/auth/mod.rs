//! Password login and token rotation.

pub mod service;

pub use service::{AuthService, LoginOutcome};
