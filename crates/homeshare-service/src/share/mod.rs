//! Time-boxed, OTP-protected folder sharing.

pub mod service;

pub use service::{CreateShareRequest, CreatedShare, RedeemedShare, SharingService};
