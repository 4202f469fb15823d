//! Password and one-time-password hashing.

pub mod hasher;
pub mod otp;

pub use hasher::PasswordHasher;
pub use otp::OtpHasher;
