//! # homeshare-auth
//!
//! Capability tokens and the checks built on them.
//!
//! ## Modules
//!
//! - `jwt`: signed claims issuance, decoding and refresh
//! - `acl`: the hierarchical folder/access-level evaluator
//! - `password`: Argon2id login passwords and salted OTP digests
//! - `secret`: loading or provisioning the token signing secret

pub mod acl;
pub mod jwt;
pub mod password;
pub mod secret;

pub use acl::{has_access, require_access};
pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenError, TokenPair, TokenParameters, TokenType};
pub use password::{OtpHasher, PasswordHasher};
