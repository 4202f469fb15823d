//! Argon2id digests for share one-time passwords.
//!
//! Each share record carries its own salt; the digest is the PHC string
//! produced by hashing the OTP with that salt.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString},
};
use rand::RngCore;

use homeshare_core::error::AppError;
use homeshare_core::result::AppResult;

/// Produces and checks salted Argon2id OTP digests.
#[derive(Debug, Clone, Default)]
pub struct OtpHasher;

impl OtpHasher {
    pub fn new() -> Self {
        Self
    }

    /// A fresh 16-byte salt in the unpadded base64 form Argon2 expects.
    pub fn generate_salt(&self) -> AppResult<String> {
        let mut salt = [0u8; 16];
        rand::rng().fill_bytes(&mut salt);
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| AppError::internal(format!("Salt encoding failed: {e}")))?;
        Ok(salt.as_str().to_string())
    }

    pub fn hash(&self, otp: &str, salt: &str) -> AppResult<String> {
        let salt = SaltString::from_b64(salt)
            .map_err(|e| AppError::internal(format!("Invalid OTP salt: {e}")))?;
        let hash = Argon2::default()
            .hash_password(otp.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("OTP hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Checks `otp` against a stored digest that must have been made with `salt`.
    ///
    /// Argon2 compares the outputs in constant time.
    pub fn verify(&self, otp: &str, salt: &str, expected_hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(expected_hash)
            .map_err(|e| AppError::internal(format!("Invalid OTP hash format: {e}")))?;

        if parsed.salt.map(|s| s.as_str()) != Some(salt) {
            return Ok(false);
        }

        match Argon2::default().verify_password(otp.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!("OTP verification failed: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_argon2_with_record_salt() {
        let hasher = OtpHasher::new();
        let salt = hasher.generate_salt().unwrap();
        let digest = hasher.hash("123456", &salt).unwrap();

        assert!(digest.starts_with("$argon2id$"));
        let parsed = PasswordHash::new(&digest).unwrap();
        assert_eq!(parsed.salt.unwrap().as_str(), salt);
        assert_eq!(hasher.hash("123456", &salt).unwrap(), digest);
    }

    #[test]
    fn test_salt_is_random() {
        let hasher = OtpHasher::new();
        let a = hasher.generate_salt().unwrap();
        let b = hasher.generate_salt().unwrap();
        assert_eq!(a.len(), 22);
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify() {
        let hasher = OtpHasher::new();
        let salt = hasher.generate_salt().unwrap();
        let other_salt = hasher.generate_salt().unwrap();
        let digest = hasher.hash("123456", &salt).unwrap();

        assert!(hasher.verify("123456", &salt, &digest).unwrap());
        assert!(!hasher.verify("654321", &salt, &digest).unwrap());
        assert!(!hasher.verify("123456", &other_salt, &digest).unwrap());
    }

    #[test]
    fn test_fast_digest_is_not_accepted() {
        let hasher = OtpHasher::new();
        let salt = hasher.generate_salt().unwrap();
        assert!(hasher.verify("123456", &salt, "8d969eef6ecad3c29a3a629280e686cf").is_err());
    }
}
