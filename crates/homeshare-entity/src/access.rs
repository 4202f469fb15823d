//! Access level lattice.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access level carried by a capability.
///
/// Not a total order: `ReadWrite` covers both `Read` and `Write`, but
/// `Read` and `Write` do not cover each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "access_level")]
pub enum AccessLevel {
    #[serde(rename = "r")]
    #[sqlx(rename = "r")]
    Read,
    #[serde(rename = "w")]
    #[sqlx(rename = "w")]
    Write,
    #[serde(rename = "rw")]
    #[sqlx(rename = "rw")]
    ReadWrite,
}

impl AccessLevel {
    /// Whether a holder of `self` may perform an operation needing `required`.
    pub fn satisfies(self, required: AccessLevel) -> bool {
        match required {
            Self::Read => matches!(self, Self::Read | Self::ReadWrite),
            Self::Write => matches!(self, Self::Write | Self::ReadWrite),
            Self::ReadWrite => self == Self::ReadWrite,
        }
    }

    /// Wire form: `"r"`, `"w"` or `"rw"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::Write => "w",
            Self::ReadWrite => "rw",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = homeshare_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(Self::Read),
            "w" => Ok(Self::Write),
            "rw" => Ok(Self::ReadWrite),
            _ => Err(homeshare_core::AppError::validation(format!(
                "Invalid access level: {s}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_covers_both() {
        assert!(AccessLevel::ReadWrite.satisfies(AccessLevel::Read));
        assert!(AccessLevel::ReadWrite.satisfies(AccessLevel::Write));
        assert!(AccessLevel::ReadWrite.satisfies(AccessLevel::ReadWrite));
    }

    #[test]
    fn test_read_and_write_are_incomparable() {
        assert!(!AccessLevel::Read.satisfies(AccessLevel::Write));
        assert!(!AccessLevel::Write.satisfies(AccessLevel::Read));
        assert!(!AccessLevel::Read.satisfies(AccessLevel::ReadWrite));
        assert!(!AccessLevel::Write.satisfies(AccessLevel::ReadWrite));
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(serde_json::to_string(&AccessLevel::ReadWrite).unwrap(), "\"rw\"");
        let parsed: AccessLevel = serde_json::from_str("\"w\"").unwrap();
        assert_eq!(parsed, AccessLevel::Write);
        assert!("x".parse::<AccessLevel>().is_err());
        assert!(serde_json::from_str::<AccessLevel>("\"admin\"").is_err());
    }
}
