//! National identifier (CPF) normalization.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{OccupancyError, OccupancyResult};

/// An 11-digit national identifier in canonical digits-only form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NationalId(String);

impl NationalId {
    /// Number of digits in a valid identifier.
    pub const LEN: usize = 11;

    /// Normalize a masked or bare identifier, e.g. `"123.456.789-00"`.
    pub fn parse(raw: &str) -> OccupancyResult<Self> {
        let digits = digits_only(raw);
        if digits.len() != Self::LEN {
            return Err(OccupancyError::validation(format!(
                "Invalid CPF: expected {} digits, got {}",
                Self::LEN,
                digits.len()
            )));
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Project a string onto its ASCII digits.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_and_bare_are_equal() {
        let masked = NationalId::parse("123.456.789-00").unwrap();
        let bare = NationalId::parse("12345678900").unwrap();
        assert_eq!(masked, bare);
        assert_eq!(masked.as_str(), "12345678900");
    }

    #[test]
    fn test_wrong_length_rejected() {
        for raw in ["", "1234567890", "123456789012", "abc.def.ghi-jk"] {
            let err = NationalId::parse(raw).unwrap_err();
            assert!(matches!(err, OccupancyError::Validation(_)), "{raw}");
        }
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = NationalId::parse("987.654.321-00").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"98765432100\"");
    }
}
