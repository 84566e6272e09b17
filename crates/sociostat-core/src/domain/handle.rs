use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_HANDLE_LEN: usize = 64;

/// Validated creator handle (username or channel name).
///
/// A leading `@` is stripped, surrounding whitespace is trimmed, and the
/// remainder must be ASCII alphanumerics plus `.`, `_` or `-`. Case is
/// preserved exactly as supplied, so cache keys built from a handle are
/// case-sensitive even where the upstream provider is not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle(String);

impl Handle {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('@').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyHandle);
        }

        let len = trimmed.chars().count();
        if len > MAX_HANDLE_LEN {
            return Err(ValidationError::HandleTooLong {
                len,
                max: MAX_HANDLE_LEN,
            });
        }

        for (index, ch) in trimmed.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' || ch == '-';
            if !valid {
                return Err(ValidationError::HandleInvalidChar { ch, index });
            }
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Handle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Handle {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Handle {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Handle> for String {
    fn from(value: Handle) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_strips_at_prefix() {
        let parsed = Handle::parse(" @charli.damelio ").expect("handle should parse");
        assert_eq!(parsed.as_str(), "charli.damelio");
    }

    #[test]
    fn preserves_case() {
        let parsed = Handle::parse("MrBeast").expect("handle should parse");
        assert_eq!(parsed.as_str(), "MrBeast");
    }

    #[test]
    fn rejects_empty() {
        let err = Handle::parse("  @ ").expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptyHandle));
    }

    #[test]
    fn rejects_invalid_chars() {
        let err = Handle::parse("user name").expect_err("must fail");
        assert!(matches!(err, ValidationError::HandleInvalidChar { .. }));
    }

    #[test]
    fn rejects_overlong_handles() {
        let long = "a".repeat(MAX_HANDLE_LEN + 1);
        let err = Handle::parse(&long).expect_err("must fail");
        assert!(matches!(err, ValidationError::HandleTooLong { .. }));
    }
}
