//! Session identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`SessionId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionIdError {
    /// The input string is empty.
    #[error("session id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("session id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[A-Za-z0-9_-]`.
    #[error("session id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Opaque, client-supplied session identifier.
///
/// The browser client mints an identifier on first contact and repeats it on
/// every step. The server treats it as an opaque key into the session store;
/// validation only bounds its shape so it is safe to log and embed in
/// provider metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Maximum accepted identifier length.
    pub const MAX_LENGTH: usize = 128;

    /// Parse a `SessionId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, or contains
    /// characters outside `[A-Za-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, SessionIdError> {
        if s.is_empty() {
            return Err(SessionIdError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SessionIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if let Some(bad) = s
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(SessionIdError::InvalidCharacter(bad));
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(SessionId::parse("abc-123_XYZ").is_ok());
        assert!(SessionId::parse("f81d4fae-7dec-11d0-a765-00a0c91e6bf6").is_ok());
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(SessionId::parse(""), Err(SessionIdError::Empty));
        assert!(matches!(
            SessionId::parse("has space"),
            Err(SessionIdError::InvalidCharacter(' '))
        ));
        assert!(matches!(
            SessionId::parse(&"x".repeat(200)),
            Err(SessionIdError::TooLong { max: 128 })
        ));
    }

    #[test]
    fn test_display_round_trip() {
        let id = SessionId::parse("session-42").expect("valid");
        assert_eq!(id.to_string(), "session-42");
        assert_eq!(id.as_str(), "session-42");
    }
}
