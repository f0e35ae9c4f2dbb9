//! Validated domain name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`DomainName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The input string is empty.
    #[error("domain cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("domain must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// A label (dot-separated segment) is empty.
    #[error("domain labels cannot be empty")]
    EmptyLabel,
    /// A label exceeds the per-label length limit.
    #[error("domain labels must be at most {max} characters")]
    LabelTooLong {
        /// Maximum allowed label length.
        max: usize,
    },
    /// A label starts or ends with a hyphen.
    #[error("domain labels cannot start or end with a hyphen")]
    HyphenAtLabelEdge,
    /// The input contains a character outside `[a-z0-9-.]`.
    #[error("domain contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// The domain has no TLD, or the TLD is not 2+ alphabetic characters.
    #[error("domain must end in a valid top-level domain")]
    InvalidTld,
}

/// A registrable domain name.
///
/// Validates on construction so handlers and provider clients never hold a
/// syntactically invalid domain. Input is lowercased; no punycode handling
/// is performed (non-ASCII input is rejected).
///
/// ## Constraints
///
/// - Overall length: 1-253 characters
/// - At least two labels; each label 1-63 characters
/// - Labels may not start or end with a hyphen
/// - Characters limited to `a-z`, `0-9`, `-` and the `.` separator
/// - TLD must be 2+ alphabetic characters
///
/// ## Examples
///
/// ```
/// use pagewright_core::DomainName;
///
/// assert!(DomainName::parse("example.com").is_ok());
/// assert!(DomainName::parse("my-bakery.co.uk").is_ok());
///
/// assert!(DomainName::parse("").is_err());            // empty
/// assert!(DomainName::parse("no dots com").is_err()); // spaces
/// assert!(DomainName::parse(".example.com").is_err()); // leading dot
/// assert!(DomainName::parse("-bad.com").is_err());     // leading hyphen
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct DomainName(String);

impl DomainName {
    /// Maximum overall length of a domain name (RFC 1035).
    pub const MAX_LENGTH: usize = 253;

    /// Maximum length of a single label (RFC 1035).
    pub const MAX_LABEL_LENGTH: usize = 63;

    /// Parse a `DomainName` from a string.
    ///
    /// The input is trimmed and lowercased before validation.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] describing the first constraint violated.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let normalized = s.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(DomainError::Empty);
        }

        if normalized.len() > Self::MAX_LENGTH {
            return Err(DomainError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(bad) = normalized
            .chars()
            .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '.'))
        {
            return Err(DomainError::InvalidCharacter(bad));
        }

        let labels: Vec<&str> = normalized.split('.').collect();
        if labels.len() < 2 {
            return Err(DomainError::InvalidTld);
        }

        for label in &labels {
            if label.is_empty() {
                return Err(DomainError::EmptyLabel);
            }
            if label.len() > Self::MAX_LABEL_LENGTH {
                return Err(DomainError::LabelTooLong {
                    max: Self::MAX_LABEL_LENGTH,
                });
            }
            if label.starts_with('-') || label.ends_with('-') {
                return Err(DomainError::HyphenAtLabelEdge);
            }
        }

        // Last label is the TLD: 2+ alphabetic characters.
        let tld = labels.last().copied().unwrap_or_default();
        if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(DomainError::InvalidTld);
        }

        Ok(Self(normalized))
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `www` subdomain for this domain, e.g. `www.example.com`.
    #[must_use]
    pub fn www(&self) -> String {
        format!("www.{}", self.0)
    }

    /// Returns the leftmost label, e.g. `example` for `example.com`.
    ///
    /// Useful for deriving hosting unit names.
    #[must_use]
    pub fn first_label(&self) -> &str {
        self.0.split('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for DomainName {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_domains() {
        for d in [
            "example.com",
            "my-bakery.co.uk",
            "a.io",
            "xn--test.com",
            "sub.domain.example.org",
            "123numbers.net",
        ] {
            assert!(DomainName::parse(d).is_ok(), "expected valid: {d}");
        }
    }

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let d = DomainName::parse("  Example.COM ").expect("valid");
        assert_eq!(d.as_str(), "example.com");
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(DomainName::parse(""), Err(DomainError::Empty));
        assert_eq!(DomainName::parse("   "), Err(DomainError::Empty));
    }

    #[test]
    fn test_rejects_spaces() {
        assert!(matches!(
            DomainName::parse("my bakery.com"),
            Err(DomainError::InvalidCharacter(' '))
        ));
    }

    #[test]
    fn test_rejects_leading_dot() {
        assert_eq!(
            DomainName::parse(".example.com"),
            Err(DomainError::EmptyLabel)
        );
    }

    #[test]
    fn test_rejects_trailing_dot() {
        assert_eq!(
            DomainName::parse("example.com."),
            Err(DomainError::EmptyLabel)
        );
    }

    #[test]
    fn test_rejects_double_dot() {
        assert_eq!(
            DomainName::parse("example..com"),
            Err(DomainError::EmptyLabel)
        );
    }

    #[test]
    fn test_rejects_hyphen_at_label_edge() {
        assert_eq!(
            DomainName::parse("-bad.com"),
            Err(DomainError::HyphenAtLabelEdge)
        );
        assert_eq!(
            DomainName::parse("bad-.com"),
            Err(DomainError::HyphenAtLabelEdge)
        );
    }

    #[test]
    fn test_interior_double_hyphen_is_allowed() {
        // Double hyphens are legal inside a label (punycode uses them).
        assert!(DomainName::parse("xn--caf-dma.com").is_ok());
    }

    #[test]
    fn test_rejects_missing_tld() {
        assert_eq!(DomainName::parse("localhost"), Err(DomainError::InvalidTld));
    }

    #[test]
    fn test_rejects_numeric_tld() {
        assert_eq!(
            DomainName::parse("example.123"),
            Err(DomainError::InvalidTld)
        );
        assert_eq!(DomainName::parse("example.c"), Err(DomainError::InvalidTld));
    }

    #[test]
    fn test_rejects_long_label() {
        let long = format!("{}.com", "a".repeat(64));
        assert_eq!(
            DomainName::parse(&long),
            Err(DomainError::LabelTooLong { max: 63 })
        );
    }

    #[test]
    fn test_rejects_overlong_domain() {
        let long = format!("{}.com", "a.".repeat(150));
        assert_eq!(
            DomainName::parse(&long),
            Err(DomainError::TooLong { max: 253 })
        );
    }

    #[test]
    fn test_www_and_first_label() {
        let d = DomainName::parse("mybakery.co.uk").expect("valid");
        assert_eq!(d.www(), "www.mybakery.co.uk");
        assert_eq!(d.first_label(), "mybakery");
    }

    #[test]
    fn test_serde_transparent() {
        let d = DomainName::parse("example.com").expect("valid");
        let json = serde_json::to_string(&d).expect("serialize");
        assert_eq!(json, "\"example.com\"");
    }
}
