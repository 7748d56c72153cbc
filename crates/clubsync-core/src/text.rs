//! # Validated Text Primitives
//!
//! Form fields are validated through constructors: [`RequiredText`] for
//! trimmed, bounded, non-empty strings and [`Email`] for normalized
//! addresses.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Maximum length of a person or club name.
pub const MAX_NAME_LEN: usize = 120;

/// Maximum length of a title.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum length of long-form text (notes, descriptions).
pub const MAX_BODY_LEN: usize = 10_000;

/// Maximum length of an email address (RFC 5321 path limit).
pub const MAX_EMAIL_LEN: usize = 254;

/// A trimmed, non-empty string with a length ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequiredText(String);

impl RequiredText {
    /// Validate `value` as the content of `field`.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Required`] when blank after trimming,
    /// [`ValidationError::TooLong`] when longer than `max` characters.
    pub fn new(field: &'static str, value: &str, max: usize) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required { field });
        }
        if trimmed.chars().count() > max {
            return Err(ValidationError::TooLong { field, max });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for RequiredText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize an optional free-text field: blank becomes `None`.
///
/// # Errors
///
/// [`ValidationError::TooLong`] when the trimmed value exceeds `max`.
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong { field, max }),
        Some(v) => Ok(Some(v.to_string())),
    }
}

/// A lowercase-normalized email address.
///
/// Only the shape is checked: one `@`, a non-empty local part, and a domain
/// with at least one interior dot. Deliverability is not our concern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse and normalize an email address.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Required`] for blank input,
    /// [`ValidationError::InvalidEmail`] for malformed input.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required { field: "email" });
        }
        if trimmed.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        }
        let invalid = || ValidationError::InvalidEmail(trimmed.to_string());
        let (local, domain) = trimmed.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.contains('@') || trimmed.chars().any(char::is_whitespace) {
            return Err(invalid());
        }
        let dot = domain.find('.').ok_or_else(invalid)?;
        if dot == 0 || domain.ends_with('.') {
            return Err(invalid());
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Access the normalized address.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims() {
        let t = RequiredText::new("title", "  Weekly sync  ", MAX_TITLE_LEN).unwrap();
        assert_eq!(t.as_str(), "Weekly sync");
    }

    #[test]
    fn required_text_rejects_blank() {
        assert_eq!(
            RequiredText::new("title", "   ", MAX_TITLE_LEN).unwrap_err(),
            ValidationError::Required { field: "title" }
        );
    }

    #[test]
    fn required_text_counts_chars_not_bytes() {
        let s = "é".repeat(5);
        assert!(RequiredText::new("name", &s, 5).is_ok());
        assert!(RequiredText::new("name", &s, 4).is_err());
    }

    #[test]
    fn optional_text_blank_is_none() {
        assert_eq!(optional_text("location", Some("  "), 10).unwrap(), None);
        assert_eq!(optional_text("location", None, 10).unwrap(), None);
        assert_eq!(
            optional_text("location", Some(" Room 4 "), 10).unwrap(),
            Some("Room 4".to_string())
        );
        assert!(optional_text("location", Some("a very long room"), 10).is_err());
    }

    #[test]
    fn email_normalizes_case() {
        let e = Email::parse(" Ada@Example.ORG ").unwrap();
        assert_eq!(e.as_str(), "ada@example.org");
    }

    #[test]
    fn email_rejects_malformed() {
        for bad in [
            "plainaddress",
            "@example.com",
            "a@b",
            "a@.com",
            "a@b.",
            "a@@b.com",
            "a b@c.com",
        ] {
            assert!(Email::parse(bad).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn email_blank_is_required_error() {
        assert_eq!(
            Email::parse("").unwrap_err(),
            ValidationError::Required { field: "email" }
        );
    }
}
