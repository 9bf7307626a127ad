//! Email Value Object
//!
//! Represents a syntactically valid email address.
//! Basic validation only - deliverability is not checked.
//!
//! The address is stored exactly as entered (apart from surrounding
//! whitespace), so uniqueness is case-sensitive on the stored value.

use kernel::error::field::FieldErrors;
use std::fmt;

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

/// Maximum local part length (per RFC 5321)
const LOCAL_PART_MAX_LENGTH: usize = 64;

const FIELD: &str = "email";

/// Email address value object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Create a new email with validation
    pub fn new(email: &str) -> Result<Self, FieldErrors> {
        let email = email.trim();

        if email.is_empty() {
            return Err(FieldErrors::single(FIELD, "Email is required"));
        }

        if email.len() > EMAIL_MAX_LENGTH {
            return Err(FieldErrors::single(
                FIELD,
                format!("Email must be at most {} characters", EMAIL_MAX_LENGTH),
            ));
        }

        if !Self::is_valid_format(email) {
            return Err(FieldErrors::single(FIELD, "Invalid email format"));
        }

        Ok(Self(email.to_string()))
    }

    /// Basic email format validation
    fn is_valid_format(email: &str) -> bool {
        // Must contain exactly one @
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        if domain.contains('@') {
            return false;
        }

        // Local part checks
        if local.is_empty() || local.len() > LOCAL_PART_MAX_LENGTH {
            return false;
        }
        if local.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return false;
        }

        // Domain checks
        if domain.is_empty() || !domain.contains('.') || domain.contains("..") {
            return false;
        }

        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return false;
        }

        // Domain shouldn't start or end with dot or hyphen
        if domain.starts_with('.') || domain.ends_with('.') {
            return false;
        }
        if domain.starts_with('-') || domain.ends_with('-') {
            return false;
        }

        true
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Get the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(Email::new("alice@example.com").is_ok());
        assert!(Email::new("user.name@example.co.jp").is_ok());
        assert!(Email::new("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_email_invalid() {
        assert!(Email::new("").is_err());
        assert!(Email::new("   ").is_err());
        assert!(Email::new("userexample.com").is_err());
        assert!(Email::new("user@").is_err());
        assert!(Email::new("@example.com").is_err());
        assert!(Email::new("user@@example.com").is_err());
        assert!(Email::new("user@example").is_err());
        assert!(Email::new("user@exa..mple.com").is_err());
        assert!(Email::new("us er@example.com").is_err());
        assert!(Email::new("user@-example.com").is_err());
    }

    #[test]
    fn test_email_too_long() {
        let email = format!("{}@example.com", "a".repeat(250));
        let err = Email::new(&email).unwrap_err();
        assert!(err.contains("email"));
    }

    #[test]
    fn test_case_is_preserved() {
        let email = Email::new("Alice@Example.COM").unwrap();
        assert_eq!(email.as_str(), "Alice@Example.COM");
        assert_ne!(email, Email::new("alice@example.com").unwrap());
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let email = Email::new("  alice@example.com \n").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn test_error_names_the_field_without_echoing_input() {
        let err = Email::new("not-an-email").unwrap_err();
        let first = err.iter().next().unwrap();
        assert_eq!(first.field, "email");
        assert!(!first.message.contains("not-an-email"));
    }
}
