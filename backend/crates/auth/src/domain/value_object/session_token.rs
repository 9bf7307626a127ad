//! Session Token Value Object
//!
//! Opaque, unguessable identifier of a server-side session. It is the only
//! thing the client holds (in the session cookie).

use std::fmt;

use platform::crypto::random_token;

/// Random bytes per token (256 bits)
const TOKEN_BYTES: usize = 32;

/// Encoded length: base64url without padding
const TOKEN_LEN: usize = 43;

/// Session token value object
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh random token
    pub fn generate() -> Self {
        Self(random_token(TOKEN_BYTES))
    }

    /// Accept a token presented by a client
    ///
    /// Anything that could not have been generated here is rejected without
    /// touching the store.
    pub fn parse(raw: &str) -> Option<Self> {
        let well_formed = raw.len() == TOKEN_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

        well_formed.then(|| Self(raw.to_string()))
    }

    /// Restore from the store (trusted)
    pub fn from_db(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Enough to correlate log lines, not enough to hijack
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "SessionToken({prefix}…)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_parses() {
        let token = SessionToken::generate();
        assert_eq!(token.as_str().len(), TOKEN_LEN);
        assert_eq!(SessionToken::parse(token.as_str()), Some(token));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(SessionToken::parse("").is_none());
        assert!(SessionToken::parse("short").is_none());
        assert!(SessionToken::parse(&"a".repeat(TOKEN_LEN + 1)).is_none());
        assert!(SessionToken::parse(&format!("{}=", "a".repeat(TOKEN_LEN - 1))).is_none());
    }

    #[test]
    fn test_debug_is_truncated() {
        let token = SessionToken::generate();
        let debug = format!("{:?}", token);
        assert!(!debug.contains(token.as_str()));
    }
}
