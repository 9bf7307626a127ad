//! User Password Value Object
//!
//! Domain wrapper around `platform::password`:
//! - [`RawPassword`] is the user's input, checked against the configured
//!   policy and zeroized on drop.
//! - [`UserPassword`] is the stored Argon2id hash. It is never serialized
//!   into any response type.
//!
//! ## Usage
//! ```rust
//! use auth::domain::value_object::user_password::{RawPassword, UserPassword};
//! use platform::password::PasswordPolicy;
//!
//! let raw = RawPassword::new("Secret123!".to_string(), &PasswordPolicy::default()).unwrap();
//! let hashed = UserPassword::from_raw(&raw, None).unwrap();
//! assert!(hashed.verify(&raw, None));
//! ```

use kernel::error::field::FieldErrors;
use platform::password::{
    ClearTextPassword, HashedPassword, PasswordHashError, PasswordPolicy, PasswordPolicyError,
};
use std::fmt;

const FIELD: &str = "password";

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Create a new raw password, checked against `policy`
    ///
    /// ## Errors
    /// Field-level errors under `password`; the input is never echoed.
    pub fn new(raw: String, policy: &PasswordPolicy) -> Result<Self, FieldErrors> {
        let clear_text = ClearTextPassword::new(raw, policy).map_err(|e| match e {
            PasswordPolicyError::Empty => FieldErrors::single(FIELD, "Password is required"),
            PasswordPolicyError::TooShort { min, .. } => FieldErrors::single(
                FIELD,
                format!("Password must be at least {} characters", min),
            ),
            PasswordPolicyError::TooLong { max, .. } => FieldErrors::single(
                FIELD,
                format!("Password must be at most {} bytes", max),
            ),
        })?;

        Ok(Self(clear_text))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Stored Hash)
// ============================================================================

/// Argon2id hash of a user's password
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a raw password (salted, one-way)
    ///
    /// CPU-heavy; async callers should run this on a blocking thread.
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> Result<Self, PasswordHashError> {
        raw.inner().hash(pepper).map(Self)
    }

    /// Restore from the stored PHC string
    pub fn from_db(phc: impl Into<String>) -> Result<Self, PasswordHashError> {
        HashedPassword::from_phc_string(phc).map(Self)
    }

    /// Constant-time verification
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }

    /// PHC string for storage
    pub fn as_str(&self) -> &str {
        self.0.as_phc_string()
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UserPassword").field(&"[HASH]").finish()
    }
}
