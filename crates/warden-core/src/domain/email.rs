//! Email value object.

use crate::WardenError;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidateEmail;

/// Email address, stored trimmed and lowercased.
///
/// Identities are looked up by email, so every email that reaches the store
/// goes through the same normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Normalises and validates an email address.
    pub fn parse(email: impl AsRef<str>) -> Result<Self, WardenError> {
        let email = Self::normalize(email.as_ref());

        if !email.validate_email() {
            return Err(WardenError::validation(format!(
                "Invalid email address: {}",
                email
            )));
        }

        Ok(Self(email))
    }

    /// Wraps an address that came from a trusted source (the relational
    /// store) without validating its format.
    #[must_use]
    pub fn new_unchecked(email: impl AsRef<str>) -> Self {
        Self(Self::normalize(email.as_ref()))
    }

    /// Trim and lowercase.
    #[must_use]
    pub fn normalize(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw address.
    #[must_use]
    pub fn matches(&self, raw: &str) -> bool {
        self.0 == Self::normalize(raw)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = WardenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
