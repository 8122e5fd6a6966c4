//! Validated domain primitives.

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::{ValidateEmail, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueTypeError {
    InvalidEmail(String),
}

impl std::error::Error for ValueTypeError {}

impl fmt::Display for ValueTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
        }
    }
}

/// A syntactically valid email address, trimmed and lower-cased.
///
/// Contact emails are the natural key of parent accounts, so two spellings
/// of the same address must normalize to one value.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[schema(value_type = String, format = "email", example = "parent@example.com")]
pub struct Email(String);

impl Email {
    pub fn new(email: impl AsRef<str>) -> Result<Self, ValueTypeError> {
        let normalized = email.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ValueTypeError::InvalidEmail("email is empty".to_string()));
        }
        if !normalized.validate_email() {
            return Err(ValueTypeError::InvalidEmail(normalized));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Email({})", self.0)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Roll numbers are ASCII letters and digits only. They double as a login
/// identifier (so no `@`) and derive the lower-cased institutional email, so
/// two roll numbers differing only in case count as the same one.
pub fn valid_roll_number(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Ok(());
    }
    let mut err = ValidationError::new("roll_number");
    err.message = Some(Cow::Borrowed(
        "Roll number may only contain letters and digits",
    ));
    Err(err)
}
