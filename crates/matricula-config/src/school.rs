//! School identity used when provisioning accounts and writing
//! notifications.
//!
//! - `SCHOOL_NAME`: display name in emails (default: "Nalanda School")
//! - `SCHOOL_EMAIL_DOMAIN`: domain of institutional student emails
//!   (default: "nalandaschool.edu")
//! - `DEFAULT_COUNTRY`: country filled into addresses that omit it
//!   (default: "India")

use std::env;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchoolConfig {
    pub name: String,
    pub email_domain: String,
    pub default_country: String,
}

impl Default for SchoolConfig {
    fn default() -> Self {
        Self {
            name: "Nalanda School".to_string(),
            email_domain: "nalandaschool.edu".to_string(),
            default_country: "India".to_string(),
        }
    }
}

impl SchoolConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            name: env::var("SCHOOL_NAME").unwrap_or(defaults.name),
            email_domain: env::var("SCHOOL_EMAIL_DOMAIN").unwrap_or(defaults.email_domain),
            default_country: env::var("DEFAULT_COUNTRY").unwrap_or(defaults.default_country),
        }
    }

    /// Institutional address derived from a roll number.
    pub fn student_email(&self, roll_number: &str) -> String {
        format!("{}@{}", roll_number.to_lowercase(), self.email_domain)
    }
}
