//! # Matricula Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: token signing configuration
//! - [`cors`]: allowed browser origins
//! - [`email`]: SMTP delivery and the admissions staff inbox
//! - [`rate_limit`]: login throttling
//! - [`school`]: school identity used when provisioning accounts
//! - [`database`]: PostgreSQL connection settings
//! - [`server`]: bind address and log directory
//!
//! # Example
//!
//! ```ignore
//! use matricula_config::{JwtConfig, SchoolConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let school = SchoolConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod email;
pub mod jwt;
pub mod rate_limit;
pub mod school;
pub mod server;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use school::SchoolConfig;
pub use server::ServerConfig;

pub(crate) fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(default)
}
