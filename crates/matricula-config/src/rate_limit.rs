//! Rate limiting configuration for the login endpoint.
//!
//! Login attempts are throttled per client address with a token bucket:
//!
//! - `RATE_LIMIT_ENABLED`: turn throttling on or off (default: true)
//! - `RATE_LIMIT_LOGIN_PER_SECOND`: tokens replenished per second (default: 1)
//! - `RATE_LIMIT_LOGIN_BURST_SIZE`: bucket capacity (default: 5)
//! - `RATE_LIMIT_TRUST_FORWARDED_FOR`: key on the first `x-forwarded-for`
//!   hop instead of the peer address (default: false). Only enable this
//!   behind a reverse proxy that overwrites the header.

use crate::{env_flag, env_parse};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub login_per_second: u32,
    pub login_burst_size: u32,
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            login_per_second: 1,
            login_burst_size: 5,
            trust_forwarded_for: false,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_flag("RATE_LIMIT_ENABLED", defaults.enabled),
            login_per_second: env_parse("RATE_LIMIT_LOGIN_PER_SECOND", defaults.login_per_second),
            login_burst_size: env_parse("RATE_LIMIT_LOGIN_BURST_SIZE", defaults.login_burst_size),
            trust_forwarded_for: env_flag(
                "RATE_LIMIT_TRUST_FORWARDED_FOR",
                defaults.trust_forwarded_for,
            ),
        }
    }

    /// Throttling switched off, for tests driving the router in-process.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.login_per_second, 1);
        assert_eq!(config.login_burst_size, 5);
        assert!(!config.trust_forwarded_for);
    }

    #[test]
    fn test_disabled_keeps_quota() {
        let config = RateLimitConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.login_burst_size, RateLimitConfig::default().login_burst_size);
    }
}
