use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use matricula_config::{
    CorsConfig, DatabaseConfig, EmailConfig, JwtConfig, RateLimitConfig, SchoolConfig,
};
use matricula_core::{BcryptHasher, PasswordHasher};
use matricula_db::{PgStore, Store, init_db_pool, run_migrations};

use crate::notifications::{LogGateway, NotificationGateway, SmtpGateway};

/// Per-client login throttle keyed by address.
pub type LoginLimiter = DefaultKeyedRateLimiter<String>;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub notifier: Arc<dyn NotificationGateway>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub jwt_config: JwtConfig,
    pub email_config: EmailConfig,
    pub school_config: SchoolConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub login_limiter: Option<Arc<LoginLimiter>>,
    pub metrics_handle: Option<PrometheusHandle>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("school", &self.school_config.name)
            .field("email_enabled", &self.email_config.enabled)
            .field("rate_limit", &self.rate_limit_config)
            .field("metrics", &self.metrics_handle.is_some())
            .finish_non_exhaustive()
    }
}

/// Builds the login limiter, or `None` when throttling is disabled.
pub fn login_limiter(config: &RateLimitConfig) -> Option<Arc<LoginLimiter>> {
    if !config.enabled {
        return None;
    }

    let per_second = NonZeroU32::new(config.login_per_second).unwrap_or(NonZeroU32::MIN);
    let burst = NonZeroU32::new(config.login_burst_size).unwrap_or(NonZeroU32::MIN);
    let quota = Quota::per_second(per_second).allow_burst(burst);

    Some(Arc::new(RateLimiter::keyed(quota)))
}

/// Periodically drops limiter entries whose buckets have refilled, so
/// one-off clients do not accumulate in the keyed store.
pub fn spawn_limiter_cleanup(limiter: Arc<LoginLimiter>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            limiter.retain_recent();
            limiter.shrink_to_fit();
            debug!(clients = limiter.len(), "Login limiter trimmed");
        }
    })
}

/// Chooses SMTP delivery when enabled, logging otherwise.
pub fn notification_gateway(config: &EmailConfig) -> Arc<dyn NotificationGateway> {
    if config.enabled {
        Arc::new(SmtpGateway::new(config.clone()))
    } else {
        Arc::new(LogGateway)
    }
}

/// Connects to PostgreSQL, applies migrations and reads the rest of the
/// configuration from the environment.
pub async fn init_app_state(metrics_handle: Option<PrometheusHandle>) -> anyhow::Result<AppState> {
    let database = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&database)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database ready");

    let email_config = EmailConfig::from_env();
    let rate_limit_config = RateLimitConfig::from_env();

    Ok(AppState {
        store: Arc::new(PgStore::new(pool)),
        notifier: notification_gateway(&email_config),
        hasher: Arc::new(BcryptHasher::from_env()),
        jwt_config: JwtConfig::from_env(),
        email_config,
        school_config: SchoolConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        login_limiter: login_limiter(&rate_limit_config),
        rate_limit_config,
        metrics_handle,
    })
}
