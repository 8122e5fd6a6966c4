use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::{Duration, Instant};
use tracing::warn;

use matricula_models::auth::Role;

/// Whether `METRICS_ENABLED` allows installing the exporter (default: on).
pub fn is_metrics_enabled() -> bool {
    std::env::var("METRICS_ENABLED")
        .map(|v| v.to_lowercase() != "false" && v != "0")
        .unwrap_or(true)
}

/// Installs the Prometheus recorder and spawns its upkeep task.
///
/// Returns `None` when metrics are disabled or a recorder is already
/// installed; counters are then no-ops.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if !is_metrics_enabled() {
        return None;
    }

    let handle = match PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0,
            ],
        )
        .and_then(|builder| builder.install_recorder())
    {
        Ok(handle) => handle,
        Err(e) => {
            warn!(error = %e, "Failed to install Prometheus recorder, metrics disabled");
            return None;
        }
    };

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Some(handle)
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let uri_path = req.uri().path().to_owned();

    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or(uri_path);

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);

    gauge!("http_requests_active").decrement(1.0);

    response
}

pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

// Business metrics

pub fn track_application_submitted() {
    counter!("admissions_submitted_total").increment(1);
}

/// `mode` is `simple` or `full`.
pub fn track_application_approved(mode: &'static str) {
    counter!("admissions_approved_total", "mode" => mode).increment(1);
}

pub fn track_application_rejected() {
    counter!("admissions_rejected_total").increment(1);
}

pub fn track_login(role: Role, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!("logins_total", "role" => role.as_str(), "outcome" => outcome).increment(1);
}

pub fn track_notification_failed() {
    counter!("notifications_failed_total").increment(1);
}
