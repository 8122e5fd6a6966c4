use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use matricula_core::AppError;

use crate::state::AppState;

/// Client key: the peer address, or the first `x-forwarded-for` hop when
/// the deployment sits behind a proxy that sets it.
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_forwarded_for: bool,
) -> String {
    let forwarded = trust_forwarded_for
        .then(|| {
            headers
                .get("x-forwarded-for")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(|ip| ip.trim().to_string())
                .filter(|ip| !ip.is_empty())
        })
        .flatten();

    forwarded
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Throttles login attempts per client when a limiter is configured.
pub async fn login_rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(limiter) = state.login_limiter.as_ref() else {
        return next.run(req).await;
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let key = client_key(
        req.headers(),
        peer,
        state.rate_limit_config.trust_forwarded_for,
    );

    if limiter.check_key(&key).is_err() {
        warn!(client = %key, "Login rate limit exceeded");
        return AppError::too_many_requests("Too many login attempts, please try again later")
            .into_response();
    }

    next.run(req).await
}
