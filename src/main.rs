use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use matricula::logging::init_tracing;
use matricula::matricula_config::ServerConfig;
use matricula::metrics::init_metrics;
use matricula::router::init_router;
use matricula::state::{init_app_state, spawn_limiter_cleanup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let server_config = ServerConfig::from_env();

    if let Err(e) = init_tracing(&server_config) {
        eprintln!("Failed to initialize tracing: {:#}", e);
    }

    let metrics_handle = init_metrics();
    let state = init_app_state(metrics_handle).await?;
    if let Some(limiter) = state.login_limiter.clone() {
        spawn_limiter_cleanup(limiter, Duration::from_secs(60));
    }
    let app = init_router(state);

    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(address = %address, "Server starting");
    println!("🚀 Server running on http://{}", address);
    println!("📚 Swagger UI available at http://{}/swagger-ui", address);
    println!("📖 Scalar UI available at http://{}/scalar", address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
