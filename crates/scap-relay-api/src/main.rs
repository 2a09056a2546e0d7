use std::net::SocketAddr;
use std::sync::Arc;

use scap_relay_api::{routes, state::AppState, telemetry};
use scap_relay_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();
    telemetry::init_telemetry();

    let config = Config::from_env()?;
    let state = Arc::new(AppState::new(config.clone())?);
    let router = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!(%addr, upstream = %config.upstream_url, "Starting scap-relay");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
