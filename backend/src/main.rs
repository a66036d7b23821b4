//! Backend entry-point: loads settings, resolves adapters and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::WrapErr;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use courseware::config::Settings;
use courseware::inbound::http::health::HealthState;

use server::{create_server, server_config};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = Settings::load().wrap_err("failed to load configuration")?;
    let health_state = web::Data::new(HealthState::new());
    let config = server_config(&settings, &health_state).await?;
    info!(bind_addr = %config.bind_addr(), "starting HTTP server");

    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("HTTP server failed")
}
