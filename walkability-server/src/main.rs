mod config;
mod error;
mod routes;
mod sources;

use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, ServerConfig};
use crate::error::ServerError;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("walkability-server: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    init_tracing(&config.server.log_filter);

    match &cli.config {
        Some(path) if path.exists() => tracing::info!("Configuration read from {}", path.display()),
        Some(path) => tracing::warn!("Config file {} not found, using defaults", path.display()),
        None => tracing::info!("No config file given, using defaults"),
    }

    tracing::info!("Signal providers: {:?}", config.signals.enabled());

    let client = sources::http_client(config.acquisition.infrastructure_timeout())?;
    let sources = sources::build_sources(&config, &client)?;
    let app = routes::app(AppState::new(sources, config.acquisition.clone()), &config.server);

    let addr = SocketAddr::new(config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
