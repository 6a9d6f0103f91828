//! Docker Hub Exporter - Prometheus exporter for Docker Hub pull rate limits

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::Config;
use dockerhub_api::{AppState, create_router};
use dockerhub_client::{DockerHubClient, DockerHubClientConfig};
use dockerhub_core::{LimitCollector, spawn_poll_task};

/// Docker Hub Exporter - Prometheus exporter for Docker Hub pull rate limits
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "DOCKERHUB_EXPORTER_CONFIG", default_value = "config.yaml")]
    config: String,

    /// Bind address
    #[arg(long, env = "DOCKERHUB_EXPORTER_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Port
    #[arg(short, long, env = "DOCKERHUB_EXPORTER_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.log_level);

    info!("Starting Docker Hub Exporter v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Docker Hub client
    let client = Arc::new(DockerHubClient::new(DockerHubClientConfig {
        auth_url: config.auth_url.clone(),
        registry_url: config.registry_url.clone(),
        repository: config.repository.clone(),
        username: config.username.clone(),
        password: config.password.clone(),
        verbose: config.verbose,
        timeout: config.timeout(),
    })?);

    let collector = Arc::new(LimitCollector::new(client));

    if let Some(period) = config.poll_interval() {
        let _poll_task = spawn_poll_task(collector.clone(), period);
    }

    // Create router
    let app = create_router(AppState::new(collector)).layer(TraceLayer::new_for_http());

    // Determine bind address
    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", args.bind, port).parse()?;

    info!("Listening on {}", addr);
    info!("Repository: {}", config.repository);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install CTRL+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
