//! linka-historial - general activity log microservice
//!
//! Reads campaign/audience/message records from the analytics warehouse and
//! user profiles from the document store, and serves the merged historial
//! over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use linka_common::config::{ConfigOverrides, LinkaConfig};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linka_historial::historial::HistoryService;
use linka_historial::store::{connect_readonly, SqlProfileStore, SqlRecordSource};
use linka_historial::{build_router, AppState};

/// Command-line arguments for linka-historial
#[derive(Parser, Debug)]
#[command(name = "linka-historial")]
#[command(about = "Historial (activity log) service for Linka")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "LINKA_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "LINKA_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(long, env = "LINKA_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// Warehouse connection URL
    #[arg(long, env = "LINKA_WAREHOUSE_URL")]
    warehouse_url: Option<String>,

    /// Profile store connection URL
    #[arg(long, env = "LINKA_PROFILES_URL")]
    profiles_url: Option<String>,

    /// Log level or filter directive
    #[arg(long, env = "LINKA_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = LinkaConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    config.apply_overrides(ConfigOverrides {
        port: args.port,
        bind_address: args.bind_address,
        warehouse_url: args.warehouse_url,
        profiles_url: args.profiles_url,
        log_level: args.log_level,
    });

    // Initialize tracing; RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "linka_historial={level},linka_common={level},tower_http={level}",
                    level = config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Linka Historial (linka-historial) v{}",
        env!("CARGO_PKG_VERSION")
    );

    config.validate().context("Invalid configuration")?;

    info!(
        "Warehouse tables: {}, {}, {}",
        config.warehouse.campaigns(),
        config.warehouse.audiences(),
        config.warehouse.messages()
    );
    info!("Profile collection: {}", config.profiles.collection);

    let warehouse_pool = connect_readonly(&config.warehouse.database_url)
        .await
        .context("Failed to connect to warehouse")?;
    info!("✓ Connected to warehouse (read-only)");

    let profiles_pool = connect_readonly(&config.profiles.database_url)
        .await
        .context("Failed to connect to profile store")?;
    info!("✓ Connected to profile store (read-only)");

    let records = SqlRecordSource::new(warehouse_pool, &config.warehouse)?;
    let profiles = SqlProfileStore::new(profiles_pool, &config.profiles)?;
    let history = HistoryService::new(
        Arc::new(records),
        Arc::new(profiles),
        config.historial.clone(),
    );

    let app = build_router(AppState::new(history));

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .context("Invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("linka-historial listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
