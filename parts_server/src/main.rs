//! Fleet parts analytics server.
//!
//! JSON API behind the maintenance spare-parts dashboard: filter catalogs,
//! cost and replacement series, per-vehicle part history and part-life
//! estimation, all read from the fleet PostgreSQL warehouse.

mod config;
mod dashboard;
mod db;
mod error;
mod filters;
mod metrics;
mod models;
mod query;
mod routes;
mod services;

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use axum::http::StatusCode;
use clap::Parser;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Parser)]
#[command(name = "fleet-parts", about = "Fleet maintenance spare-parts analytics API")]
struct Cli {
    /// Bind address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(short, long, env = "PORT", default_value = "10000")]
    port: u16,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::DashboardConfig::from_env();

    // Initialize tracing
    let default_level = if config.debug { "debug" } else { "info" };
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_level.into()),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| default_level.into()),
            )
            .init();
    }

    let cli = Cli::parse();

    tracing::info!(
        debug = config.debug,
        profile = config.profile,
        "Starting fleet parts server..."
    );

    let pool = db::create_pool(&cli.database_url, config.db_max_connections)?;
    metrics::init_metrics();

    // Profiling logs every response with its latency at info.
    let response_level = if config.profile {
        Level::INFO
    } else {
        Level::DEBUG
    };
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let state = routes::AppState { pool, config };
    let app = routes::app_router(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .on_response(DefaultOnResponse::new().level(response_level)),
        );

    let addr = SocketAddr::new(cli.host.parse::<IpAddr>()?, cli.port);
    tracing::info!("Fleet parts server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
