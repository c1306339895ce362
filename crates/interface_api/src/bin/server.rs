//! Case store API server binary
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin casedb-api
//!
//! # Run with environment variables
//! CASEDB_PORT=9000 CASEDB_DATABASE_URL=sqlite://cases.db cargo run --bin casedb-api
//! ```
//!
//! # Environment Variables
//!
//! * `CASEDB_HOST` - Server host (default: 0.0.0.0)
//! * `CASEDB_PORT` - Server port (default: 8080)
//! * `CASEDB_DATABASE_URL` - SQLite location (default: sqlite://police_violations.db)
//! * `CASEDB_MAX_CONNECTIONS` - Pool size (default: 1)
//! * `CASEDB_JWT_SECRET` - JWT signing secret (required in production)
//! * `CASEDB_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `CASEDB_LOG_LEVEL` - trace, debug, info, warn, error (default: info); `RUST_LOG` wins
//! * `CASEDB_LOG_JSON` - Emit JSON log lines (default: false)
//! * `CASEDB_REPORT_TIMEZONE` - IANA zone for daily snapshots (default: UTC)

use anyhow::Context;
use infra_db::Database;
use interface_api::{config::ApiConfig, create_router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid CASEDB_* configuration")?;

    init_tracing(&config.log_level, config.log_json);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        database = %config.database_url,
        timezone = config.report_timezone.name(),
        "Starting case store API server"
    );

    let db = Database::open(config.database(), config.report_timezone)
        .await
        .context("case store unavailable")?;

    let app = create_router(db.clone(), config.clone());

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
