//! Brokerage API Server Binary
//!
//! Starts the HTTP API over PostgreSQL.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin brokerage-api
//!
//! # Run with environment variables
//! API_PORT=8080 API_DATABASE_URL=postgres://... API_LOG_FORMAT=json cargo run --bin brokerage-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_ACCESS_TOKEN_SECS` / `API_REFRESH_TOKEN_SECS` - token lifetimes
//! * `API_LOG_LEVEL` - Log level or filter directive (default: info)
//! * `API_LOG_FORMAT` - `text` or `json`
//! * `API_MAX_CONNECTIONS` - Database pool size (default: 10)
//! * `API_DB_ACQUIRE_TIMEOUT_SECS` - Wait for a pooled connection (default: 30)
//! * `API_INVOICE_DUE_DAYS` - Due window of invoices emitted on acceptance (default: 15)
//! * `API_CURRENCY` - Currency code of QR payloads (default: BOB)
//! * `API_ADMIN_USERNAME` / `API_ADMIN_PASSWORD` - administrator created on
//!   start when no user with that name exists

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use infra_db::{
    create_pool, run_migrations, DatabaseConfig, PostgresBillingAdapter, PostgresClaimsAdapter,
    PostgresPartyAdapter, PostgresPolicyAdapter,
};
use interface_api::config::{ApiConfig, LogFormat};
use interface_api::{create_router, services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("invalid API_* configuration ({e}), using defaults");
            ApiConfig::default()
        }
    };

    init_tracing(&config);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting brokerage API server"
    );

    let db = DatabaseConfig::new(&config.database_url)
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs));
    let pool = create_pool(db).await.context("connecting to the database")?;
    run_migrations(&pool).await.context("applying migrations")?;

    let state = AppState::new(
        Arc::new(PostgresPartyAdapter::new(pool.clone())),
        Arc::new(PostgresPolicyAdapter::new(pool.clone())),
        Arc::new(PostgresBillingAdapter::new(pool.clone())),
        Arc::new(PostgresClaimsAdapter::new(pool)),
        config.clone(),
    );

    if let Some((username, password)) = config.admin_credentials() {
        let created = services::party::ensure_admin(&state, username, password)
            .await
            .map_err(|e| anyhow::anyhow!("bootstrapping admin user: {e}"))?;
        if !created {
            tracing::info!(%username, "admin user already present");
        }
    }

    let app = create_router(state);

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Installs the subscriber; `RUST_LOG` wins over `API_LOG_LEVEL`
fn init_tracing(config: &ApiConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init(),
    }
}

/// Waits for Ctrl+C or SIGTERM so in-flight requests can finish
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
