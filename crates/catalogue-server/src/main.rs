//! Catalogue Server - Main entry point

use anyhow::Result;
use catalogue_common::logging::{init_logging, LogConfig};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tracing::info;

use catalogue_server::{
    api::{self, AppState},
    bridge,
    config::{Config, StoreBackend},
    db,
    hooks::HookRegistry,
    store::{MemoryDocumentStore, PgDocumentStore, SharedStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("catalogue-server")
        .filter_directives("catalogue_server=debug,tower_http=debug,sqlx=info")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting catalogue server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let store = build_store(&config).await?;

    let bridge = bridge::build(&config.bridge)?;
    info!(transport = ?config.bridge.transport, "Filesystem bridge initialized");

    let hooks = HookRegistry::with_defaults(&config.hooks);
    let state = AppState::new(store, bridge, hooks, &config.import);
    let pipeline = state.pipeline.clone();
    let app = api::create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Copies detached by uploads outlive their requests
    let timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    info!(
        pending = pipeline.pending_transfers(),
        "Waiting up to {} seconds for background copies",
        timeout.as_secs()
    );
    pipeline.drain(timeout).await;

    info!("Server shut down gracefully");

    Ok(())
}

/// Connect the configured document store, migrating PostgreSQL first
async fn build_store(config: &Config) -> Result<SharedStore> {
    match config.store {
        StoreBackend::Postgres => {
            let pool = db::create_pool(&config.database).await?;
            info!("Database connection pool established");

            db::run_migrations(&pool).await?;

            Ok(Arc::new(PgDocumentStore::new(pool)))
        },
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory document store; data is lost on shutdown");
            Ok(Arc::new(MemoryDocumentStore::new()))
        },
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
