mod cli;

use crate::cli::{dotenv_failure, CLI};
use clap::Parser;
use pinhole_core::Shortener;
use pinhole_gateway::{App, AppState};
use pinhole_shortener::{InMemoryShortener, PostgresShortener};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loaded before the subscriber so `.env` can set `RUST_LOG`.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Ok(path) = &dotenv {
        info!(path = %path.display(), "loaded .env file");
    }
    if let Some(err) = dotenv_failure(&dotenv) {
        warn!(error = %err, "ignoring malformed .env file");
    }

    let config = CLI::try_parse()?;

    info!(
        server_address = %config.server_address,
        base_url = %config.base_url,
        storage_backend = %config.storage_backend(),
        "starting gateway server"
    );

    let shortener: Arc<dyn Shortener> = match config.database_dsn() {
        Some(dsn) => Arc::new(PostgresShortener::postgres(&config.base_url, dsn).await?),
        None => Arc::new(InMemoryShortener::in_memory(
            &config.base_url,
            config.file_storage_path(),
        )),
    };

    let listener = TcpListener::bind(&config.server_address).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(AppState::new(shortener)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
