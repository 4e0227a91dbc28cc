//! openmusic-api - playlist and music catalog server
//!
//! Serves albums, songs, users, playlists and collaborations over HTTP.
//! Playlist routes are gated on ownership or collaboration.

use anyhow::{Context, Result};
use clap::Parser;
use openmusic_common::config::{ServerConfig, TomlConfig};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use openmusic_api::cli::Args;
use openmusic_api::store::Stores;
use openmusic_api::AppState;

/// Filter used when RUST_LOG is unset
fn default_filter(level: &str) -> String {
    format!(
        "openmusic_api={level},openmusic_common={level},tower_http=debug",
        level = level
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Install tracing before the config file is read so its warnings are
    // visible; the level is swapped once the config is resolved
    let initial_level = args.log_level.clone().unwrap_or_else(|| "info".to_string());
    let (filter, filter_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&initial_level).into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let file = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load config file")?;
    let config = ServerConfig::resolve(args.overrides(), file);

    if std::env::var_os("RUST_LOG").is_none() && config.log_level != initial_level {
        filter_handle
            .reload(EnvFilter::new(default_filter(&config.log_level)))
            .context("Failed to apply configured log level")?;
    }

    info!("Starting openmusic-api");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Storage: {}", config.storage);

    let auth_secret = config.require_auth_secret()?;
    let stores = Stores::open(&config)
        .await
        .context("Failed to open entity stores")?;
    let app = openmusic_api::build_router(AppState::new(stores, auth_secret));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
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
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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
