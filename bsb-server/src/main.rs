//! bsb-server - Browser scoreboard HTTP service
//!
//! Loads the benchmark dataset from disk or a URL, then serves rankings,
//! browser details, comparisons and viewer preferences as JSON.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bsb_common::config::{LoggingConfig, TomlConfig};
use bsb_common::prefs::{MemoryPreferenceStore, PreferenceStore, TomlPreferenceStore};
use bsb_common::{DataSource, DatasetSession, Loader};
use bsb_server::{build_router, AppState};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for bsb-server
#[derive(Parser, Debug)]
#[command(name = "bsb-server")]
#[command(about = "Browser benchmark scoreboard service")]
#[command(version)]
struct Args {
    /// Config file (default: <config_dir>/bsb/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding browsers.json and the platform documents
    #[arg(long, conflicts_with = "data_url")]
    data_dir: Option<PathBuf>,

    /// Base URL serving browsers.json and the platform documents
    #[arg(long)]
    data_url: Option<String>,

    /// Address to bind
    #[arg(long, env = "BSB_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "BSB_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    init_tracing(&config.logging)?;

    // Build identification first, before the dataset load
    info!(
        "Starting Browser Scoreboard (bsb-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let source = config
        .resolve_data_source(args.data_dir.as_deref(), args.data_url.as_deref())
        .context("Failed to resolve data source")?;
    match &source {
        DataSource::Filesystem { dir } => info!("Data directory: {}", dir.display()),
        DataSource::Network { base_url } => info!("Data URL: {}", base_url),
    }

    let prefs = open_preferences(&config);

    let session = DatasetSession::new(Loader::with_timeout(source, config.data.timeout()));
    // Initial load runs in the background; requests report `loading` until it lands
    drop(session.spawn_reload());

    let state = AppState::new(session, prefs);
    let app = build_router(state);

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("bsb-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    Ok(())
}

fn open_preferences(config: &TomlConfig) -> Box<dyn PreferenceStore> {
    let path = config.preferences_path();
    match TomlPreferenceStore::open(&path) {
        Ok(store) => {
            info!("Preferences: {}", path.display());
            Box::new(store)
        }
        Err(e) => {
            warn!("Preferences unavailable ({}), not persisting: {}", path.display(), e);
            Box::new(MemoryPreferenceStore::new())
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install signal handler: {}", e);
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
