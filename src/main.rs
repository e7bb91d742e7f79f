//! HTTP path handler server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ http::request (RequestSnapshot)
//!                                            │
//!                                            ▼
//!                     routing::Dispatcher ◀── PathTable (Arc, startup)
//!                       │    │
//!                       │    └─▶ resolver ──▶ keyring::{query, authorization,
//!                       │                      form/json, files, context}
//!                       ▼
//!                     PathHandler(s), pass after pass
//!                       │
//!     Client Response   ▼
//!     ◀────────────── http::response (JSON report)
//!
//!     Cross-cutting: config (+ watcher), observability, lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use http_path_handler::config::{load_config, AppConfig, ConfigWatcher};
use http_path_handler::http::{default_paths, spawn_settings_reload, HttpServer};
use http_path_handler::lifecycle::Shutdown;
use http_path_handler::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "http-path-handler")]
#[command(about = "Serves parameter-matched paths over HTTP", long_about = None)]
struct Cli {
    /// TOML configuration file; watched for dispatch setting changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overriding the configuration.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "http-path-handler starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_body_size = config.listener.max_body_size,
        request_timeout_secs = config.timeouts.request_secs,
        max_passes = ?config.dispatch.max_passes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let table = default_paths()?;
    tracing::info!(paths = table.len(), "Path table built");

    let watcher = cli.config.as_deref().map(|path| ConfigWatcher::new(path, &config));
    let server = HttpServer::new(config, table);

    // The watcher stops when this handle is dropped.
    let _watcher = match watcher {
        Some((watcher, updates)) => {
            spawn_settings_reload(server.settings(), updates);
            Some(watcher.run()?)
        }
        None => None,
    };

    server.run(listener, Shutdown::new()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
