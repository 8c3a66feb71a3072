//! forward-proxy
//!
//! Forwards every inbound request to a configured upstream through the
//! request filter chain, the adapter and the response filter chain.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum handler ──▶ request filters ──▶ Adapter ──────▶ Upstream
//!                                                              │
//!     Client Response                                          ▼
//!     ◀────────────── axum handler ◀── response filters ◀── response
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use forward_proxy::config::{ConfigOverrides, ProxyConfig, load_config, watcher::ConfigWatcher};
use forward_proxy::http::HttpServer;
use forward_proxy::lifecycle::{Shutdown, signals};
use forward_proxy::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "forward-proxy")]
#[command(about = "Forward HTTP requests through filter chains to an upstream", long_about = None)]
struct Cli {
    /// TOML configuration file; watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override upstream.target.
    #[arg(short, long)]
    target: Option<String>,

    /// Answer locally with the echo adapter instead of forwarding.
    #[arg(long)]
    echo: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        bind_address: cli.bind,
        target: cli.target,
        echo: cli.echo,
    };

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    overrides.apply(&mut config);
    forward_proxy::config::validation::validate_config(&config)
        .map_err(forward_proxy::config::ConfigError::Validation)?;

    logging::init(&config.observability);
    tracing::info!("forward-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.target,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher handle alive for the lifetime of the server.
    let (_watcher, config_updates) = match &cli.config {
        Some(path) => {
            if !overrides.is_empty() {
                tracing::info!(overrides = ?overrides, "Command line overrides apply to reloaded config too");
            }
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.with_overrides(overrides).run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, signal).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
