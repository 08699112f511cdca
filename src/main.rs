//! Bandwidth-saving HTTP image proxy.
//!
//! # Architecture Overview
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                 IMAGE PROXY                   │
//!                    │                                               │
//!   Client Request   │  ┌────────┐   ┌──────────┐   ┌────────────┐  │
//!   ─────────────────┼─▶│  http  │──▶│ loopback │──▶│   fetch    │──┼──▶ Origin
//!                    │  │ server │   │  guard   │   │ (streaming)│  │
//!                    │  └────────┘   └──────────┘   └─────┬──────┘  │
//!                    │                                    ▼         │
//!                    │                            ┌────────────┐    │
//!                    │                            │   policy   │    │
//!                    │                            └─────┬──────┘    │
//!                    │                     compress     │   bypass  │
//!   Client Response  │  ┌─────────┐   ┌───────────┐     │           │
//!   ◀────────────────┼──│ headers │◀──│ transcode │◀────┴───────────┼──── Origin
//!                    │  │ project │   │  (JPEG)   │    stream       │     bytes
//!                    │  └─────────┘   └───────────┘                 │
//!                    │                                               │
//!                    │  config · observability (tracing + metrics)   │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use bandwidth_hero_proxy::config::{load_config, ProxyConfig};
use bandwidth_hero_proxy::http::{shutdown_signal, HttpServer};
use bandwidth_hero_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "bandwidth-hero-proxy")]
#[command(about = "Bandwidth-saving HTTP image proxy", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(port) = cli.port {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{host}:{port}");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_redirects = config.fetch.max_redirects,
        default_quality = config.transcode.default_quality,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(error) => tracing::error!(
                %error,
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
