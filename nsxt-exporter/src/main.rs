//! Prometheus exporter for VMware NSX-T.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, info_span};

use nsxt_client::NsxtClient;
use nsxt_exporter::{ExporterConfig, HttpServer, ScrapeCoordinator, build_collectors};

/// Prometheus exporter for VMware NSX-T.
#[derive(Parser, Debug)]
#[command(name = "nsxt-exporter")]
#[command(about = "Export NSX-T Manager state as Prometheus metrics")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: String,

    /// HTTP listen address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Log level (overrides config): trace, debug, info, warn, error.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = ExporterConfig::load_from_file(&args.config)?;

    // Override listen address from CLI
    if let Some(listen) = args.listen {
        config.prometheus.listen = listen;
        config.validate()?;
    }

    // Initialize logging
    let logging = config.logging.with_level_override(args.log_level.as_deref());
    nsxt_common::init_tracing(&logging)?;

    info!(manager = %config.nsxt.url, "Starting NSX-T Prometheus Exporter");

    let client = Arc::new(NsxtClient::new(&config.nsxt)?);
    let logger = info_span!("nsxt_exporter");
    let collectors = build_collectors(client, &logger, &config.collectors)?;
    let coordinator = Arc::new(ScrapeCoordinator::new(collectors));

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Parse listen address
    let listen_addr: SocketAddr = config
        .prometheus
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;

    let http_server = HttpServer::new(coordinator, listen_addr, config.prometheus.path.clone());

    // Start HTTP server
    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.run(shutdown_rx).await {
            error!("HTTP server error: {}", e);
        }
    });

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate() => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    // Signal shutdown
    shutdown_tx.send(true)?;

    // Wait for the server to drain
    let _ = tokio::time::timeout(Duration::from_secs(5), http_task).await;

    info!("Exporter stopped");
    Ok(())
}

#[cfg(unix)]
async fn terminate() {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
