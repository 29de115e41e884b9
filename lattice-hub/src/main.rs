//! The Lattice hub daemon.

mod catalog;
mod make_cluster;
#[cfg(test)]
mod make_cluster_test;
mod mirrors;
mod server;
mod stream;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::StreamExt;
use structopt::StructOpt;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::broadcast;
use tokio_stream::wrappers::SignalStream;
use tokio_stream::StreamMap;
use tracing_subscriber::prelude::*;

use crate::server::Server;
use lattice_core::config::ServiceConfig;
use lattice_core::constants::CONFIG_FILE_NAME;
use lattice_core::sys::RealSystem;

/// The Lattice hub daemon.
#[derive(StructOpt)]
#[structopt(name = "lattice-hub")]
struct Opts {
    /// Path to the replicated service configuration file.
    #[structopt(long = "config-file")]
    config_file: Option<PathBuf>,
}

impl Opts {
    fn config_path(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(std::env::var("GPHOME").unwrap_or_default()).join(CONFIG_FILE_NAME))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup tracing/logging system.
    tracing_subscriber::registry()
        // Filter spans based on the RUST_LOG env var.
        .with(tracing_subscriber::EnvFilter::from_default_env())
        // Send a copy of all spans to stdout in compact form.
        .with(tracing_subscriber::fmt::layer().with_target(true).with_level(true).with_ansi(true))
        // Install this registry as the global tracing registry.
        .try_init()
        .context("error initializing logging/tracing system")?;

    let opts = Opts::from_args();
    let cfg = Arc::new(ServiceConfig::load(opts.config_path())?);
    tracing::info!(
        hub_port = %cfg.hub_port,
        agent_port = %cfg.agent_port,
        hosts = ?cfg.hostnames,
        log_dir = %cfg.log_dir,
        "starting Lattice hub",
    );

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
    let server = Server::new(cfg, Arc::new(RealSystem), shutdown_tx.clone());
    let handle = server.spawn().await?;

    let mut signals = StreamMap::new();
    signals.insert("sigterm", SignalStream::new(signal(SignalKind::terminate()).context("error building signal stream")?));
    signals.insert("sigint", SignalStream::new(signal(SignalKind::interrupt()).context("error building signal stream")?));
    loop {
        tokio::select! {
            Some((_, sig)) = signals.next() => {
                tracing::debug!(signal = ?sig, "signal received, beginning graceful shutdown");
                let _ = shutdown_tx.send(());
                break;
            }
            _ = shutdown_rx.recv() => break,
        }
    }

    if let Err(err) = handle.await {
        tracing::error!(error = ?err, "error joining hub gRPC server task");
    }

    // Ensure any pending output is flushed.
    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();

    Ok(())
}
