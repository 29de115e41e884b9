//! The Lattice CLI.

mod client;
mod cmd;
pub mod config;
#[cfg(test)]
mod config_test;
pub mod expansion;
#[cfg(test)]
mod expansion_test;
pub mod logger;
mod progress;
mod signal;
pub mod stream;
#[cfg(test)]
mod stream_test;
mod user_input;

use std::path::PathBuf;

use anyhow::Result;
use structopt::StructOpt;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lattice_core::config::ServiceConfig;
use lattice_core::constants::CONFIG_FILE_NAME;

/// The latticectl utility manages a Lattice database system.
#[derive(StructOpt)]
#[structopt(name = "latticectl")]
pub struct LatticeCtl {
    #[structopt(subcommand)]
    action: Subcommands,
    /// Path to the replicated service configuration file.
    #[structopt(long = "config-file", global = true)]
    config_file: Option<PathBuf>,
    /// Provide verbose output.
    #[structopt(long, short, global = true)]
    verbose: bool,
}

#[derive(StructOpt)]
pub enum Subcommands {
    /// Initialize the cluster.
    #[structopt(name = "init")]
    Init(cmd::init::Init),
}

impl LatticeCtl {
    pub async fn run(self) -> Result<()> {
        // Initialize logging based on CLI config.
        logger::set_verbose(self.verbose);
        let fmt_layer = fmt::layer().with_target(true);
        let filter_layer;
        let level_filter;
        if self.verbose {
            filter_layer = EnvFilter::new("debug");
            level_filter = LevelFilter::DEBUG;
        } else {
            filter_layer = EnvFilter::new("warn");
            level_filter = LevelFilter::WARN;
        }
        tracing_subscriber::registry().with(filter_layer).with(fmt_layer).with(level_filter).init();

        let conf = ServiceConfig::load(self.config_path())?;
        match &self.action {
            Subcommands::Init(inner) => inner.run(&conf, self.verbose).await,
        }
    }

    fn config_path(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(std::env::var("GPHOME").unwrap_or_default()).join(CONFIG_FILE_NAME))
    }
}
