//! Cluster initialization and rollback commands.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use structopt::StructOpt;
use tonic::transport::Channel;

use crate::client;
use crate::config::{self, InitConfig};
use crate::expansion;
use crate::logger;
use crate::signal::{self, UserTermination};
use crate::stream::{self, StreamController};
use lattice_core::config::ServiceConfig;
use lattice_core::constants::PG_CTL_STATUS_NOT_RUNNING;
use lattice_core::error::format_grpc_error;
use lattice_core::idl::{self, HubClient, MakeClusterRequest};
use lattice_core::journal::{CleanupJournal, JournalEntry};
use lattice_core::postgres::{run_utility, run_utility_unchecked, PgCtlStatus, PgCtlStop};

/// Initialize the cluster from a cluster config file.
#[derive(StructOpt)]
pub struct Init {
    /// Create the cluster forcefully by overwriting existing directories.
    #[structopt(long, conflicts_with = "clean")]
    force: bool,
    /// Remove the disk state of an incomplete cluster initialization.
    #[structopt(long, conflicts_with = "config")]
    clean: bool,
    /// Path to the cluster initialization config file.
    #[structopt(name = "config")]
    config: Option<PathBuf>,
    #[structopt(subcommand)]
    sub: Option<InitSubcommands>,
}

#[derive(StructOpt)]
pub enum InitSubcommands {
    /// Initialize the cluster.
    #[structopt(name = "cluster")]
    Cluster(ClusterArgs),
}

#[derive(StructOpt)]
pub struct ClusterArgs {
    /// Path to the cluster initialization config file.
    #[structopt(name = "config")]
    config: Option<PathBuf>,
}

impl Init {
    pub async fn run(&self, conf: &ServiceConfig, verbose: bool) -> Result<()> {
        if self.clean {
            // structopt only guards the top-level positional; the cluster
            // subcommand carries its own config path, so the exclusion is
            // enforced here as well.
            if self.sub.is_some() || self.config.is_some() {
                bail!("--clean cannot be combined with a cluster config file");
            }
            return run_clean(conf).await;
        }

        let config_file = match (&self.sub, &self.config) {
            (Some(InitSubcommands::Cluster(args)), _) => args.config.clone(),
            (None, config) => config.clone(),
        };
        let config_file = config_file.context("please provide config file for cluster initialization")?;
        run_init_cluster(conf, &config_file, self.force, verbose).await?;
        logger::info("Cluster initialized successfully");
        Ok(())
    }
}

/// Drive the full MakeCluster procedure from the given config file.
async fn run_init_cluster(conf: &ServiceConfig, config_file: &Path, force: bool, verbose: bool) -> Result<()> {
    if !config_file.exists() {
        bail!("config file {} does not exist", config_file.display());
    }

    let mut hub = client::connect_to_hub(conf).await?;
    let request = load_cluster_request(&mut hub, conf, config_file, force, verbose).await?;

    let response = hub.make_cluster(request).await.map_err(format_grpc_error)?;

    let ctrl = Arc::new(StreamController::new());
    let termination_requested = Arc::new(AtomicBool::new(false));
    let signal_handle = signal::spawn_signal_handler(ctrl.clone(), termination_requested.clone())?;

    let res = stream::parse_stream_response(response.into_inner(), &ctrl).await;
    signal_handle.abort();
    if let Err(err) = res {
        logger::info("Please run latticectl init --clean to rollback");
        return Err(err);
    }
    if termination_requested.load(Ordering::SeqCst) {
        logger::info("Please run latticectl init --clean to rollback");
        return Err(UserTermination.into());
    }
    Ok(())
}

/// Read the config file and turn it into the MakeCluster request, expanding
/// the compact form and validating everything before any agent is touched.
async fn load_cluster_request(hub: &mut HubClient<Channel>, conf: &ServiceConfig, config_file: &Path, force: bool, verbose: bool) -> Result<MakeClusterRequest> {
    let mut config = InitConfig::load(config_file)?;
    if config.has_expansion_keys() {
        tracing::debug!(config_file = %config_file.display(), "expanding compact cluster config");
        expansion::expand_config(hub, &mut config).await?;
    }

    let mut request = config.to_request(force, verbose);
    if config.locale.is_none() {
        logger::warn("locale is not provided, setting it to system locale");
        if let Some(params) = request.cluster_params.as_mut() {
            params.locale = Some(config::system_locale()?);
        }
    }
    config::validate_input_config(&mut request, &config, conf)?;
    Ok(request)
}

/// Roll back an incomplete cluster initialization using the cleanup journal:
/// stop the coordinator if it is still up, then remove every journaled data
/// directory through its host's agent.
pub async fn run_clean(conf: &ServiceConfig) -> Result<()> {
    let journal = CleanupJournal::in_log_dir(&conf.log_dir);
    if !journal.exists() {
        logger::info("No incomplete cluster initialization found, nothing to clean");
        return Ok(());
    }
    let entries = journal.read()?;
    tracing::debug!(entries = entries.len(), "rolling back journaled segment directories");

    // The coordinator is always journaled first.
    if let Some(coordinator) = entries.first() {
        stop_coordinator_if_running(&conf.gp_home, &coordinator.data_directory).await?;
    }

    let mut by_host: BTreeMap<String, Vec<JournalEntry>> = BTreeMap::new();
    for entry in entries {
        by_host.entry(entry.hostname.clone()).or_default().push(entry);
    }

    let mut tasks = Vec::with_capacity(by_host.len());
    for (host, host_entries) in by_host {
        let conf = conf.clone();
        tasks.push((
            host.clone(),
            tokio::spawn(async move {
                let mut agent = client::connect_to_agent(&conf, &host).await?;
                for entry in host_entries {
                    agent
                        .remove_directory(idl::RemoveDirectoryRequest {
                            data_directory: entry.data_directory.clone(),
                        })
                        .await
                        .map_err(format_grpc_error)?;
                }
                Ok::<_, anyhow::Error>(())
            }),
        ));
    }
    for (host, task) in tasks {
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => bail!("host: {}, {:#}", host, err),
            Err(err) => bail!("host: {}, task panicked: {}", host, err),
        }
    }

    journal.remove()?;
    logger::info("Successfully cleaned up the changes");
    Ok(())
}

async fn stop_coordinator_if_running(gp_home: &str, pgdata: &str) -> Result<()> {
    let status = PgCtlStatus { pg_data: pgdata.to_string() };
    let (exit, output) = run_utility_unchecked(gp_home, &status).await?;
    if exit.success() {
        let stop = PgCtlStop { pg_data: pgdata.to_string() };
        run_utility(gp_home, &stop).await.context("executing pg_ctl stop")?;
        return Ok(());
    }
    match exit.code() {
        // Exit 3 is "no server running"; the data directory may also be
        // gone already, either way there is nothing to stop.
        Some(PG_CTL_STATUS_NOT_RUNNING) | Some(4) => Ok(()),
        _ => bail!("executing pg_ctl status: {}", output.trim()),
    }
}
