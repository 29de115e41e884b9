//! RPC clients for the hub and, during cleanup, the agents.

use anyhow::{Context, Result};
use tonic::transport::{Channel, Endpoint};

use lattice_core::config::ServiceConfig;
use lattice_core::idl::{AgentClient, HubClient};

/// Connect to the hub on the local host.
pub async fn connect_to_hub(conf: &ServiceConfig) -> Result<HubClient<Channel>> {
    let tls = conf.credentials.load_client_config("localhost").await?;
    let endpoint = Endpoint::from_shared(format!("https://localhost:{}", conf.hub_port))
        .context("error building hub endpoint")?
        .tls_config(tls)
        .context("error applying TLS config to hub endpoint")?;
    let channel = endpoint
        .connect()
        .await
        .with_context(|| format!("could not connect to hub on port {}", conf.hub_port))?;
    Ok(HubClient::new(channel))
}

/// Connect to the agent on the given host.
pub async fn connect_to_agent(conf: &ServiceConfig, host: &str) -> Result<AgentClient<Channel>> {
    let tls = conf.credentials.load_client_config(host).await?;
    let endpoint = Endpoint::from_shared(format!("https://{}:{}", host, conf.agent_port))
        .context("error building agent endpoint")?
        .tls_config(tls)
        .context("error applying TLS config to agent endpoint")?;
    let channel = endpoint
        .connect()
        .await
        .with_context(|| format!("could not connect to agent on host {}", host))?;
    Ok(AgentClient::new(channel))
}
