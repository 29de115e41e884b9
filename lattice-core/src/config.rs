//! The replicated service configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;
use crate::postgres::{run_utility, LatticeSync};

/// Runtime configuration shared by the hub, the agents and the CLI.
///
/// Written once when the services are set up and copied verbatim to every
/// host, so all processes agree on ports, hosts and credentials.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// The port the hub listens on, on the coordinator host.
    #[serde(rename = "hubPort")]
    pub hub_port: u16,
    /// The port every agent listens on.
    #[serde(rename = "agentPort")]
    pub agent_port: u16,
    /// All hosts participating in the cluster.
    pub hostnames: Vec<String>,
    /// The directory the hub writes its logs and the cleanup journal to.
    #[serde(rename = "hubLogDir")]
    pub log_dir: String,
    /// The name under which the hub/agent services are registered.
    #[serde(rename = "serviceName")]
    pub service_name: String,
    /// The Lattice installation prefix.
    #[serde(rename = "gphome")]
    pub gp_home: String,

    /// TLS material paths.
    pub credentials: Credentials,
}

impl ServiceConfig {
    /// Read the service configuration from the given file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read(path).with_context(|| format!("could not open service config file {}", path.display()))?;
        serde_json::from_slice(&contents).with_context(|| format!("could not parse service config file {}", path.display()))
    }

    /// Write the service configuration to the given file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = serde_json::to_vec_pretty(self).context("error serializing service config")?;
        std::fs::write(path, contents).with_context(|| format!("could not create service config file {}", path.display()))
    }

    /// Copy the service configuration file to every host in the cluster.
    pub async fn replicate<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref().display().to_string();
        let sync = LatticeSync {
            hostnames: self.hostnames.clone(),
            source: path.clone(),
            destination: path.clone(),
        };
        run_utility(&self.gp_home, &sync)
            .await
            .with_context(|| format!("could not copy {} to segment hosts", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> ServiceConfig {
        ServiceConfig {
            hub_port: 4242,
            agent_port: 8000,
            hostnames: vec!["cdw".into(), "sdw1".into()],
            log_dir: "/home/lattice/logs".into(),
            service_name: "latticed".into(),
            gp_home: "/usr/local/lattice".into(),
            credentials: Credentials {
                ca_cert_path: "/certs/ca.pem".into(),
                server_cert_path: "/certs/server.pem".into(),
                server_key_path: "/certs/server.key".into(),
            },
        }
    }

    #[test]
    fn test_write_and_load_round_trip() {
        let tmpdir = tempfile::tempdir().expect("error creating tempdir");
        let path = tmpdir.path().join("latticectl.conf");

        let config = sample_config();
        config.write(&path).expect("error writing config");
        let loaded = ServiceConfig::load(&path).expect("error loading config");

        assert_eq!(loaded.hub_port, config.hub_port);
        assert_eq!(loaded.agent_port, config.agent_port);
        assert_eq!(loaded.hostnames, config.hostnames);
        assert_eq!(loaded.log_dir, config.log_dir);
        assert_eq!(loaded.service_name, config.service_name);
        assert_eq!(loaded.gp_home, config.gp_home);
    }

    #[test]
    fn test_load_uses_wire_field_names() {
        let tmpdir = tempfile::tempdir().expect("error creating tempdir");
        let path = tmpdir.path().join("latticectl.conf");
        std::fs::write(
            &path,
            r#"{
                "hubPort": 4242,
                "agentPort": 8000,
                "hostnames": ["cdw"],
                "hubLogDir": "/tmp/logs",
                "serviceName": "latticed",
                "gphome": "/usr/local/lattice",
                "credentials": {"ca": "/ca", "server-cert": "/cert", "server-key": "/key"}
            }"#,
        )
        .expect("error writing fixture");

        let loaded = ServiceConfig::load(&path).expect("error loading config");
        assert_eq!(loaded.log_dir, "/tmp/logs");
        assert_eq!(loaded.gp_home, "/usr/local/lattice");
        assert_eq!(loaded.credentials.ca_cert_path, "/ca");
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let err = ServiceConfig::load("/definitely/not/here.conf").unwrap_err();
        assert!(err.to_string().contains("could not open service config file"));
    }
}
