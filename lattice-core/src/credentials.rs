//! TLS credential material for the mutually-authenticated RPC plane.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tonic::transport::{Certificate, ClientTlsConfig, Identity, ServerTlsConfig};

/// Paths to the TLS material every hub and agent process loads at startup.
///
/// The same certificate authority signs the hub and all agents, so either
/// side of a connection verifies the other against `ca`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Credentials {
    /// Path to the PEM encoded certificate authority.
    #[serde(rename = "ca")]
    pub ca_cert_path: String,
    /// Path to this host's PEM encoded server certificate.
    #[serde(rename = "server-cert")]
    pub server_cert_path: String,
    /// Path to this host's PEM encoded server key.
    #[serde(rename = "server-key")]
    pub server_key_path: String,
}

impl Credentials {
    /// Load the server-side TLS config, requiring client certificates signed by the CA.
    pub async fn load_server_config(&self) -> Result<ServerTlsConfig> {
        let (ca, identity) = self.load_material().await?;
        Ok(ServerTlsConfig::new().identity(identity).client_ca_root(ca))
    }

    /// Load the client-side TLS config used when dialing `domain`.
    pub async fn load_client_config(&self, domain: &str) -> Result<ClientTlsConfig> {
        let (ca, identity) = self.load_material().await?;
        Ok(ClientTlsConfig::new().identity(identity).ca_certificate(ca).domain_name(domain))
    }

    async fn load_material(&self) -> Result<(Certificate, Identity)> {
        let ca = tokio::fs::read(&self.ca_cert_path)
            .await
            .with_context(|| format!("error reading certificate authority {}", self.ca_cert_path))?;
        let cert = tokio::fs::read(&self.server_cert_path)
            .await
            .with_context(|| format!("error reading server certificate {}", self.server_cert_path))?;
        let key = tokio::fs::read(&self.server_key_path)
            .await
            .with_context(|| format!("error reading server key {}", self.server_key_path))?;
        Ok((Certificate::from_pem(ca), Identity::from_pem(cert, key)))
    }
}
