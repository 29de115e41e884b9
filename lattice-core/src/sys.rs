//! Host system capabilities behind an injectable trait.
//!
//! Everything the management plane asks of the host OS that tests need to
//! substitute goes through [`SystemOps`]; production code constructs a
//! [`RealSystem`] once and passes it down.

use std::net::IpAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

/// Host level operations used by the hub and agents.
pub trait SystemOps: Send + Sync + 'static {
    /// The canonical name of this host.
    fn hostname(&self) -> Result<String>;

    /// The name of the user this process runs as.
    fn current_user(&self) -> Result<String>;

    /// All non-loopback interface addresses of this host in CIDR form.
    fn interface_addrs(&self) -> Result<Vec<String>>;

    /// The locales installed on this host, one per line of `locale -a`.
    fn locales(&self) -> Result<Vec<String>>;
}

/// A shared handle to the system capability.
pub type SharedSystem = Arc<dyn SystemOps>;

/// The production [`SystemOps`] implementation.
pub struct RealSystem;

impl SystemOps for RealSystem {
    fn hostname(&self) -> Result<String> {
        let name = hostname::get().context("error getting hostname")?;
        Ok(name.to_string_lossy().into_owned())
    }

    fn current_user(&self) -> Result<String> {
        let uid = nix::unistd::getuid();
        let user = nix::unistd::User::from_uid(uid)
            .context("error looking up current user")?
            .with_context(|| format!("no passwd entry for uid {}", uid))?;
        Ok(user.name)
    }

    fn interface_addrs(&self) -> Result<Vec<String>> {
        let mut addrs = Vec::new();
        for ifaddr in nix::ifaddrs::getifaddrs().context("error enumerating interface addresses")? {
            let (address, netmask) = match (&ifaddr.address, &ifaddr.netmask) {
                (Some(address), Some(netmask)) => (address, netmask),
                _ => continue,
            };
            let ip: IpAddr = if let Some(sin) = address.as_sockaddr_in() {
                IpAddr::V4(std::net::Ipv4Addr::from(sin.ip()))
            } else if let Some(sin6) = address.as_sockaddr_in6() {
                IpAddr::V6(sin6.ip())
            } else {
                continue;
            };
            if ip.is_loopback() {
                continue;
            }
            let mask: IpAddr = if let Some(sin) = netmask.as_sockaddr_in() {
                IpAddr::V4(std::net::Ipv4Addr::from(sin.ip()))
            } else if let Some(sin6) = netmask.as_sockaddr_in6() {
                IpAddr::V6(sin6.ip())
            } else {
                continue;
            };
            let prefix = ipnet::ip_mask_to_prefix(mask).context("error converting interface netmask to a prefix length")?;
            addrs.push(format!("{}/{}", ip, prefix));
        }
        Ok(addrs)
    }

    fn locales(&self) -> Result<Vec<String>> {
        let output = std::process::Command::new("/usr/bin/locale")
            .arg("-a")
            .output()
            .context("failed to get locales on this system")?;
        if !output.status.success() {
            anyhow::bail!("failed to get locales on this system: {}", String::from_utf8_lossy(&output.stderr));
        }
        Ok(String::from_utf8_lossy(&output.stdout).lines().map(|line| line.trim().to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_system_reports_hostname_and_user() {
        let sys = RealSystem;
        assert!(!sys.hostname().expect("error getting hostname").is_empty());
        assert!(!sys.current_user().expect("error getting user").is_empty());
    }

    #[test]
    fn test_interface_addrs_have_prefixes_and_no_loopback() {
        let addrs = RealSystem.interface_addrs().expect("error getting interface addrs");
        for addr in &addrs {
            assert!(addr.contains('/'), "address {} is not in CIDR form", addr);
            assert!(!addr.starts_with("127."), "loopback address {} returned", addr);
            assert!(!addr.starts_with("::1/"), "loopback address {} returned", addr);
        }
    }
}
