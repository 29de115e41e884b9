//! The topology expander.
//!
//! Turns the compact config form (hostlist + per-host directory lists +
//! base ports + mirroring strategy) into the full segment-pair array.
//! Expansion is deterministic: hosts are processed in lexical order and
//! multi-home address selection is round-robin per hostname.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tonic::transport::Channel;

use crate::config::{InitConfig, SegmentConfig, SegmentPairConfig};
use crate::logger;
use lattice_core::constants::{DEFAULT_SEG_PREFIX, GROUP_MIRRORING, SPREAD_MIRRORING};
use lattice_core::error::format_grpc_error;
use lattice_core::idl::{GetAllHostNamesRequest, HubClient};

/// The host layout derived from resolving every listed address.
pub struct HostTopology {
    pub multi_home: bool,
    /// Hostname to its addresses, lexically ordered on both levels.
    pub name_address_map: BTreeMap<String, Vec<String>>,
    /// Address back to its canonical hostname.
    pub address_name_map: BTreeMap<String, String>,
}

/// The expansion result; the mirror flag is carried explicitly instead of
/// being rediscovered from the pair list downstream.
pub struct ExpandedPlan {
    pub pairs: Vec<SegmentPairConfig>,
    pub contains_mirror: bool,
}

/// Expand the compact form in place, resolving hostnames through the hub.
pub async fn expand_config(hub: &mut HubClient<Channel>, config: &mut InitConfig) -> Result<()> {
    validate_expansion_config(config)?;

    let reply = hub
        .get_all_host_names(GetAllHostNamesRequest {
            host_list: config.hostlist.clone(),
        })
        .await
        .map_err(format_grpc_error)?
        .into_inner();
    let topology = analyze_host_names(&config.hostlist, &reply.host_name_map)?;

    let plan = expand_segment_pairs(config, &topology)?;
    config.segment_array = plan.pairs;
    Ok(())
}

/// Check the compact-form keys and fill their documented defaults.
pub fn validate_expansion_config(config: &mut InitConfig) -> Result<()> {
    if config.primary_data_directories.is_empty() {
        bail!("primary-data-directories not specified. Please specify primary-data-directories to continue");
    }
    if config.hostlist.is_empty() {
        bail!("hostlist not specified. Please specify hostlist to continue");
    }

    let coordinator_port = config.coordinator.as_ref().map(|seg| seg.port).unwrap_or(0);
    if config.primary_base_port.unwrap_or(0) < 1 {
        let default = coordinator_port + 2;
        logger::warn(&format!("No primary-base-port value provided. Setting default to: {}", default));
        config.primary_base_port = Some(default);
    }

    if config.has_expansion_mirror_keys() {
        if config.primary_data_directories.len() != config.mirror_data_directories.len() {
            bail!("number of primary-data-directories should be equal to number of mirror-data-directories");
        }
        if config.mirror_base_port.unwrap_or(0) < 1 {
            let default = coordinator_port + 1002;
            logger::warn(&format!("No mirror-base-port value provided. Setting default to: {}", default));
            config.mirror_base_port = Some(default);
        }

        let mirroring_type = match &config.mirroring_type {
            None => {
                logger::warn("Mirroring type not specified. Setting default as 'group' mirroring");
                GROUP_MIRRORING.to_string()
            }
            Some(value) => {
                let value = value.to_lowercase();
                if value != GROUP_MIRRORING && value != SPREAD_MIRRORING {
                    bail!("mirroring-type: {} is not supported. Only 'group' or 'spread' mirroring is supported", value);
                }
                value
            }
        };
        if mirroring_type == SPREAD_MIRRORING && config.mirror_data_directories.len() >= config.hostlist.len() {
            bail!(
                "To enable spread mirroring, number of hosts should be more than number of primary segments per host. \
                 Current number of hosts is: {} and number of primaries per host is:{}",
                config.hostlist.len(),
                config.mirror_data_directories.len()
            );
        }
        config.mirroring_type = Some(mirroring_type);
    } else {
        logger::warn("No mirror-data-directories provided. Will create mirrorless cluster");
    }

    if !config.segment_array.is_empty() {
        bail!("segment-array should be empty when the configuration contains primary-data-directories and hostlist");
    }
    Ok(())
}

/// Group the resolved addresses by hostname; more addresses than hostnames
/// means a multi-home layout.
pub fn analyze_host_names(hostlist: &[String], address_name_map: &HashMap<String, String>) -> Result<HostTopology> {
    let mut addresses: Vec<String> = hostlist.to_vec();
    addresses.sort();
    addresses.dedup();

    let mut name_address_map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut resolved: BTreeMap<String, String> = BTreeMap::new();
    for address in &addresses {
        let hostname = address_name_map
            .get(address)
            .with_context(|| format!("no hostname resolved for address {}", address))?;
        name_address_map.entry(hostname.clone()).or_default().push(address.clone());
        resolved.insert(address.clone(), hostname.clone());
    }

    Ok(HostTopology {
        multi_home: addresses.len() > name_address_map.len(),
        name_address_map,
        address_name_map: resolved,
    })
}

/// Materialize the full segment-pair array for the given topology.
pub fn expand_segment_pairs(config: &InitConfig, topology: &HostTopology) -> Result<ExpandedPlan> {
    let contains_mirror = config.has_expansion_mirror_keys();
    let primary_base_port = config.primary_base_port.context("primary-base-port not set")?;
    let mirroring_type = config.mirroring_type.clone().unwrap_or_else(|| GROUP_MIRRORING.to_string());

    let mut pairs;
    if topology.multi_home {
        let hostnames: Vec<String> = topology.name_address_map.keys().cloned().collect();
        pairs = expand_multi_home_primaries(primary_base_port, &config.primary_data_directories, &hostnames, &topology.name_address_map);
        if contains_mirror {
            let mirror_base_port = config.mirror_base_port.context("mirror-base-port not set")?;
            if mirroring_type == GROUP_MIRRORING {
                add_multi_home_group_mirrors(&mut pairs, mirror_base_port, &config.mirror_data_directories, &hostnames, &topology.name_address_map);
            } else {
                add_multi_home_spread_mirrors(&mut pairs, mirror_base_port, &config.mirror_data_directories, &hostnames, &topology.name_address_map);
            }
        }
    } else {
        let addresses: Vec<String> = topology.address_name_map.keys().cloned().collect();
        pairs = expand_primaries(primary_base_port, &config.primary_data_directories, &addresses, &topology.address_name_map);
        if contains_mirror {
            let mirror_base_port = config.mirror_base_port.context("mirror-base-port not set")?;
            if mirroring_type == GROUP_MIRRORING {
                add_group_mirrors(&mut pairs, mirror_base_port, &config.mirror_data_directories, &addresses, &topology.address_name_map);
            } else {
                add_spread_mirrors(&mut pairs, mirror_base_port, &config.mirror_data_directories, &addresses, &topology.address_name_map);
            }
        }
    }

    Ok(ExpandedPlan { pairs, contains_mirror })
}

fn seg_dir(dir: &str, seg_num: usize) -> String {
    Path::new(dir).join(format!("{}-{}", DEFAULT_SEG_PREFIX, seg_num)).display().to_string()
}

fn expand_primaries(base_port: i32, dirs: &[String], addresses: &[String], address_name_map: &BTreeMap<String, String>) -> Vec<SegmentPairConfig> {
    let mut pairs = Vec::new();
    let mut seg_num = 0;
    for address in addresses {
        for (dir_idx, dir) in dirs.iter().enumerate() {
            pairs.push(SegmentPairConfig {
                primary: Some(SegmentConfig {
                    hostname: address_name_map.get(address).cloned().unwrap_or_else(|| address.clone()),
                    address: address.clone(),
                    port: base_port + dir_idx as i32,
                    data_directory: seg_dir(dir, seg_num),
                }),
                mirror: None,
            });
            seg_num += 1;
        }
    }
    pairs
}

/// Group mirroring: all mirrors of host `h` land on host `h+1 mod H`.
fn add_group_mirrors(pairs: &mut [SegmentPairConfig], base_port: i32, dirs: &[String], addresses: &[String], address_name_map: &BTreeMap<String, String>) {
    let host_count = addresses.len();
    let mut seg_num = 0;
    for host_idx in 0..host_count {
        let address = &addresses[(host_idx + 1) % host_count];
        for (dir_idx, dir) in dirs.iter().enumerate() {
            pairs[seg_num].mirror = Some(SegmentConfig {
                hostname: address_name_map.get(address).cloned().unwrap_or_else(|| address.clone()),
                address: address.clone(),
                port: base_port + dir_idx as i32,
                data_directory: seg_dir(dir, seg_num),
            });
            seg_num += 1;
        }
    }
}

/// Spread mirroring: the mirrors of one host fan out over its successor
/// hosts, one per host.
fn add_spread_mirrors(pairs: &mut [SegmentPairConfig], base_port: i32, dirs: &[String], addresses: &[String], address_name_map: &BTreeMap<String, String>) {
    let host_count = addresses.len();
    let mut seg_num = 0;
    for host_idx in 0..host_count {
        let mut mirror_host_idx = (host_idx + 1) % host_count;
        for (local_seg, dir) in dirs.iter().enumerate() {
            let address = &addresses[mirror_host_idx];
            pairs[seg_num].mirror = Some(SegmentConfig {
                hostname: address_name_map.get(address).cloned().unwrap_or_else(|| address.clone()),
                address: address.clone(),
                port: base_port + local_seg as i32,
                data_directory: seg_dir(dir, seg_num),
            });
            seg_num += 1;
            mirror_host_idx = (mirror_host_idx + 1) % host_count;
        }
    }
}

fn expand_multi_home_primaries(base_port: i32, dirs: &[String], hostnames: &[String], name_address_map: &BTreeMap<String, Vec<String>>) -> Vec<SegmentPairConfig> {
    let mut pairs = Vec::new();
    let mut seg_num = 0;
    for hostname in hostnames {
        let addresses = &name_address_map[hostname];
        for (dir_idx, dir) in dirs.iter().enumerate() {
            pairs.push(SegmentPairConfig {
                primary: Some(SegmentConfig {
                    hostname: hostname.clone(),
                    address: addresses[dir_idx % addresses.len()].clone(),
                    port: base_port + dir_idx as i32,
                    data_directory: seg_dir(dir, seg_num),
                }),
                mirror: None,
            });
            seg_num += 1;
        }
    }
    pairs
}

fn add_multi_home_group_mirrors(pairs: &mut [SegmentPairConfig], base_port: i32, dirs: &[String], hostnames: &[String], name_address_map: &BTreeMap<String, Vec<String>>) {
    let host_count = hostnames.len();
    let mut seg_num = 0;
    for host_idx in 0..host_count {
        let hostname = &hostnames[(host_idx + 1) % host_count];
        let addresses = &name_address_map[hostname];
        for (dir_idx, dir) in dirs.iter().enumerate() {
            pairs[seg_num].mirror = Some(SegmentConfig {
                hostname: hostname.clone(),
                address: addresses[dir_idx % addresses.len()].clone(),
                port: base_port + dir_idx as i32,
                data_directory: seg_dir(dir, seg_num),
            });
            seg_num += 1;
        }
    }
}

fn add_multi_home_spread_mirrors(pairs: &mut [SegmentPairConfig], base_port: i32, dirs: &[String], hostnames: &[String], name_address_map: &BTreeMap<String, Vec<String>>) {
    let host_count = hostnames.len();
    let mut seg_num = 0;
    for host_idx in 0..host_count {
        for (dir_idx, dir) in dirs.iter().enumerate() {
            let mut next_host_idx = (host_idx + dir_idx + 1) % host_count;
            // Never mirror onto the primary's own host.
            if next_host_idx == host_idx {
                next_host_idx = (next_host_idx + 1) % host_count;
            }
            let hostname = &hostnames[next_host_idx];
            let addresses = &name_address_map[hostname];
            pairs[seg_num].mirror = Some(SegmentConfig {
                hostname: hostname.clone(),
                address: addresses[(host_idx + dir_idx) % addresses.len()].clone(),
                port: base_port + dir_idx as i32,
                data_directory: seg_dir(dir, seg_num),
            });
            seg_num += 1;
        }
    }
}
