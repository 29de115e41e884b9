//! Cluster initialization config decoding and validation.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::logger;
use lattice_core::config::ServiceConfig;
use lattice_core::constants::{DEFAULT_BUFFERS, DEFAULT_ENCODING, DEFAULT_QD_MAX_CONNECT, QE_CONNECT_FACTOR};
use lattice_core::idl;

/// Locale settings as declared in the config file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LocaleConfig {
    #[serde(default)]
    pub lc_all: String,
    #[serde(default)]
    pub lc_collate: String,
    #[serde(default)]
    pub lc_ctype: String,
    #[serde(default)]
    pub lc_messages: String,
    #[serde(default)]
    pub lc_monetary: String,
    #[serde(default)]
    pub lc_numeric: String,
    #[serde(default)]
    pub lc_time: String,
}

impl LocaleConfig {
    pub fn to_idl(&self) -> idl::Locale {
        idl::Locale {
            lc_all: self.lc_all.clone(),
            lc_collate: self.lc_collate.clone(),
            lc_ctype: self.lc_ctype.clone(),
            lc_messages: self.lc_messages.clone(),
            lc_monetary: self.lc_monetary.clone(),
            lc_numeric: self.lc_numeric.clone(),
            lc_time: self.lc_time.clone(),
        }
    }
}

/// One segment as declared in the config file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SegmentConfig {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub port: i32,
    #[serde(default)]
    pub data_directory: String,
}

impl SegmentConfig {
    pub fn to_idl(&self) -> idl::Segment {
        idl::Segment {
            port: self.port,
            data_directory: self.data_directory.clone(),
            host_name: self.hostname.clone(),
            host_address: self.address.clone(),
            contentid: 0,
            dbid: 0,
        }
    }
}

/// A declared primary and its optional mirror.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SegmentPairConfig {
    pub primary: Option<SegmentConfig>,
    pub mirror: Option<SegmentConfig>,
}

/// The cluster initialization config file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct InitConfig {
    #[serde(default)]
    pub db_name: String,
    #[serde(default)]
    pub encoding: String,
    #[serde(default)]
    pub hba_hostnames: bool,
    pub data_checksums: Option<bool>,
    #[serde(default)]
    pub su_password: String,
    pub locale: Option<LocaleConfig>,
    #[serde(default)]
    pub common_config: HashMap<String, String>,
    #[serde(default)]
    pub coordinator_config: HashMap<String, String>,
    #[serde(default)]
    pub segment_config: HashMap<String, String>,
    pub coordinator: Option<SegmentConfig>,
    #[serde(default)]
    pub segment_array: Vec<SegmentPairConfig>,

    // Expansion config parameters.
    pub primary_base_port: Option<i32>,
    #[serde(default)]
    pub primary_data_directories: Vec<String>,
    #[serde(default)]
    pub hostlist: Vec<String>,
    pub mirror_base_port: Option<i32>,
    #[serde(default)]
    pub mirror_data_directories: Vec<String>,
    pub mirroring_type: Option<String>,
}

impl InitConfig {
    /// Decode the config file, picking the format from its extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).with_context(|| format!("while reading config file: {}", path.display()))?;
        let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        let config = match ext {
            "json" => serde_json::from_str(&contents).with_context(|| format!("while unmarshaling config file: {}", path.display()))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents).with_context(|| format!("while unmarshaling config file: {}", path.display()))?,
            "toml" => toml::from_str(&contents).with_context(|| format!("while unmarshaling config file: {}", path.display()))?,
            other => bail!("unsupported config file format {:?}, expected json, yaml or toml", other),
        };
        Ok(config)
    }

    /// Whether any of the compact-form expansion keys is present.
    pub fn has_expansion_keys(&self) -> bool {
        !self.hostlist.is_empty()
            || !self.primary_data_directories.is_empty()
            || self.primary_base_port.is_some()
            || self.has_expansion_mirror_keys()
    }

    /// Whether any of the mirror expansion keys is present.
    pub fn has_expansion_mirror_keys(&self) -> bool {
        self.mirroring_type.is_some() || self.mirror_base_port.is_some() || !self.mirror_data_directories.is_empty()
    }

    /// Build the RPC request from the (possibly expanded) config.
    pub fn to_request(&self, force: bool, verbose: bool) -> idl::MakeClusterRequest {
        let segment_pairs = self
            .segment_array
            .iter()
            .map(|pair| idl::SegmentPair {
                primary: pair.primary.as_ref().map(SegmentConfig::to_idl),
                mirror: pair.mirror.as_ref().map(SegmentConfig::to_idl),
            })
            .collect();

        idl::MakeClusterRequest {
            plan: Some(idl::ClusterPlan {
                coordinator: self.coordinator.as_ref().map(SegmentConfig::to_idl),
                segment_array: segment_pairs,
            }),
            cluster_params: Some(idl::ClusterParams {
                coordinator_config: self.coordinator_config.clone(),
                segment_config: self.segment_config.clone(),
                common_config: self.common_config.clone(),
                locale: Some(self.locale.clone().unwrap_or_default().to_idl()),
                hba_hostnames: self.hba_hostnames,
                encoding: self.encoding.clone(),
                su_password: self.su_password.clone(),
                db_name: self.db_name.clone(),
                data_checksums: self.data_checksums.unwrap_or(true),
            }),
            force_flag: force,
            verbose,
        }
    }
}

/// Validate the assembled request and fill in the documented defaults.
///
/// Everything here is checked before any RPC leaves the CLI, so operator
/// mistakes surface without touching a single host.
pub fn validate_input_config(request: &mut idl::MakeClusterRequest, config: &InitConfig, conf: &ServiceConfig) -> Result<()> {
    if config.coordinator.is_none() {
        bail!("no coordinator segment provided in input config file");
    }
    if config.segment_array.is_empty() && config.primary_data_directories.is_empty() {
        bail!("no primary segments are provided in input config file");
    }

    let plan = request.plan.as_mut().context("no cluster plan in request")?;
    let declared_pairs = plan.segment_array.len();

    let num_primary = plan.segment_array.iter().filter(|pair| pair.primary.is_some()).count();
    let num_mirror = plan.segment_array.iter().filter(|pair| pair.mirror.is_some()).count();
    if num_primary == 0 {
        bail!("no primary segments are provided in input config file");
    }
    if num_primary != declared_pairs {
        bail!("invalid segment array, primary segments are missing in some segment objects");
    }
    if num_mirror != 0 && num_primary != num_mirror {
        bail!("number of primary segments {} and number of mirror segments {} must be equal", num_primary, num_mirror);
    }

    let coordinator = plan.coordinator.as_mut().context("no coordinator in cluster plan")?;
    validate_segment(coordinator)?;
    for pair in plan.segment_array.iter_mut() {
        if let Some(primary) = pair.primary.as_mut() {
            validate_segment(primary)?;
        }
        if let Some(mirror) = pair.mirror.as_mut() {
            validate_segment(mirror)?;
        }
    }

    let all_segments: Vec<&idl::Segment> = plan
        .segment_array
        .iter()
        .flat_map(|pair| pair.primary.iter().chain(pair.mirror.iter()))
        .collect();
    check_duplicate_port_and_data_directory(&all_segments)?;
    check_services_enabled(coordinator, &all_segments, conf)?;

    let params = request.cluster_params.as_mut().context("no cluster params in request")?;
    if params.encoding.is_empty() {
        logger::info(&format!("Could not find encoding in cluster config, defaulting to {}", DEFAULT_ENCODING));
        params.encoding = DEFAULT_ENCODING.to_string();
    }
    if params.encoding == "SQL_ASCII" {
        bail!("SQL_ASCII is no longer supported as a server encoding");
    }

    validate_max_connections(params)?;
    set_default_config_param(params, "shared_buffers", DEFAULT_BUFFERS);

    Ok(())
}

/// Check one segment's identity fields, defaulting the address to the
/// hostname when absent.
pub fn validate_segment(segment: &mut idl::Segment) -> Result<()> {
    if segment.host_name.is_empty() {
        bail!(
            "hostname has not been provided for the segment with port {} and data_directory {}",
            segment.port,
            segment.data_directory
        );
    }
    if segment.host_address.is_empty() {
        segment.host_address = segment.host_name.clone();
        logger::warn(&format!(
            "address has not been provided, populating it with the hostname {} for the segment with port {} and data_directory {}",
            segment.host_name, segment.port, segment.data_directory
        ));
    }
    if segment.port <= 0 {
        bail!("invalid port has been provided for segment with hostname {} and data_directory {}", segment.host_name, segment.data_directory);
    }
    if segment.data_directory.is_empty() {
        bail!("data_directory has not been provided for segment with hostname {} and port {}", segment.host_name, segment.port);
    }
    Ok(())
}

/// Reject duplicate data directories per hostname and duplicate ports per
/// address; a host may reuse a port on a different address.
pub fn check_duplicate_port_and_data_directory(segs: &[&idl::Segment]) -> Result<()> {
    let mut host_to_data_directory: BTreeSet<(String, String)> = BTreeSet::new();
    let mut address_to_port: BTreeSet<(String, i32)> = BTreeSet::new();
    for seg in segs {
        if !host_to_data_directory.insert((seg.host_name.clone(), seg.data_directory.clone())) {
            bail!("duplicate data directory entry {} found for host {}", seg.data_directory, seg.host_name);
        }
        if !address_to_port.insert((seg.host_address.clone(), seg.port)) {
            bail!("duplicate port entry {} found for host {}", seg.port, seg.host_name);
        }
    }
    Ok(())
}

/// Every planned host must be part of the configured service host set.
fn check_services_enabled(coordinator: &idl::Segment, segs: &[&idl::Segment], conf: &ServiceConfig) -> Result<()> {
    let mut hosts: BTreeSet<&str> = segs.iter().map(|seg| seg.host_name.as_str()).collect();
    hosts.insert(coordinator.host_name.as_str());

    let configured: BTreeSet<&str> = conf.hostnames.iter().map(String::as_str).collect();
    let missing: Vec<&str> = hosts.difference(&configured).copied().collect();
    if !missing.is_empty() {
        bail!("following hostnames {:?} do not have lattice services configured. Please configure the services", missing);
    }
    Ok(())
}

/// Fill the documented max_connections defaults and reject invalid values.
///
/// The coordinator inherits the common value; segments default to the
/// common value multiplied by the QE connect factor.
pub fn validate_max_connections(params: &mut idl::ClusterParams) -> Result<()> {
    if !params.common_config.contains_key("max_connections") {
        logger::info(&format!("max_connections not set, will set to default value {}", DEFAULT_QD_MAX_CONNECT));
        params.common_config.insert("max_connections".to_string(), DEFAULT_QD_MAX_CONNECT.to_string());
    }

    if !params.coordinator_config.contains_key("max_connections") {
        let common = params.common_config["max_connections"].clone();
        logger::info(&format!("Coordinator max_connections not set, will set to value {} from common config", common));
        params.coordinator_config.insert("max_connections".to_string(), common);
    }
    let coordinator_max_connect: i64 = params.coordinator_config["max_connections"]
        .parse()
        .map_err(|err| anyhow::anyhow!("invalid value {} for max_connections, must be an integer. error: {}", params.coordinator_config["max_connections"], err))?;
    if coordinator_max_connect < 1 {
        bail!("coordinator max_connections value {} is too small. Should be more than 1.", coordinator_max_connect);
    }

    if !params.segment_config.contains_key("max_connections") {
        let common: i64 = params.common_config["max_connections"]
            .parse()
            .map_err(|err| anyhow::anyhow!("invalid value {} for max_connections, must be an integer. error: {}", params.common_config["max_connections"], err))?;
        let segment_max_connect = common * QE_CONNECT_FACTOR as i64;
        logger::info(&format!("Segment max_connections not set, will set to value {}", segment_max_connect));
        params.segment_config.insert("max_connections".to_string(), segment_max_connect.to_string());
    }
    Ok(())
}

/// Default a setting in the common config and inherit it into the
/// coordinator and segment configs when they leave it unset.
pub fn set_default_config_param(params: &mut idl::ClusterParams, param: &str, default: &str) {
    if !params.common_config.contains_key(param) {
        logger::info(&format!("{} is not set in common config, will set to default value {}", param, default));
        params.common_config.insert(param.to_string(), default.to_string());
    }
    let common = params.common_config[param].clone();
    if !params.coordinator_config.contains_key(param) {
        logger::info(&format!("Coordinator {} not set, will set to value {} from common config", param, common));
        params.coordinator_config.insert(param.to_string(), common.clone());
    }
    if !params.segment_config.contains_key(param) {
        logger::info(&format!("Segment {} not set, will set to value {} from common config", param, common));
        params.segment_config.insert(param.to_string(), common);
    }
}

/// Snapshot the host's locale settings from `/usr/bin/locale`.
pub fn system_locale() -> Result<idl::Locale> {
    let output = std::process::Command::new("/usr/bin/locale").output().context("failed to get locale on this system")?;
    if !output.status.success() {
        bail!("failed to get locale on this system: {}", String::from_utf8_lossy(&output.stderr));
    }
    Ok(parse_locale_output(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse `KEY=value` lines of `locale` output; values may be quoted.
pub fn parse_locale_output(output: &str) -> idl::Locale {
    let mut values: HashMap<&str, String> = HashMap::new();
    for line in output.lines() {
        if let Some((key, value)) = line.split_once('=') {
            values.insert(key.trim(), value.trim().trim_matches('"').to_string());
        }
    }
    let get = |key: &str| values.get(key).cloned().unwrap_or_default();
    idl::Locale {
        lc_all: get("LC_ALL"),
        lc_collate: get("LC_COLLATE"),
        lc_ctype: get("LC_CTYPE"),
        lc_messages: get("LC_MESSAGES"),
        lc_monetary: get("LC_MONETARY"),
        lc_numeric: get("LC_NUMERIC"),
        lc_time: get("LC_TIME"),
    }
}
