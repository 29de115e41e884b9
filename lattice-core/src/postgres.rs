//! Wrappers around the database's own utilities.
//!
//! The utilities are invoked as opaque subprocesses; only their arguments,
//! exit codes and output are modeled here. Every invocation goes through a
//! [`Utility`] value so call sites stay declarative and tests can assert on
//! the exact command line.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::constants::DEFAULT_START_TIMEOUT_SECS;
use crate::error::AppError;
use crate::idl::Locale;

/// A single invocation of an installed utility.
pub trait Utility: Send + Sync {
    /// Name of the executable under `<gp_home>/bin`.
    fn name(&self) -> &str;

    /// The full argument list for this invocation.
    fn args(&self) -> Vec<String>;
}

/// Absolute path of a utility under the installation prefix.
pub fn utility_path(gp_home: &str, name: &str) -> PathBuf {
    Path::new(gp_home).join("bin").join(name)
}

fn build_command(gp_home: &str, utility: &dyn Utility) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(utility_path(gp_home, utility.name()));
    cmd.args(utility.args());
    cmd.env("GPHOME", gp_home);
    let path = std::env::var("PATH").unwrap_or_default();
    cmd.env("PATH", format!("{}:{}", Path::new(gp_home).join("bin").display(), path));
    cmd
}

/// Run a utility to completion, returning its combined output.
pub async fn run_utility(gp_home: &str, utility: &dyn Utility) -> Result<String> {
    let output = build_command(gp_home, utility)
        .output()
        .await
        .with_context(|| format!("error spawning {}", utility.name()))?;
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    if !output.status.success() {
        return Err(AppError::Subprocess {
            utility: utility.name().to_string(),
            output: combined.trim().to_string(),
        }
        .into());
    }
    Ok(combined)
}

/// Run a utility to completion without treating a non-zero exit as an error.
///
/// `pg_ctl status` uses exit codes as answers, so callers inspect the status
/// themselves.
pub async fn run_utility_unchecked(gp_home: &str, utility: &dyn Utility) -> Result<(std::process::ExitStatus, String)> {
    let output = build_command(gp_home, utility)
        .output()
        .await
        .with_context(|| format!("error spawning {}", utility.name()))?;
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok((output.status, combined))
}

/// Run a utility, writing its combined output to `logfile` instead of returning it.
///
/// On failure the returned error carries the tail of the output; the logfile
/// is left in place for inspection.
pub async fn run_utility_redirected(gp_home: &str, utility: &dyn Utility, logfile: &Path) -> Result<()> {
    let output = build_command(gp_home, utility)
        .output()
        .await
        .with_context(|| format!("error spawning {}", utility.name()))?;
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    tokio::fs::write(logfile, &combined)
        .await
        .with_context(|| format!("error writing {}", logfile.display()))?;
    if !output.status.success() {
        return Err(AppError::Subprocess {
            utility: utility.name().to_string(),
            output: combined.trim().to_string(),
        }
        .into());
    }
    Ok(())
}

/// Run a utility, forwarding each line of its stdout and stderr as it appears.
pub async fn run_utility_streamed(gp_home: &str, utility: &dyn Utility, lines: mpsc::Sender<String>) -> Result<()> {
    let mut child = build_command(gp_home, utility)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .with_context(|| format!("error spawning {}", utility.name()))?;

    let stdout = child.stdout.take().context("missing child stdout handle")?;
    let stderr = child.stderr.take().context("missing child stderr handle")?;
    let out_task = forward_lines(stdout, lines.clone());
    let err_task = forward_lines(stderr, lines);
    let (out_res, err_res) = tokio::join!(out_task, err_task);
    out_res?;
    err_res?;

    let status = child.wait().await.with_context(|| format!("error awaiting {}", utility.name()))?;
    if !status.success() {
        return Err(AppError::Subprocess {
            utility: utility.name().to_string(),
            output: format!("exited with status {}", status),
        }
        .into());
    }
    Ok(())
}

async fn forward_lines<R: tokio::io::AsyncRead + Unpin>(reader: R, tx: mpsc::Sender<String>) -> Result<()> {
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await.context("error reading subprocess output")? {
        let _res = tx.send(line).await;
    }
    Ok(())
}

///////////////////////////////////////////////////////////////////////////////
// Utility invocations ////////////////////////////////////////////////////////

/// `initdb` into a fresh data directory.
pub struct Initdb {
    pub pg_data: String,
    pub encoding: String,
    pub locale: Locale,
    pub data_checksums: bool,
}

impl Utility for Initdb {
    fn name(&self) -> &str {
        "initdb"
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["-D".to_string(), self.pg_data.clone(), "-E".to_string(), self.encoding.clone()];
        for (flag, value) in locale_flags(&self.locale) {
            if !value.is_empty() {
                args.push(format!("{}={}", flag, value));
            }
        }
        if self.data_checksums {
            args.push("--data-checksums".to_string());
        }
        args
    }
}

/// Per-field locale flags, individual fields overriding `lc_all`.
fn locale_flags(locale: &Locale) -> Vec<(&'static str, String)> {
    let pick = |field: &str| {
        if field.is_empty() {
            locale.lc_all.clone()
        } else {
            field.to_string()
        }
    };
    vec![
        ("--lc-collate", pick(&locale.lc_collate)),
        ("--lc-ctype", pick(&locale.lc_ctype)),
        ("--lc-messages", pick(&locale.lc_messages)),
        ("--lc-monetary", pick(&locale.lc_monetary)),
        ("--lc-numeric", pick(&locale.lc_numeric)),
        ("--lc-time", pick(&locale.lc_time)),
    ]
}

/// `pg_ctl start` for one local segment.
pub struct PgCtlStart {
    pub pg_data: String,
    pub wait: bool,
    pub timeout_secs: u64,
    pub options: String,
    pub logfile: String,
}

impl PgCtlStart {
    pub fn new(pg_data: &str, wait: bool, options: &str) -> Self {
        Self {
            pg_data: pg_data.to_string(),
            wait,
            timeout_secs: DEFAULT_START_TIMEOUT_SECS,
            options: options.to_string(),
            logfile: Path::new(pg_data).join("log").join("startup.log").display().to_string(),
        }
    }
}

impl Utility for PgCtlStart {
    fn name(&self) -> &str {
        "pg_ctl"
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["start".to_string(), "-D".to_string(), self.pg_data.clone(), "-l".to_string(), self.logfile.clone()];
        if self.wait {
            args.push("-w".to_string());
            args.push("-t".to_string());
            args.push(self.timeout_secs.to_string());
        } else {
            args.push("-W".to_string());
        }
        if !self.options.is_empty() {
            args.push("-o".to_string());
            args.push(self.options.clone());
        }
        args
    }
}

/// Graceful `pg_ctl stop`.
pub struct PgCtlStop {
    pub pg_data: String,
}

impl Utility for PgCtlStop {
    fn name(&self) -> &str {
        "pg_ctl"
    }

    fn args(&self) -> Vec<String> {
        vec!["stop".to_string(), "-D".to_string(), self.pg_data.clone(), "-m".to_string(), "smart".to_string(), "-w".to_string()]
    }
}

/// `pg_ctl status`; exit code 3 means no server is running.
pub struct PgCtlStatus {
    pub pg_data: String,
}

impl Utility for PgCtlStatus {
    fn name(&self) -> &str {
        "pg_ctl"
    }

    fn args(&self) -> Vec<String> {
        vec!["status".to_string(), "-D".to_string(), self.pg_data.clone()]
    }
}

/// `pg_ctl reload` after a conf change.
pub struct PgCtlReload {
    pub pg_data: String,
}

impl Utility for PgCtlReload {
    fn name(&self) -> &str {
        "pg_ctl"
    }

    fn args(&self) -> Vec<String> {
        vec!["reload".to_string(), "-D".to_string(), self.pg_data.clone()]
    }
}

/// `pg_basebackup` of a primary into a mirror data directory.
pub struct PgBasebackup {
    pub target_dir: String,
    pub source_host: String,
    pub source_port: i32,
    pub create_slot: bool,
    pub force_overwrite: bool,
    pub target_dbid: i32,
    pub write_recovery_conf: bool,
    pub replication_slot_name: String,
    pub exclude_paths: Vec<String>,
}

impl Utility for PgBasebackup {
    fn name(&self) -> &str {
        "pg_basebackup"
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-D".to_string(),
            self.target_dir.clone(),
            "-h".to_string(),
            self.source_host.clone(),
            "-p".to_string(),
            self.source_port.to_string(),
            "-X".to_string(),
            "stream".to_string(),
            "--target-gp-dbid".to_string(),
            self.target_dbid.to_string(),
        ];
        if self.create_slot {
            args.push("--create-slot".to_string());
        }
        if !self.replication_slot_name.is_empty() {
            args.push("-S".to_string());
            args.push(self.replication_slot_name.clone());
        }
        if self.force_overwrite {
            args.push("--force-overwrite".to_string());
        }
        if self.write_recovery_conf {
            args.push("--write-recovery-conf".to_string());
        }
        for path in &self.exclude_paths {
            args.push("-E".to_string());
            args.push(path.clone());
        }
        args
    }
}

/// `pg_controldata` for one data directory.
pub struct PgControlData {
    pub pg_data: String,
}

impl Utility for PgControlData {
    fn name(&self) -> &str {
        "pg_controldata"
    }

    fn args(&self) -> Vec<String> {
        vec![self.pg_data.clone()]
    }
}

/// `postgres --gp-version`, the cluster compatibility string.
pub struct PostgresGpVersion;

impl Utility for PostgresGpVersion {
    fn name(&self) -> &str {
        "postgres"
    }

    fn args(&self) -> Vec<String> {
        vec!["--gp-version".to_string()]
    }
}

/// The cluster-wide start utility, run once to bring the whole cluster up.
pub struct LatticeStart {
    pub data_directory: String,
    pub verbose: bool,
}

impl Utility for LatticeStart {
    fn name(&self) -> &str {
        "latticestart"
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["-a".to_string(), "-d".to_string(), self.data_directory.clone()];
        if self.verbose {
            args.push("-v".to_string());
        }
        args
    }
}

/// Copy a file to a set of hosts.
pub struct LatticeSync {
    pub hostnames: Vec<String>,
    pub source: String,
    pub destination: String,
}

impl Utility for LatticeSync {
    fn name(&self) -> &str {
        "latticesync"
    }

    fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for host in &self.hostnames {
            args.push("-h".to_string());
            args.push(host.clone());
        }
        args.push(self.source.clone());
        args.push(self.destination.clone());
        args
    }
}

/// Run a shell command on a set of hosts.
pub struct LatticeSsh {
    pub hostnames: Vec<String>,
    pub command: String,
}

impl Utility for LatticeSsh {
    fn name(&self) -> &str {
        "latticessh"
    }

    fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for host in &self.hostnames {
            args.push("-h".to_string());
            args.push(host.clone());
        }
        args.push(self.command.clone());
        args
    }
}

///////////////////////////////////////////////////////////////////////////////
// Configuration files ////////////////////////////////////////////////////////

/// Read one setting out of `<pgdata>/postgresql.conf`.
pub fn get_config_value(pg_data: &str, key: &str) -> Result<String> {
    let path = Path::new(pg_data).join("postgresql.conf");
    let contents = std::fs::read_to_string(&path).with_context(|| format!("error reading {}", path.display()))?;
    for line in contents.lines() {
        if let Some((k, v)) = split_conf_line(line) {
            if k == key {
                return Ok(v);
            }
        }
    }
    anyhow::bail!("did not find {:?} in {}", key, path.display())
}

/// Rewrite `<pgdata>/postgresql.conf` with the given settings.
///
/// With `overwrite`, existing keys are replaced in place; otherwise existing
/// keys are left untouched and only missing keys are appended, which makes
/// repeated application of the same set a no-op.
pub fn update_postgresql_conf(pg_data: &str, params: &HashMap<String, String>, overwrite: bool) -> Result<()> {
    let path = Path::new(pg_data).join("postgresql.conf");
    let contents = std::fs::read_to_string(&path).with_context(|| format!("error reading {}", path.display()))?;

    let mut seen: Vec<&str> = Vec::new();
    let mut out = String::with_capacity(contents.len());
    for line in contents.lines() {
        let key = split_conf_line(line).and_then(|(k, _)| params.get_key_value(k).map(|(k, _)| k.as_str()));
        match key {
            Some(key) => {
                seen.push(key);
                if overwrite {
                    out.push_str(&format!("{} = {}\n", key, params[key]));
                } else {
                    out.push_str(line);
                    out.push('\n');
                }
            }
            None => {
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    let mut missing: Vec<&String> = params.keys().filter(|key| !seen.contains(&key.as_str())).collect();
    missing.sort();
    for key in missing {
        out.push_str(&format!("{} = {}\n", key, params[key]));
    }

    std::fs::write(&path, out).with_context(|| format!("error writing {}", path.display()))
}

/// Split a `key = value` conf line, ignoring comments and blanks.
fn split_conf_line(line: &str) -> Option<(&str, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let value = value.trim();
    let value = value.split('#').next().unwrap_or("").trim();
    Some((key.trim(), value.trim_matches('\'').to_string()))
}

/// Write `<pgdata>/pg_hba.conf` for a freshly initialized segment.
///
/// Local connections for the owning user pass over the unix socket; remote
/// access is granted exactly to the given coordinator entries, which carry
/// either hostnames or non-loopback CIDR addresses depending on the
/// cluster's `hba_hostnames` setting (the caller resolves which form the
/// list carries, and no other address entry is emitted).
pub fn write_segment_hba_conf(pg_data: &str, user: &str, coordinator_addrs: &[String]) -> Result<()> {
    let path = Path::new(pg_data).join("pg_hba.conf");
    let mut out = String::new();
    out.push_str(&format!("local all {} trust\n", user));
    for addr in coordinator_addrs {
        out.push_str(&format!("host all {} {} trust\n", user, addr));
    }
    std::fs::write(&path, out).with_context(|| format!("error writing {}", path.display()))
}

/// Append access entries to `<pgdata>/pg_hba.conf`.
pub fn append_hba_entries(pg_data: &str, user: &str, addrs: &[String], replication: bool) -> Result<()> {
    let path = Path::new(pg_data).join("pg_hba.conf");
    let mut contents = std::fs::read_to_string(&path).with_context(|| format!("error reading {}", path.display()))?;
    let database = if replication { "replication" } else { "all" };
    for addr in addrs {
        let entry = format!("host {} {} {} trust", database, user, addr);
        if !contents.lines().any(|line| line.trim() == entry) {
            contents.push_str(&entry);
            contents.push('\n');
        }
    }
    std::fs::write(&path, contents).with_context(|| format!("error writing {}", path.display()))
}

/// Parse `pg_controldata` output into its `key: value` pairs.
pub fn parse_pg_controldata(output: &str) -> HashMap<String, String> {
    let mut result = HashMap::new();
    for line in output.lines() {
        if let Some((key, value)) = line.split_once(':') {
            result.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    result
}
