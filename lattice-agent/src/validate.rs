//! Host environment validation.
//!
//! All checks run and every finding is collected so the operator can fix
//! everything at once. Non-fatal findings come back as warnings in the
//! reply; any fatal finding turns the whole call into an error carrying all
//! fatal messages.

use std::collections::BTreeSet;
use std::convert::TryFrom;
use std::net::TcpListener;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use anyhow::Result;

use lattice_core::error::AppError;
use lattice_core::idl::{Locale, LogLevel, LogMessage, ValidateHostEnvRequest};
use lattice_core::postgres::{run_utility, utility_path, PostgresGpVersion};
use lattice_core::sys::SystemOps;

pub async fn validate_host_env(sys: &dyn SystemOps, gp_home: &str, req: &ValidateHostEnvRequest) -> Result<Vec<LogMessage>> {
    let mut warnings = Vec::new();
    let mut fatals = Vec::new();

    let (dir_warnings, dir_fatal) = check_directories(&req.directory_list, req.forced)?;
    warnings.extend(dir_warnings);
    if let Some(fatal) = dir_fatal {
        fatals.push(fatal);
    }

    let (addr_warnings, busy) = check_ports(&req.host_address_list, &req.port_list);
    warnings.extend(addr_warnings);
    if !busy.is_empty() {
        fatals.push(format!("ports already in use: {:?}, check if cluster already running", busy));
    }

    match run_utility(gp_home, &PostgresGpVersion).await {
        Ok(out) => {
            let local = out.trim().to_string();
            if local != req.gp_version {
                fatals.push(format!("postgres gp-version {:?} on this host does not match the coordinator gp-version {:?}", local, req.gp_version));
            }
        }
        Err(err) => fatals.push(format!("fetching postgres gp-version: {:#}", err)),
    }

    let initdb = utility_path(gp_home, "initdb");
    match std::fs::metadata(&initdb) {
        Ok(meta) if meta.permissions().mode() & 0o111 == 0 => {
            fatals.push(format!("file {} does not have execute permissions", initdb.display()));
        }
        Ok(_) => {}
        Err(err) => fatals.push(format!("could not stat file {}: {}", initdb.display(), err)),
    }

    if let Some(locale) = &req.locale {
        let available = sys.locales()?;
        for missing in check_locales(&available, locale) {
            fatals.push(format!("locale value {:?} is not a valid locale on this host", missing));
        }
    }

    if !fatals.is_empty() {
        return Err(AppError::Env(fatals.join("; ")).into());
    }
    Ok(warnings)
}

/// Check that every target directory either does not exist or is empty.
pub fn check_directories(dirs: &[String], forced: bool) -> Result<(Vec<LogMessage>, Option<String>)> {
    let mut warnings = Vec::new();
    let mut dirty = Vec::new();
    for dir in dirs {
        let path = Path::new(dir);
        if !path.exists() {
            continue;
        }
        let empty = path.read_dir().map(|mut entries| entries.next().is_none()).unwrap_or(false);
        if empty {
            continue;
        }
        if forced {
            warnings.push(warning(format!("directory {} is not empty, it will be overwritten", dir)));
        } else {
            dirty.push(dir.clone());
        }
    }
    let fatal = if dirty.is_empty() {
        None
    } else {
        Some(format!("directory not empty:[{}]", dirty.join(", ")))
    };
    Ok((warnings, fatal))
}

/// Probe every (address, port) combination by binding; a failed bind means
/// the port is taken on that address.
pub fn check_ports(addrs: &[String], ports: &[u32]) -> (Vec<LogMessage>, Vec<u32>) {
    let mut warnings = Vec::new();
    let mut busy = BTreeSet::new();
    let fallback = vec!["0.0.0.0".to_string()];
    let addrs = if addrs.is_empty() { &fallback } else { addrs };
    for addr in addrs {
        for &port in ports {
            let bindable = match u16::try_from(port) {
                Ok(p) if p > 0 => p,
                _ => {
                    warnings.push(warning(format!("skipping probe of out-of-range port {}", port)));
                    continue;
                }
            };
            match TcpListener::bind((addr.as_str(), bindable)) {
                Ok(listener) => drop(listener),
                Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                    busy.insert(port);
                }
                Err(_) => {
                    warnings.push(warning(format!("could not probe port {} on address {}", port, addr)));
                }
            }
        }
    }
    (warnings, busy.into_iter().collect())
}

/// Return the requested locale values missing from the installed set.
pub fn check_locales(available: &[String], locale: &Locale) -> Vec<String> {
    let normalized: BTreeSet<String> = available.iter().map(|l| normalize_locale(l)).collect();
    let mut missing = Vec::new();
    let fields: Vec<&String> = vec![
        &locale.lc_all,
        &locale.lc_collate,
        &locale.lc_ctype,
        &locale.lc_messages,
        &locale.lc_monetary,
        &locale.lc_numeric,
        &locale.lc_time,
    ];
    for field in fields {
        if field.is_empty() {
            continue;
        }
        if !normalized.contains(&normalize_locale(field)) && !missing.contains(field) {
            missing.push(field.clone());
        }
    }
    missing
}

/// Locales compare equal modulo case and codeset punctuation, so
/// `en_US.UTF-8` matches the installed `en_US.utf8`.
fn normalize_locale(locale: &str) -> String {
    locale.to_lowercase().replace('-', "")
}

fn warning(message: String) -> LogMessage {
    LogMessage {
        message,
        level: LogLevel::Warning as i32,
    }
}
