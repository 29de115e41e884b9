//! Mirror creation, registration and replication wiring.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex as StdMutex};

use anyhow::{anyhow, Context, Result};

use crate::catalog::{CoordinatorConn, GpArray};
use crate::make_cluster::to_idl_segment;
use crate::server::{execute_rpc, Connection, Server};
use crate::stream::{HubStream, ProgressCounter};
use lattice_core::constants::{DEFAULT_DATABASE, REPLICATION_SLOT_NAME};
use lattice_core::error::format_grpc_error;
use lattice_core::idl::{self, AddMirrorsRequest, Segment};

const CONTROL_CHECKSUM_FIELD: &str = "Data page checksum version";

/// Create the given mirrors from their primaries, register them in the
/// catalog and open replication access on every affected primary.
pub async fn add_mirrors(server: &Server, stream: &HubStream, req: &AddMirrorsRequest) -> Result<()> {
    if req.mirrors.is_empty() {
        return Ok(());
    }

    let conns = server.dial_all_agents().await?;
    let conn = CoordinatorConn::new(server.sys(), &req.coordinator_data_dir, false)?;
    let gparray = conn.read_gp_array().await?;

    // Preflight: a checksum mismatch among the registered primaries must
    // reject the whole operation before any base backup runs.
    validate_data_checksums(&conns, &gparray).await?;

    stream.info("Creating mirror segments").await;
    create_mirror_segments(stream, &conns, &gparray, &req.mirrors).await?;
    stream.info("Successfully created mirror segments").await;

    stream.info("Registering mirror segments with the coordinator").await;
    conn.register_mirrors(&req.mirrors).await?;

    // Re-read so the freshly registered mirrors pair up with their primaries.
    let gparray = conn.read_gp_array().await?;
    update_pg_hba_with_mirror_entries(server, &conns, &gparray, &req.mirrors, req.hba_hostnames).await?;

    // Nudge the fault detector so the coordinator notices the new mirrors.
    conn.exec_on_database(DEFAULT_DATABASE, "SELECT gp_request_fts_probe_scan()")
        .await
        .context("triggering FTS probe")?;

    Ok(())
}

/// Base-backup every mirror from its primary, parallel across hosts and
/// parallel within each host.
async fn create_mirror_segments(stream: &HubStream, conns: &[Connection], gparray: &GpArray, mirrors: &[Segment]) -> Result<()> {
    // Mirrors receive dbids in declared order once registered; hand the same
    // dbid to the base backup so the segment is stamped consistently.
    let mut next_dbid = gparray.next_dbid();
    let mut host_map: BTreeMap<String, Vec<(Segment, i32, Segment)>> = BTreeMap::new();
    for mirror in mirrors {
        let (primary, _) = gparray.segment_pair_for_content(mirror.contentid)?;
        host_map
            .entry(mirror.host_name.clone())
            .or_default()
            .push((mirror.clone(), next_dbid, to_idl_segment(primary)));
        next_dbid += 1;
    }

    let progress = Arc::new(ProgressCounter::new(stream.clone(), "Initializing mirror segments:", mirrors.len()));
    progress.start().await;

    let ctx = Arc::new((host_map, progress));
    execute_rpc(conns, move |conn| {
        let ctx = ctx.clone();
        async move {
            let mirrors = ctx.0.get(&conn.hostname).cloned().unwrap_or_default();
            let mut tasks = Vec::with_capacity(mirrors.len());
            for (mirror, dbid, primary) in mirrors {
                let ctx = ctx.clone();
                let client = conn.client.clone();
                tasks.push(tokio::spawn(async move {
                    tracing::debug!(datadir = %mirror.data_directory, "starting to create mirror segment");
                    let request = idl::PgBasebackupRequest {
                        target_dir: mirror.data_directory.clone(),
                        source_host: primary.host_address.clone(),
                        source_port: primary.port,
                        create_slot: true,
                        force_overwrite: true,
                        target_dbid: dbid,
                        write_recovery_conf: true,
                        replication_slot_name: REPLICATION_SLOT_NAME.to_string(),
                        exclude_paths: Vec::new(),
                    };
                    let mut client = client;
                    client.pg_basebackup(request).await.map_err(format_grpc_error)?;
                    ctx.1.tick().await;
                    tracing::debug!(datadir = %mirror.data_directory, "successfully created mirror segment");
                    Ok::<_, anyhow::Error>(())
                }));
            }

            let mut first_err = None;
            for task in tasks {
                let res = match task.await {
                    Ok(res) => res,
                    Err(err) => Err(anyhow!("task panicked: {}", err)),
                };
                if let Err(err) = res {
                    if first_err.is_none() {
                        first_err = Some(err);
                    }
                }
            }
            match first_err {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    })
    .await
}

/// Open streaming replication from each mirror to its primary.
///
/// With hba_hostnames the entries carry the pair's declared addresses;
/// otherwise the interface addresses of both hosts are resolved through
/// their agents.
async fn update_pg_hba_with_mirror_entries(server: &Server, conns: &[Connection], gparray: &GpArray, mirrors: &[Segment], hba_hostnames: bool) -> Result<()> {
    let mut primary_host_map: BTreeMap<String, Vec<(String, Vec<String>)>> = BTreeMap::new();
    for mirror in mirrors {
        let (primary, registered_mirror) = gparray.segment_pair_for_content(mirror.contentid)?;
        let registered_mirror = registered_mirror.with_context(|| format!("mirror for content {} is not registered", mirror.contentid))?;

        let addrs = if hba_hostnames {
            vec![primary.address.clone(), registered_mirror.address.clone()]
        } else {
            let mut addrs = get_interface_addrs(server, &primary.hostname).await?;
            addrs.extend(get_interface_addrs(server, &registered_mirror.hostname).await?);
            addrs
        };
        primary_host_map
            .entry(primary.hostname.clone())
            .or_default()
            .push((primary.datadir.clone(), addrs));
    }

    let ctx = Arc::new(primary_host_map);
    execute_rpc(conns, move |conn| {
        let ctx = ctx.clone();
        async move {
            let targets = ctx.get(&conn.hostname).cloned().unwrap_or_default();
            for (pgdata, addrs) in targets {
                let mut client = conn.client.clone();
                client
                    .update_pg_hba_conf(idl::UpdatePgHbaConfRequest {
                        pgdata,
                        addrs,
                        replication: true,
                    })
                    .await
                    .map_err(format_grpc_error)?;
            }
            Ok(())
        }
    })
    .await
}

/// The interface addresses of one host, resolved through its agent.
pub async fn get_interface_addrs(server: &Server, host: &str) -> Result<Vec<String>> {
    let mut client = server.dial_agent(host).await?;
    let reply = client
        .get_interface_addrs(idl::GetInterfaceAddrsRequest {})
        .await
        .map_err(|status| anyhow!("failed to get interface addresses for host {}: {}", host, status.message()))?;
    Ok(reply.into_inner().addrs)
}

/// Compare every segment's data page checksum version against the
/// coordinator's; any mismatch is an error naming the offending dbids.
pub async fn validate_data_checksums(conns: &[Connection], gparray: &GpArray) -> Result<()> {
    let coordinator_host = gparray.coordinator.hostname.clone();
    let coordinator_dir = gparray.coordinator.datadir.clone();
    let coordinator_conns = crate::server::conns_for_hosts(conns, &[coordinator_host]);
    let coordinator_value: Arc<StdMutex<String>> = Arc::new(StdMutex::new(String::new()));

    let ctx = Arc::new((coordinator_dir, coordinator_value.clone()));
    execute_rpc(&coordinator_conns, move |conn| {
        let ctx = ctx.clone();
        async move {
            let mut client = conn.client;
            let reply = client
                .pg_control_data(idl::PgControlDataRequest {
                    pgdata: ctx.0.clone(),
                    params: vec![CONTROL_CHECKSUM_FIELD.to_string()],
                })
                .await
                .map_err(format_grpc_error)?;
            let value = reply.into_inner().result.get(CONTROL_CHECKSUM_FIELD).cloned().unwrap_or_default();
            *ctx.1.lock().expect("checksum mutex poisoned") = value;
            Ok(())
        }
    })
    .await?;

    let mut host_map: BTreeMap<String, Vec<(i32, String)>> = BTreeMap::new();
    for seg in &gparray.segments {
        host_map.entry(seg.hostname.clone()).or_default().push((seg.dbid, seg.datadir.clone()));
    }

    let checksums: Arc<StdMutex<BTreeMap<i32, String>>> = Arc::new(StdMutex::new(BTreeMap::new()));
    let ctx = Arc::new((host_map, checksums.clone()));
    execute_rpc(conns, move |conn| {
        let ctx = ctx.clone();
        async move {
            let segs = ctx.0.get(&conn.hostname).cloned().unwrap_or_default();
            let mut tasks = Vec::with_capacity(segs.len());
            for (dbid, datadir) in segs {
                let ctx = ctx.clone();
                let client = conn.client.clone();
                tasks.push(tokio::spawn(async move {
                    let mut client = client;
                    let reply = client
                        .pg_control_data(idl::PgControlDataRequest {
                            pgdata: datadir,
                            params: vec![CONTROL_CHECKSUM_FIELD.to_string()],
                        })
                        .await
                        .map_err(format_grpc_error)?;
                    let value = reply.into_inner().result.get(CONTROL_CHECKSUM_FIELD).cloned().unwrap_or_default();
                    ctx.1.lock().expect("checksum mutex poisoned").insert(dbid, value);
                    Ok::<_, anyhow::Error>(())
                }));
            }
            let mut first_err = None;
            for task in tasks {
                let res = match task.await {
                    Ok(res) => res,
                    Err(err) => Err(anyhow!("task panicked: {}", err)),
                };
                if let Err(err) = res {
                    if first_err.is_none() {
                        first_err = Some(err);
                    }
                }
            }
            match first_err {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    })
    .await?;

    let coordinator_value = coordinator_value.lock().expect("checksum mutex poisoned").clone();
    let checksums = checksums.lock().expect("checksum mutex poisoned").clone();
    let inconsistent = inconsistent_checksum_dbids(&coordinator_value, &checksums);
    if !inconsistent.is_empty() {
        anyhow::bail!(
            "data page checksum version for segments with dbid {:?} does not match the coordinator value of {}",
            inconsistent,
            coordinator_value
        );
    }
    Ok(())
}

/// The dbids whose checksum version differs from the coordinator's.
pub fn inconsistent_checksum_dbids(coordinator_value: &str, checksums: &BTreeMap<i32, String>) -> Vec<i32> {
    checksums
        .iter()
        .filter(|(_, value)| value.as_str() != coordinator_value)
        .map(|(dbid, _)| *dbid)
        .collect()
}
