//! The multi-phase cluster initialization procedure.
//!
//! Phases run strictly in order: journal precondition, dial + validate,
//! create coordinator, register, create primaries, restart in production
//! mode, finalize, mirrors, journal removal. Within a phase, per-host and
//! per-segment fan-out is parallel.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex as StdMutex};

use anyhow::{anyhow, bail, Context, Result};

use crate::catalog::{CatalogSegment, CoordinatorConn, GpArray};
use crate::mirrors;
use crate::server::{conns_for_hosts, execute_rpc, Connection, Server};
use crate::stream::{HubStream, ProgressCounter};
use lattice_core::constants::DEFAULT_DATABASE;
use lattice_core::error::{format_grpc_error, AppError, AppErrorExt};
use lattice_core::idl::{self, ClusterParams, ClusterPlan, LogLevel, LogMessage, MakeClusterRequest, Segment, SegmentPair};
use lattice_core::journal::{CleanupJournal, JournalEntry};
use lattice_core::postgres::{run_utility, LatticeStart, PgCtlStop, PostgresGpVersion};
use lattice_core::sys::SystemOps;

/// Run the full MakeCluster procedure, reporting the outcome on the stream.
///
/// Once the coordinator is up, any failure before the production restart
/// stops it again on the way out so a half-built cluster never keeps a
/// running coordinator behind.
pub async fn make_cluster(server: &Server, stream: &HubStream, req: MakeClusterRequest) {
    let mut shutdown_coordinator = false;
    if let Err(err) = run(server, stream, &req, &mut shutdown_coordinator).await {
        if shutdown_coordinator {
            stream.info("Not able to create the cluster, proceeding to shutdown the coordinator segment").await;
            let coordinator_dir = req.plan.as_ref().and_then(|plan| plan.coordinator.as_ref()).map(|seg| seg.data_directory.clone());
            if let Some(pgdata) = coordinator_dir {
                if let Err(stop_err) = stop_coordinator(server, stream, &pgdata).await {
                    tracing::error!("{:#}", stop_err);
                }
            }
        }
        tracing::error!("{:#}", err);
        stream.fail(AppError::grpc(err)).await;
    }
}

async fn run(server: &Server, stream: &HubStream, req: &MakeClusterRequest, shutdown_coordinator: &mut bool) -> Result<()> {
    let plan = req.plan.as_ref().context("no cluster plan in request")?;
    let coordinator = plan.coordinator.as_ref().context("no coordinator in cluster plan")?;
    let params = req.cluster_params.as_ref().context("no cluster params in request")?;
    let mirrorless = plan.segment_array.iter().all(|pair| pair.mirror.is_none());

    // An existing journal means the previous run never finished; recovery is
    // never guessed at.
    let journal = CleanupJournal::in_log_dir(&server.config().log_dir);
    if journal.exists() {
        return Err(AppError::State(
            "cluster initialization has failed previously. Run latticectl init --clean before creating cluster again".to_string(),
        )
        .into());
    }

    let conns = server.dial_all_agents().await?;
    stream.info("Starting to create the cluster").await;
    validate_environment(server, stream, &conns, plan, params, req.force_flag)
        .await
        .context("validating hosts")?;

    journal.append(&[JournalEntry::new(&coordinator.host_name, &coordinator.data_directory)])?;
    stream.info("Creating coordinator segment").await;
    create_and_start_coordinator(&conns, coordinator, params, req.force_flag).await?;
    stream.info("Successfully created coordinator segment").await;
    *shutdown_coordinator = true;

    stream.info("Starting to register primary segments with the coordinator").await;
    let conn = CoordinatorConn::new(server.sys(), &coordinator.data_directory, true)?;
    let mut coordinator_seg = coordinator.clone();
    coordinator_seg.contentid = -1;
    coordinator_seg.dbid = 1;
    conn.register_coordinator(&coordinator_seg).await?;
    let declared_primaries: Vec<Segment> = plan.segment_array.iter().filter_map(|pair| pair.primary.clone()).collect();
    conn.register_primaries(&declared_primaries).await?;
    stream.info("Successfully registered primary segments with the coordinator").await;
    let gparray = conn.read_gp_array().await?;

    let coordinator_addrs = if params.hba_hostnames {
        vec![coordinator.host_address.clone()]
    } else {
        server.sys().interface_addrs()?
    };
    let primaries: Vec<Segment> = gparray.primary_segments().into_iter().map(to_idl_segment).collect();
    let entries: Vec<JournalEntry> = primaries.iter().map(|seg| JournalEntry::new(&seg.host_name, &seg.data_directory)).collect();
    journal.append(&entries)?;
    stream.info("Creating primary segments").await;
    create_segments(stream, &conns, &primaries, params, &coordinator_addrs, req.force_flag).await?;
    stream.info("Successfully created primary segments").await;

    *shutdown_coordinator = false;

    stream.info("Restarting the cluster in production mode").await;
    stop_coordinator(server, stream, &coordinator.data_directory).await?;
    let start = LatticeStart {
        data_directory: coordinator.data_directory.clone(),
        verbose: req.verbose,
    };
    stream.exec_command(&server.config().gp_home, &start).await.context("executing latticestart")?;
    stream.info("Completed restart of the cluster in production mode").await;

    // The cluster now runs in production mode, so later sessions must not
    // carry the utility role anymore.
    let conn = CoordinatorConn::new(server.sys(), &coordinator.data_directory, false)?;

    stream.info("Creating core extensions").await;
    create_toolkit_extension(&conn).await?;
    stream.info("Successfully created core extensions").await;

    stream.info("Importing system collations").await;
    import_collations(&conn).await?;

    if !params.db_name.is_empty() {
        stream.info(&format!("Creating database {:?}", params.db_name)).await;
        create_database(&conn, &params.db_name).await?;
    }

    stream.info("Setting cluster superuser password").await;
    set_su_password(server.sys(), &conn, &params.su_password).await?;

    if !mirrorless {
        let mirror_segs = populate_mirrors_with_content_id(&gparray, &plan.segment_array)?;
        let entries: Vec<JournalEntry> = mirror_segs.iter().map(|seg| JournalEntry::new(&seg.host_name, &seg.data_directory)).collect();
        journal.append(&entries)?;
        let add_req = idl::AddMirrorsRequest {
            coordinator_data_dir: coordinator.data_directory.clone(),
            mirrors: mirror_segs,
            hba_hostnames: params.hba_hostnames,
        };
        mirrors::add_mirrors(server, stream, &add_req).await?;
    }

    // Reaching this point means the cluster was created successfully, so the
    // journal has nothing left to undo.
    journal.remove()?;
    Ok(())
}

/// Fan out one ValidateHostEnv call per host, so each host validates all of
/// its planned segments at once. Fatal findings abort before any disk is
/// touched; warnings are streamed afterwards.
async fn validate_environment(
    server: &Server, stream: &HubStream, conns: &[Connection], plan: &ClusterPlan, params: &ClusterParams, forced: bool,
) -> Result<()> {
    let (dir_map, port_map, addr_map) = build_host_maps(plan)?;
    let planned_hosts: Vec<String> = dir_map.keys().cloned().collect();
    let conns = conns_for_hosts(conns, &planned_hosts);

    let gp_version = run_utility(&server.config().gp_home, &PostgresGpVersion)
        .await
        .context("fetching postgres gp-version")?
        .trim()
        .to_string();

    let progress = Arc::new(ProgressCounter::new(stream.clone(), "Validating Hosts:", dir_map.len()));
    progress.start().await;

    let replies: Arc<StdMutex<Vec<LogMessage>>> = Arc::new(StdMutex::new(Vec::new()));
    let ctx = Arc::new((dir_map, port_map, addr_map, params.locale.clone(), gp_version, progress, replies.clone()));
    execute_rpc(&conns, move |conn| {
        let ctx = ctx.clone();
        async move {
            let (dir_map, port_map, addr_map, locale, gp_version, progress, replies) = &*ctx;
            tracing::debug!(host = %conn.hostname, "starting to validate host");
            let request = idl::ValidateHostEnvRequest {
                directory_list: dir_map.get(&conn.hostname).cloned().unwrap_or_default(),
                port_list: port_map.get(&conn.hostname).cloned().unwrap_or_default(),
                host_address_list: addr_map.get(&conn.hostname).map(|addrs| addrs.iter().cloned().collect()).unwrap_or_default(),
                locale: locale.clone(),
                gp_version: gp_version.clone(),
                forced,
            };
            let mut client = conn.client;
            let reply = client.validate_host_env(request).await.map_err(format_grpc_error)?;
            progress.tick().await;
            tracing::debug!(host = %conn.hostname, "successfully completed validation for host");

            let mut replies = replies.lock().expect("validation reply mutex poisoned");
            for msg in reply.into_inner().messages {
                replies.push(LogMessage {
                    message: format!("host: {}, {}", conn.hostname, msg.message),
                    level: msg.level,
                });
            }
            Ok(())
        }
    })
    .await?;

    let replies = replies.lock().expect("validation reply mutex poisoned").clone();
    for msg in replies {
        match LogLevel::from_i32(msg.level) {
            Some(level) => stream.log(level, &msg.message).await,
            None => stream.info(&msg.message).await,
        }
    }
    Ok(())
}

/// Per-host directory, port and address lists for the whole plan,
/// coordinator and mirrors included.
pub fn build_host_maps(plan: &ClusterPlan) -> Result<(BTreeMap<String, Vec<String>>, BTreeMap<String, Vec<u32>>, BTreeMap<String, BTreeSet<String>>)> {
    let mut dirs: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut ports: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    let mut addrs: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    let mut add = |seg: &Segment| {
        dirs.entry(seg.host_name.clone()).or_default().push(seg.data_directory.clone());
        ports.entry(seg.host_name.clone()).or_default().push(seg.port as u32);
        addrs.entry(seg.host_name.clone()).or_default().insert(seg.host_address.clone());
    };

    let coordinator = plan.coordinator.as_ref().context("no coordinator in cluster plan")?;
    add(coordinator);
    for pair in &plan.segment_array {
        if let Some(primary) = &pair.primary {
            add(primary);
        }
        if let Some(mirror) = &pair.mirror {
            add(mirror);
        }
    }
    Ok((dirs, ports, addrs))
}

/// The effective settings for one segment: common config overlaid with the
/// coordinator or segment specific map.
pub fn merge_segment_config(params: &ClusterParams, contentid: i32) -> HashMap<String, String> {
    let mut config = params.common_config.clone();
    let overlay = if contentid == -1 { &params.coordinator_config } else { &params.segment_config };
    for (key, value) in overlay {
        config.insert(key.clone(), value.clone());
    }
    config
}

async fn create_and_start_coordinator(conns: &[Connection], coordinator: &Segment, params: &ClusterParams, forced: bool) -> Result<()> {
    let conns = conns_for_hosts(conns, &[coordinator.host_name.clone()]);
    if conns.is_empty() {
        bail!("no agent connection for coordinator host {}", coordinator.host_name);
    }

    let mut seg = coordinator.clone();
    seg.contentid = -1;
    seg.dbid = 1;
    let make_req = idl::MakeSegmentRequest {
        segment: Some(seg),
        locale: params.locale.clone(),
        encoding: params.encoding.clone(),
        seg_config: merge_segment_config(params, -1),
        coordinator_addrs: Vec::new(),
        hba_hostnames: params.hba_hostnames,
        data_checksums: params.data_checksums,
        forced,
    };
    let start_req = idl::StartSegmentRequest {
        data_dir: coordinator.data_directory.clone(),
        wait: true,
        options: "-c gp_role=utility".to_string(),
    };

    let ctx = Arc::new((make_req, start_req));
    execute_rpc(&conns, move |conn| {
        let ctx = ctx.clone();
        async move {
            let mut client = conn.client;
            client.make_segment(ctx.0.clone()).await.map_err(format_grpc_error)?;
            client.start_segment(ctx.1.clone()).await.map_err(format_grpc_error)?;
            Ok(())
        }
    })
    .await
}

/// Create every primary, parallel across hosts and parallel across the
/// segments of each host, with one progress step per completed segment.
async fn create_segments(
    stream: &HubStream, conns: &[Connection], segs: &[Segment], params: &ClusterParams, coordinator_addrs: &[String], forced: bool,
) -> Result<()> {
    let mut host_map: BTreeMap<String, Vec<Segment>> = BTreeMap::new();
    for seg in segs {
        host_map.entry(seg.host_name.clone()).or_default().push(seg.clone());
    }

    let progress = Arc::new(ProgressCounter::new(stream.clone(), "Initializing primary segments:", segs.len()));
    progress.start().await;

    let ctx = Arc::new((host_map, params.clone(), coordinator_addrs.to_vec(), progress));
    execute_rpc(conns, move |conn| {
        let ctx = ctx.clone();
        async move {
            let segs = ctx.0.get(&conn.hostname).cloned().unwrap_or_default();
            let mut tasks = Vec::with_capacity(segs.len());
            for seg in segs {
                let ctx = ctx.clone();
                let client = conn.client.clone();
                tasks.push(tokio::spawn(async move {
                    tracing::debug!(datadir = %seg.data_directory, "starting to create primary segment");
                    let request = idl::MakeSegmentRequest {
                        segment: Some(seg.clone()),
                        locale: ctx.1.locale.clone(),
                        encoding: ctx.1.encoding.clone(),
                        seg_config: merge_segment_config(&ctx.1, seg.contentid),
                        coordinator_addrs: ctx.2.clone(),
                        hba_hostnames: ctx.1.hba_hostnames,
                        data_checksums: ctx.1.data_checksums,
                        forced,
                    };
                    let mut client = client;
                    client.make_segment(request).await.map_err(format_grpc_error)?;
                    ctx.3.tick().await;
                    tracing::debug!(datadir = %seg.data_directory, "successfully created primary segment");
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

/// Gracefully stop the coordinator with a local pg_ctl stop.
pub async fn stop_coordinator(server: &Server, stream: &HubStream, pgdata: &str) -> Result<()> {
    stream.info("Shutting down coordinator segment").await;
    let stop = PgCtlStop { pg_data: pgdata.to_string() };
    run_utility(&server.config().gp_home, &stop).await.context("executing pg_ctl stop")?;
    stream.info("Successfully shut down coordinator segment").await;
    Ok(())
}

async fn create_toolkit_extension(conn: &CoordinatorConn) -> Result<()> {
    for dbname in &[DEFAULT_DATABASE, "postgres"] {
        conn.exec_on_database(dbname, "CREATE EXTENSION gp_toolkit").await?;
    }
    Ok(())
}

async fn import_collations(conn: &CoordinatorConn) -> Result<()> {
    let import_query = "SELECT pg_import_system_collations('pg_catalog'); ANALYZE;";

    // template0 normally refuses connections; open it up just long enough to
    // import collations there as well.
    conn.exec_on_database("postgres", "ALTER DATABASE template0 ALLOW_CONNECTIONS on").await?;
    conn.exec_on_database("template0", import_query).await?;
    conn.exec_on_database("template0", "VACUUM FREEZE").await?;
    conn.exec_on_database("postgres", "ALTER DATABASE template0 ALLOW_CONNECTIONS off").await?;

    for dbname in &[DEFAULT_DATABASE, "postgres"] {
        conn.exec_on_database(dbname, import_query).await?;
        conn.exec_on_database(dbname, "VACUUM FREEZE").await?;
    }
    Ok(())
}

async fn create_database(conn: &CoordinatorConn, dbname: &str) -> Result<()> {
    conn.exec_on_database(DEFAULT_DATABASE, &format!("CREATE DATABASE \"{}\"", dbname)).await
}

async fn set_su_password(sys: &dyn SystemOps, conn: &CoordinatorConn, password: &str) -> Result<()> {
    let user = sys.current_user()?;
    conn.exec_on_database(DEFAULT_DATABASE, &format!("ALTER USER \"{}\" WITH PASSWORD '{}'", user, password)).await
}

/// Content ids exist only after the primaries are registered; carry them
/// over from the catalog onto the declared mirrors, matching each mirror's
/// primary by its full location.
pub fn populate_mirrors_with_content_id(gparray: &GpArray, pairs: &[SegmentPair]) -> Result<Vec<Segment>> {
    let mut mirrors = Vec::new();
    for pair in pairs {
        let mirror = match &pair.mirror {
            Some(mirror) => mirror,
            None => continue,
        };
        let primary = pair.primary.as_ref().context("segment pair without a primary")?;
        let mut mirror = mirror.clone();
        mirror.contentid = segment_content_id(gparray, primary)?;
        mirrors.push(mirror);
    }
    Ok(mirrors)
}

fn segment_content_id(gparray: &GpArray, seg: &Segment) -> Result<i32> {
    for primary in gparray.primary_segments() {
        if primary.hostname == seg.host_name && primary.address == seg.host_address && primary.datadir == seg.data_directory && primary.port == seg.port {
            return Ok(primary.content);
        }
    }
    bail!("did not find any primary segment with configuration {:?}", seg)
}

pub fn to_idl_segment(seg: &CatalogSegment) -> Segment {
    Segment {
        port: seg.port,
        data_directory: seg.datadir.clone(),
        host_name: seg.hostname.clone(),
        host_address: seg.address.clone(),
        contentid: seg.content,
        dbid: seg.dbid,
    }
}
