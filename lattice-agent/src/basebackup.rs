//! Mirror creation via pg_basebackup.

use std::path::Path;

use anyhow::{Context, Result};

use lattice_core::idl::PgBasebackupRequest;
use lattice_core::postgres::{run_utility_redirected, PgBasebackup};
use lattice_core::sys::SystemOps;

/// Run a base backup of the source primary into the local target directory.
///
/// Output goes to a per-dbid logfile under the agent's log directory; the
/// file is removed again once the backup succeeds, and named in the error
/// when it does not.
pub async fn pg_basebackup(sys: &dyn SystemOps, gp_home: &str, log_dir: &str, req: &PgBasebackupRequest) -> Result<()> {
    if req.create_slot {
        // Drop any previously created slot to avoid an error when creating a
        // new slot with the same name.
        drop_slot_if_exists(sys, &req.source_host, req.source_port, &req.replication_slot_name)
            .await
            .with_context(|| format!("failed to drop replication slot {}", req.replication_slot_name))?;
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let logfile = Path::new(log_dir).join(format!("pg_basebackup.{}.dbid{}.out", timestamp, req.target_dbid));

    let cmd = PgBasebackup {
        target_dir: req.target_dir.clone(),
        source_host: req.source_host.clone(),
        source_port: req.source_port,
        create_slot: req.create_slot,
        force_overwrite: req.force_overwrite,
        target_dbid: req.target_dbid,
        write_recovery_conf: req.write_recovery_conf,
        replication_slot_name: req.replication_slot_name.clone(),
        exclude_paths: req.exclude_paths.clone(),
    };
    run_utility_redirected(gp_home, &cmd, &logfile)
        .await
        .with_context(|| format!("executing pg_basebackup, logfile: {}", logfile.display()))?;

    let _res = tokio::fs::remove_file(&logfile).await;
    Ok(())
}

async fn drop_slot_if_exists(sys: &dyn SystemOps, host: &str, port: i32, slot: &str) -> Result<()> {
    use std::convert::TryFrom;
    let port = u16::try_from(port).context("replication source port out of range")?;
    let user = sys.current_user()?;

    let (client, connection) = tokio_postgres::Config::new()
        .host(host)
        .port(port)
        .user(&user)
        .dbname("template1")
        .connect(tokio_postgres::NoTls)
        .await
        .with_context(|| format!("error connecting to replication source {}:{}", host, port))?;
    let conn_task = tokio::spawn(async move {
        if let Err(err) = connection.await {
            tracing::error!(error = ?err, "replication source connection error");
        }
    });

    client
        .query("SELECT pg_drop_replication_slot(slot_name) FROM pg_replication_slots WHERE slot_name = $1", &[&slot])
        .await
        .context("error dropping replication slot")?;

    drop(client);
    let _res = conn_task.await;
    Ok(())
}
