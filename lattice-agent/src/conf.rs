//! Configuration file updates on live segments.

use anyhow::{Context, Result};

use lattice_core::idl::{UpdatePgConfRequest, UpdatePgHbaConfRequest};
use lattice_core::postgres::{append_hba_entries, run_utility, update_postgresql_conf, PgCtlReload};
use lattice_core::sys::SystemOps;

pub fn update_pg_conf(req: &UpdatePgConfRequest) -> Result<()> {
    update_postgresql_conf(&req.pgdata, &req.params, req.overwrite).context("updating postgresql.conf")
}

/// Append the given access entries and signal the segment to reload.
pub async fn update_pg_hba_conf(sys: &dyn SystemOps, gp_home: &str, req: &UpdatePgHbaConfRequest) -> Result<()> {
    let user = sys.current_user()?;
    append_hba_entries(&req.pgdata, &user, &req.addrs, req.replication).context("updating pg_hba.conf")?;

    let reload = PgCtlReload { pg_data: req.pgdata.clone() };
    run_utility(gp_home, &reload).await.context("executing pg_ctl reload")?;
    Ok(())
}
