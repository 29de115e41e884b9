//! Local segment startup.

use anyhow::{Context, Result};

use lattice_core::idl::StartSegmentRequest;
use lattice_core::postgres::{run_utility, PgCtlStart};

/// Start the segment rooted at the request's data directory via pg_ctl.
///
/// With `wait` the call blocks until the post-start probe passes or the
/// start timeout elapses; without it pg_ctl returns as soon as the process
/// is launched.
pub async fn start_segment(gp_home: &str, req: &StartSegmentRequest) -> Result<()> {
    let log_dir = std::path::Path::new(&req.data_dir).join("log");
    std::fs::create_dir_all(&log_dir).with_context(|| format!("error creating {}", log_dir.display()))?;

    let cmd = PgCtlStart::new(&req.data_dir, req.wait, &req.options);
    run_utility(gp_home, &cmd).await.context("executing pg_ctl start")?;
    Ok(())
}
