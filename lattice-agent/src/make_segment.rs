//! Local segment initialization.

use std::path::Path;

use anyhow::{bail, Context, Result};

use lattice_core::idl::MakeSegmentRequest;
use lattice_core::postgres::{run_utility, update_postgresql_conf, write_segment_hba_conf, Initdb};
use lattice_core::sys::SystemOps;

/// Initialize one segment data directory: run initdb, apply the per-role
/// settings and open access for the coordinator.
pub async fn make_segment(sys: &dyn SystemOps, gp_home: &str, req: &MakeSegmentRequest) -> Result<()> {
    let seg = req.segment.as_ref().context("no segment in request")?;
    let pgdata = &seg.data_directory;

    prepare_data_directory(pgdata, req.forced)?;

    let initdb = Initdb {
        pg_data: pgdata.clone(),
        encoding: req.encoding.clone(),
        locale: req.locale.clone().unwrap_or_default(),
        data_checksums: req.data_checksums,
    };
    run_utility(gp_home, &initdb).await.context("executing initdb")?;

    let mut params = req.seg_config.clone();
    params.insert("port".to_string(), seg.port.to_string());
    update_postgresql_conf(pgdata, &params, true)?;

    let user = sys.current_user()?;
    write_segment_hba_conf(pgdata, &user, &req.coordinator_addrs)?;

    Ok(())
}

/// Fail on a non-empty target unless the operator forced the run, in which
/// case the old contents are removed.
fn prepare_data_directory(pgdata: &str, forced: bool) -> Result<()> {
    let path = Path::new(pgdata);
    if path.exists() && path.read_dir().map(|mut entries| entries.next().is_some()).unwrap_or(false) {
        if !forced {
            bail!("data directory {} is not empty", pgdata);
        }
        std::fs::remove_dir_all(path).with_context(|| format!("error removing {}", pgdata))?;
    }
    std::fs::create_dir_all(path).with_context(|| format!("error creating {}", pgdata))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_data_directory() {
        let tmpdir = tempfile::tempdir().expect("error creating tempdir");
        let pgdata = tmpdir.path().join("gpseg-0");
        let pgdata_str = pgdata.display().to_string();

        // A missing directory is created.
        prepare_data_directory(&pgdata_str, false).expect("error preparing missing dir");
        assert!(pgdata.exists());

        // An empty directory passes untouched.
        prepare_data_directory(&pgdata_str, false).expect("error preparing empty dir");

        // A non-empty directory fails without force and is cleared with it.
        std::fs::write(pgdata.join("PG_VERSION"), "13\n").expect("error writing file");
        let err = prepare_data_directory(&pgdata_str, false).unwrap_err();
        assert!(err.to_string().contains("is not empty"), "got: {}", err);
        prepare_data_directory(&pgdata_str, true).expect("error preparing forced dir");
        assert!(pgdata.read_dir().expect("error reading dir").next().is_none());
    }
}
