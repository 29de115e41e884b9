//! Host identity queries.

use anyhow::Result;

use lattice_core::sys::SystemOps;

pub fn get_host_name(sys: &dyn SystemOps) -> Result<String> {
    sys.hostname()
}

pub fn get_interface_addrs(sys: &dyn SystemOps) -> Result<Vec<String>> {
    sys.interface_addrs()
}
