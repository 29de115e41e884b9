//! Control file inspection.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};

use lattice_core::idl::PgControlDataRequest;
use lattice_core::postgres::{parse_pg_controldata, run_utility, PgControlData};

/// Execute pg_controldata and return its fields as a map.
///
/// When the request names specific params, only those are returned and every
/// one of them must be present in the output.
pub async fn pg_control_data(gp_home: &str, req: &PgControlDataRequest) -> Result<HashMap<String, String>> {
    let cmd = PgControlData { pg_data: req.pgdata.clone() };
    let out = run_utility(gp_home, &cmd).await.context("executing pg_controldata")?;
    let parsed = parse_pg_controldata(&out);
    if req.params.is_empty() {
        return Ok(parsed);
    }

    let mut result = HashMap::new();
    for param in &req.params {
        match parsed.get(param) {
            Some(value) => {
                result.insert(param.clone(), value.clone());
            }
            None => bail!("did not find {:?} in pg_controldata output", param),
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use lattice_core::postgres::parse_pg_controldata;

    #[test]
    fn test_requested_params_filtering() {
        let output = "Data page checksum version:           1\nDatabase block size:                  32768\n";
        let parsed = parse_pg_controldata(output);
        assert_eq!(parsed.get("Data page checksum version").map(String::as_str), Some("1"));
        assert!(parsed.get("no such key").is_none());
    }
}
