//! Catalog access on the coordinator.
//!
//! Every operation opens a fresh connection for its target database, so the
//! same handle keeps working across the utility-mode restart in the middle
//! of cluster initialization.

use std::collections::BTreeMap;
use std::convert::TryFrom;

use anyhow::{Context, Result};

use lattice_core::constants::DEFAULT_DATABASE;
use lattice_core::error::AppError;
use lattice_core::idl::Segment;
use lattice_core::postgres::get_config_value;
use lattice_core::sys::SystemOps;

/// One registered segment as read back from the catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogSegment {
    pub dbid: i32,
    pub content: i32,
    pub role: String,
    pub port: i32,
    pub hostname: String,
    pub address: String,
    pub datadir: String,
}

/// The runtime view of the cluster, read back after registration.
#[derive(Clone, Debug)]
pub struct GpArray {
    pub coordinator: CatalogSegment,
    pub segments: Vec<CatalogSegment>,
}

impl GpArray {
    /// Build the array from catalog rows; exactly one row must carry
    /// content -1.
    pub fn from_rows(rows: Vec<CatalogSegment>) -> Result<Self> {
        let mut coordinator = None;
        let mut segments = Vec::new();
        for row in rows {
            if row.content == -1 {
                if coordinator.is_some() {
                    anyhow::bail!("multiple coordinator rows in {}", lattice_core::constants::SEGMENT_CONFIGURATION_TABLE);
                }
                coordinator = Some(row);
            } else {
                segments.push(row);
            }
        }
        Ok(Self {
            coordinator: coordinator.context("no coordinator row in the segment configuration")?,
            segments,
        })
    }

    /// All primary segments ordered by content.
    pub fn primary_segments(&self) -> Vec<&CatalogSegment> {
        let mut primaries: Vec<&CatalogSegment> = self.segments.iter().filter(|seg| seg.role == "p").collect();
        primaries.sort_by_key(|seg| seg.content);
        primaries
    }

    /// All segments grouped by their hostname, coordinator included.
    pub fn segments_by_host(&self) -> BTreeMap<String, Vec<&CatalogSegment>> {
        let mut map: BTreeMap<String, Vec<&CatalogSegment>> = BTreeMap::new();
        map.entry(self.coordinator.hostname.clone()).or_default().push(&self.coordinator);
        for seg in &self.segments {
            map.entry(seg.hostname.clone()).or_default().push(seg);
        }
        map
    }

    /// The primary and optional mirror registered for a content id.
    pub fn segment_pair_for_content(&self, content: i32) -> Result<(&CatalogSegment, Option<&CatalogSegment>)> {
        let primary = self
            .segments
            .iter()
            .find(|seg| seg.content == content && seg.role == "p")
            .with_context(|| format!("no primary segment with content {} registered", content))?;
        let mirror = self.segments.iter().find(|seg| seg.content == content && seg.role == "m");
        Ok((primary, mirror))
    }

    /// The next free dbid.
    pub fn next_dbid(&self) -> i32 {
        self.segments.iter().map(|seg| seg.dbid).chain(std::iter::once(self.coordinator.dbid)).max().unwrap_or(1) + 1
    }
}

/// A factory for connections to the coordinator database.
pub struct CoordinatorConn {
    config: tokio_postgres::Config,
}

impl CoordinatorConn {
    /// Build a connection factory for the coordinator at the given data
    /// directory. The port is read from the generated postgresql.conf; a
    /// utility-mode factory attaches `gp_role=utility` to every session.
    pub fn new(sys: &dyn SystemOps, coordinator_data_dir: &str, utility: bool) -> Result<Self> {
        let value = get_config_value(coordinator_data_dir, "port")?;
        let port: u16 = value.parse().with_context(|| format!("invalid port {:?} in postgresql.conf", value))?;
        let user = sys.current_user()?;

        let mut config = tokio_postgres::Config::new();
        config.host("localhost").port(port).user(&user).dbname(DEFAULT_DATABASE);
        if utility {
            config.options("-c gp_role=utility");
        }
        Ok(Self { config })
    }

    async fn connect(&self, dbname: &str) -> Result<tokio_postgres::Client> {
        let mut config = self.config.clone();
        config.dbname(dbname);
        let (client, connection) = config
            .connect(tokio_postgres::NoTls)
            .await
            .map_err(|err| AppError::Catalog(format!("error connecting to database {:?}: {}", dbname, err)))?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                tracing::error!(error = ?err, "coordinator connection error");
            }
        });
        Ok(client)
    }

    /// Run statements against the given database on a fresh session.
    pub async fn exec_on_database(&self, dbname: &str, query: &str) -> Result<()> {
        let client = self.connect(dbname).await?;
        tracing::debug!(db = %dbname, query = %query, "executing query");
        client
            .simple_query(query)
            .await
            .map_err(|err| AppError::Catalog(format!("executing {:?} on database {:?}: {}", query, dbname, err)))?;
        Ok(())
    }

    /// Register the coordinator tuple in the segment configuration.
    pub async fn register_coordinator(&self, seg: &Segment) -> Result<()> {
        let client = self.connect(DEFAULT_DATABASE).await?;
        client
            .execute(
                "SELECT pg_catalog.gp_add_segment($1::int2, $2::int2, 'p', 'p', 'n', 'u', $3::int4, $4::text, $5::text, $6::text)",
                &[&1i16, &-1i16, &seg.port, &seg.host_name, &seg.host_address, &seg.data_directory],
            )
            .await
            .map_err(|err| AppError::Catalog(format!("registering coordinator segment: {}", err)))?;
        Ok(())
    }

    /// Register every primary; the catalog assigns content ids in insert order.
    pub async fn register_primaries(&self, segs: &[Segment]) -> Result<()> {
        let client = self.connect(DEFAULT_DATABASE).await?;
        for seg in segs {
            client
                .execute(
                    "SELECT pg_catalog.gp_add_segment_primary($1::text, $2::text, $3::int4, $4::text)",
                    &[&seg.host_name, &seg.host_address, &seg.port, &seg.data_directory],
                )
                .await
                .map_err(|err| AppError::Catalog(format!("registering primary segment {}:{}: {}", seg.host_name, seg.data_directory, err)))?;
        }
        Ok(())
    }

    /// Register every mirror against its already-assigned content id.
    pub async fn register_mirrors(&self, segs: &[Segment]) -> Result<()> {
        let client = self.connect(DEFAULT_DATABASE).await?;
        for seg in segs {
            let content = i16::try_from(seg.contentid).context("mirror content id out of range")?;
            client
                .execute(
                    "SELECT pg_catalog.gp_add_segment_mirror($1::int2, $2::text, $3::text, $4::int4, $5::text)",
                    &[&content, &seg.host_name, &seg.host_address, &seg.port, &seg.data_directory],
                )
                .await
                .map_err(|err| AppError::Catalog(format!("registering mirror segment {}:{}: {}", seg.host_name, seg.data_directory, err)))?;
        }
        Ok(())
    }

    /// Read the registered segment set back into a [`GpArray`].
    pub async fn read_gp_array(&self) -> Result<GpArray> {
        let client = self.connect(DEFAULT_DATABASE).await?;
        let rows = client
            .query(
                "SELECT dbid::int4, content::int4, role::text, port::int4, hostname::text, address::text, datadir::text \
                 FROM gp_segment_configuration ORDER BY content, dbid",
                &[],
            )
            .await
            .map_err(|err| AppError::Catalog(format!("reading segment configuration: {}", err)))?;

        let mut segments = Vec::with_capacity(rows.len());
        for row in rows {
            segments.push(CatalogSegment {
                dbid: row.get(0),
                content: row.get(1),
                role: row.get(2),
                port: row.get(3),
                hostname: row.get(4),
                address: row.get(5),
                datadir: row.get(6),
            });
        }
        GpArray::from_rows(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(dbid: i32, content: i32, role: &str, host: &str, port: i32, datadir: &str) -> CatalogSegment {
        CatalogSegment {
            dbid,
            content,
            role: role.to_string(),
            port,
            hostname: host.to_string(),
            address: host.to_string(),
            datadir: datadir.to_string(),
        }
    }

    fn sample_array() -> GpArray {
        GpArray::from_rows(vec![
            seg(1, -1, "p", "cdw", 7000, "/data/coordinator"),
            seg(2, 0, "p", "sdw1", 7002, "/data/pri0/gpseg-0"),
            seg(3, 1, "p", "sdw2", 7002, "/data/pri0/gpseg-1"),
            seg(4, 0, "m", "sdw2", 7502, "/data/mir0/gpseg-0"),
        ])
        .expect("error building array")
    }

    #[test]
    fn test_from_rows_requires_exactly_one_coordinator() {
        let err = GpArray::from_rows(vec![seg(2, 0, "p", "sdw1", 7002, "/d")]).unwrap_err();
        assert!(err.to_string().contains("no coordinator row"), "got: {}", err);

        let err = GpArray::from_rows(vec![
            seg(1, -1, "p", "cdw", 7000, "/a"),
            seg(9, -1, "m", "scdw", 7000, "/b"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("multiple coordinator rows"), "got: {}", err);
    }

    #[test]
    fn test_primary_segments_excludes_coordinator_and_mirrors() {
        let array = sample_array();
        let primaries = array.primary_segments();
        assert_eq!(primaries.iter().map(|s| s.content).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_segment_pair_for_content() {
        let array = sample_array();
        let (primary, mirror) = array.segment_pair_for_content(0).expect("error finding pair");
        assert_eq!(primary.dbid, 2);
        assert_eq!(mirror.map(|m| m.dbid), Some(4));

        let (_, mirror) = array.segment_pair_for_content(1).expect("error finding pair");
        assert!(mirror.is_none());

        assert!(array.segment_pair_for_content(7).is_err());
    }

    #[test]
    fn test_segments_by_host_includes_coordinator() {
        let array = sample_array();
        let by_host = array.segments_by_host();
        assert_eq!(by_host["cdw"].len(), 1);
        assert_eq!(by_host["sdw2"].len(), 2);
    }

    #[test]
    fn test_next_dbid() {
        assert_eq!(sample_array().next_dbid(), 5);
    }
}
