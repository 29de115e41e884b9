//! Shared constants of the management plane.

/// Default port the hub listens on.
pub const DEFAULT_HUB_PORT: u16 = 4242;
/// Default port the agents listen on.
pub const DEFAULT_AGENT_PORT: u16 = 8000;
/// Default name under which the hub/agent services are installed.
pub const DEFAULT_SERVICE_NAME: &str = "latticed";
/// Name of the replicated service configuration file under `$GPHOME`.
pub const CONFIG_FILE_NAME: &str = "latticectl.conf";

/// Name of the cleanup journal written under the hub log directory.
///
/// The presence of this file means a previous cluster initialization did not
/// run to completion and its disk state still needs to be rolled back.
pub const CLEANUP_FILE_NAME: &str = "ClusterInitCleanup.txt";

/// Replication slot used for mirror base backups.
pub const REPLICATION_SLOT_NAME: &str = "internal_wal_replication_slot";

/// The database used for catalog work when none is requested.
pub const DEFAULT_DATABASE: &str = "template1";
/// Default server encoding for new clusters.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Default `max_connections` on the coordinator.
pub const DEFAULT_QD_MAX_CONNECT: u32 = 150;
/// Segments allow this multiple of the coordinator's `max_connections`.
pub const QE_CONNECT_FACTOR: u32 = 3;
/// Default `shared_buffers` when the operator does not set one.
pub const DEFAULT_BUFFERS: &str = "128000kB";

/// Seconds `pg_ctl` waits for a segment to come up.
pub const DEFAULT_START_TIMEOUT_SECS: u64 = 600;

/// Prefix of expanded segment data directories, `<dir>/gpseg-<n>`.
pub const DEFAULT_SEG_PREFIX: &str = "gpseg";

/// Mirror placement strategies accepted by the topology expander.
pub const GROUP_MIRRORING: &str = "group";
pub const SPREAD_MIRRORING: &str = "spread";

/// Seconds to wait for interactive confirmation before defaulting to "no".
pub const USER_INPUT_WAIT_SECS: u64 = 30;

/// Segment roles as stored in the catalog.
pub const ROLE_PRIMARY: &str = "p";
pub const ROLE_MIRROR: &str = "m";

/// The catalog table holding the registered segment set.
pub const SEGMENT_CONFIGURATION_TABLE: &str = "gp_segment_configuration";

/// `pg_ctl status` exit code meaning "no server running".
pub const PG_CTL_STATUS_NOT_RUNNING: i32 = 3;
