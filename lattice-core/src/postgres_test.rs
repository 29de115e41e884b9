use std::collections::HashMap;

use crate::idl::Locale;
use crate::postgres::*;

fn params(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn write_conf(dir: &std::path::Path, contents: &str) {
    std::fs::write(dir.join("postgresql.conf"), contents).expect("error writing postgresql.conf");
}

fn read_conf(dir: &std::path::Path) -> String {
    std::fs::read_to_string(dir.join("postgresql.conf")).expect("error reading postgresql.conf")
}

#[test]
fn test_update_conf_overwrite_replaces_existing_keys() {
    let tmpdir = tempfile::tempdir().expect("error creating tempdir");
    write_conf(tmpdir.path(), "max_connections = 100\nshared_buffers = 64MB\n# port = 9999\n");

    let pgdata = tmpdir.path().to_string_lossy().to_string();
    update_postgresql_conf(&pgdata, &params(&[("max_connections", "250"), ("port", "7000")]), true).expect("error updating conf");

    let contents = read_conf(tmpdir.path());
    assert!(contents.contains("max_connections = 250"), "got: {}", contents);
    assert!(contents.contains("shared_buffers = 64MB"), "got: {}", contents);
    assert!(contents.contains("port = 7000"), "got: {}", contents);
    // The commented line must not satisfy the key match.
    assert!(contents.contains("# port = 9999"), "got: {}", contents);
}

#[test]
fn test_update_conf_append_only_is_idempotent() {
    let tmpdir = tempfile::tempdir().expect("error creating tempdir");
    write_conf(tmpdir.path(), "max_connections = 100\n");

    let pgdata = tmpdir.path().to_string_lossy().to_string();
    let set = params(&[("max_connections", "250"), ("gp_contentid", "0")]);
    update_postgresql_conf(&pgdata, &set, false).expect("error updating conf");
    let first = read_conf(tmpdir.path());
    update_postgresql_conf(&pgdata, &set, false).expect("error updating conf");
    let second = read_conf(tmpdir.path());

    assert_eq!(first, second, "append-only update must be idempotent");
    assert!(first.contains("max_connections = 100"), "existing key replaced: {}", first);
    assert!(first.contains("gp_contentid = 0"), "missing key not appended: {}", first);
}

#[test]
fn test_get_config_value() {
    let tmpdir = tempfile::tempdir().expect("error creating tempdir");
    write_conf(tmpdir.path(), "# comment\nport = 7000 # coordinator\nlisten_addresses = '*'\n");

    let pgdata = tmpdir.path().to_string_lossy().to_string();
    assert_eq!(get_config_value(&pgdata, "port").expect("error reading port"), "7000");
    assert_eq!(get_config_value(&pgdata, "listen_addresses").expect("error reading listen_addresses"), "*");
    assert!(get_config_value(&pgdata, "max_connections").is_err());
}

#[test]
fn test_segment_hba_generation_and_replication_append() {
    let tmpdir = tempfile::tempdir().expect("error creating tempdir");
    let pgdata = tmpdir.path().to_string_lossy().to_string();

    write_segment_hba_conf(&pgdata, "lattice", &["192.0.2.1/24".to_string(), "192.0.2.2/24".to_string()]).expect("error writing pg_hba.conf");
    let contents = std::fs::read_to_string(tmpdir.path().join("pg_hba.conf")).expect("error reading pg_hba.conf");
    assert!(contents.contains("local all lattice trust"), "got: {}", contents);
    assert!(contents.contains("host all lattice 192.0.2.1/24 trust"), "got: {}", contents);

    append_hba_entries(&pgdata, "lattice", &["198.51.100.7/32".to_string()], true).expect("error appending entries");
    append_hba_entries(&pgdata, "lattice", &["198.51.100.7/32".to_string()], true).expect("error appending entries");
    let contents = std::fs::read_to_string(tmpdir.path().join("pg_hba.conf")).expect("error reading pg_hba.conf");
    let count = contents.lines().filter(|line| line.contains("host replication lattice 198.51.100.7/32 trust")).count();
    assert_eq!(count, 1, "replication entry duplicated: {}", contents);
}

#[test]
fn test_segment_hba_hostname_entries_mention_only_hostnames() {
    let tmpdir = tempfile::tempdir().expect("error creating tempdir");
    let pgdata = tmpdir.path().to_string_lossy().to_string();

    write_segment_hba_conf(&pgdata, "lattice", &["cdw".to_string(), "scdw".to_string()]).expect("error writing pg_hba.conf");
    let contents = std::fs::read_to_string(tmpdir.path().join("pg_hba.conf")).expect("error reading pg_hba.conf");

    // Every host entry carries exactly one of the given hostnames, never an
    // address form.
    for line in contents.lines().filter(|line| line.starts_with("host ")) {
        let entry = line.split_whitespace().nth(3).expect("malformed host line");
        assert!(entry == "cdw" || entry == "scdw", "non-hostname entry in: {}", line);
        assert!(!entry.contains('/') && !entry.chars().next().map(char::is_numeric).unwrap_or(false), "address form in: {}", line);
    }
    assert_eq!(contents.lines().filter(|line| line.starts_with("host ")).count(), 2, "got: {}", contents);
}

#[test]
fn test_segment_hba_address_entries_exclude_loopback() {
    let tmpdir = tempfile::tempdir().expect("error creating tempdir");
    let pgdata = tmpdir.path().to_string_lossy().to_string();

    write_segment_hba_conf(&pgdata, "lattice", &["192.0.2.1/24".to_string()]).expect("error writing pg_hba.conf");
    let contents = std::fs::read_to_string(tmpdir.path().join("pg_hba.conf")).expect("error reading pg_hba.conf");

    assert!(!contents.contains("127.0.0.1"), "loopback entry generated: {}", contents);
    assert!(!contents.contains("::1"), "loopback entry generated: {}", contents);
    assert_eq!(contents.lines().filter(|line| line.starts_with("host ")).count(), 1, "got: {}", contents);
}

#[test]
fn test_parse_pg_controldata() {
    let output = "pg_control version number:            13000\nData page checksum version:           1\nDatabase cluster state:               in production\n";
    let parsed = parse_pg_controldata(output);
    assert_eq!(parsed.get("Data page checksum version").map(String::as_str), Some("1"));
    assert_eq!(parsed.get("Database cluster state").map(String::as_str), Some("in production"));
    assert_eq!(parsed.len(), 3);
}

#[test]
fn test_initdb_args_respect_locale_precedence() {
    let cmd = Initdb {
        pg_data: "/data/gpseg-0".into(),
        encoding: "UTF-8".into(),
        locale: Locale {
            lc_all: "en_US.UTF-8".into(),
            lc_collate: "C".into(),
            ..Default::default()
        },
        data_checksums: true,
    };
    let args = cmd.args();
    assert!(args.contains(&"--lc-collate=C".to_string()), "individual field must override lc_all: {:?}", args);
    assert!(args.contains(&"--lc-ctype=en_US.UTF-8".to_string()), "unset field must inherit lc_all: {:?}", args);
    assert!(args.contains(&"--data-checksums".to_string()), "got: {:?}", args);
}

#[test]
fn test_pg_ctl_start_args() {
    let waited = PgCtlStart::new("/data/coord", true, "-c gp_role=utility");
    let args = waited.args();
    assert_eq!(args[0], "start");
    assert!(args.contains(&"-w".to_string()), "got: {:?}", args);
    assert!(args.windows(2).any(|w| w[0] == "-o" && w[1] == "-c gp_role=utility"), "got: {:?}", args);

    let unwaited = PgCtlStart::new("/data/gpseg-0", false, "");
    let args = unwaited.args();
    assert!(args.contains(&"-W".to_string()), "got: {:?}", args);
    assert!(!args.contains(&"-o".to_string()), "got: {:?}", args);
}

#[test]
fn test_basebackup_args() {
    let cmd = PgBasebackup {
        target_dir: "/mir0/gpseg-0".into(),
        source_host: "sdw1".into(),
        source_port: 7002,
        create_slot: true,
        force_overwrite: true,
        target_dbid: 8,
        write_recovery_conf: true,
        replication_slot_name: "internal_wal_replication_slot".into(),
        exclude_paths: vec!["./db_dumps".into()],
    };
    let args = cmd.args();
    assert!(args.contains(&"--create-slot".to_string()), "got: {:?}", args);
    assert!(args.windows(2).any(|w| w[0] == "-S" && w[1] == "internal_wal_replication_slot"), "got: {:?}", args);
    assert!(args.windows(2).any(|w| w[0] == "--target-gp-dbid" && w[1] == "8"), "got: {:?}", args);
    assert!(args.windows(2).any(|w| w[0] == "-E" && w[1] == "./db_dumps"), "got: {:?}", args);
}

#[test]
fn test_sync_and_ssh_args() {
    let sync = LatticeSync {
        hostnames: vec!["sdw1".into(), "sdw2".into()],
        source: "/usr/local/lattice/latticectl.conf".into(),
        destination: "/usr/local/lattice/latticectl.conf".into(),
    };
    let args = sync.args();
    assert_eq!(args[..4], ["-h".to_string(), "sdw1".to_string(), "-h".to_string(), "sdw2".to_string()]);

    let ssh = LatticeSsh {
        hostnames: vec!["sdw1".into()],
        command: "systemctl start latticed-agent".into(),
    };
    assert_eq!(ssh.args().last().map(String::as_str), Some("systemctl start latticed-agent"));
}
