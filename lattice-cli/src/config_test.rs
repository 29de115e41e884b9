use crate::config::*;
use lattice_core::config::ServiceConfig;
use lattice_core::credentials::Credentials;
use lattice_core::idl;

fn service_config(hosts: &[&str]) -> ServiceConfig {
    ServiceConfig {
        hub_port: 4242,
        agent_port: 8000,
        hostnames: hosts.iter().map(|h| h.to_string()).collect(),
        log_dir: "/tmp/logs".into(),
        service_name: "latticed".into(),
        gp_home: "/usr/local/lattice".into(),
        credentials: Credentials {
            ca_cert_path: "/ca".into(),
            server_cert_path: "/cert".into(),
            server_key_path: "/key".into(),
        },
    }
}

fn segment(host: &str, port: i32, datadir: &str) -> SegmentConfig {
    SegmentConfig {
        hostname: host.into(),
        address: host.into(),
        port,
        data_directory: datadir.into(),
    }
}

fn minimal_config() -> InitConfig {
    InitConfig {
        coordinator: Some(segment("cdw", 7000, "/data/coordinator")),
        segment_array: vec![SegmentPairConfig {
            primary: Some(segment("sdw1", 7002, "/data/pri0/gpseg-0")),
            mirror: None,
        }],
        ..Default::default()
    }
}

#[test]
fn test_load_json_yaml_and_toml() {
    let tmpdir = tempfile::tempdir().expect("error creating tempdir");

    let json = tmpdir.path().join("cluster.json");
    std::fs::write(&json, r#"{"coordinator": {"hostname": "cdw", "port": 7000, "data-directory": "/data/coordinator"}}"#).expect("error writing json");
    let config = InitConfig::load(&json).expect("error loading json");
    assert_eq!(config.coordinator.as_ref().map(|c| c.port), Some(7000));

    let yaml = tmpdir.path().join("cluster.yaml");
    std::fs::write(&yaml, "coordinator:\n  hostname: cdw\n  port: 7000\n  data-directory: /data/coordinator\nhba-hostnames: true\n").expect("error writing yaml");
    let config = InitConfig::load(&yaml).expect("error loading yaml");
    assert!(config.hba_hostnames);

    let toml_file = tmpdir.path().join("cluster.toml");
    std::fs::write(&toml_file, "[coordinator]\nhostname = \"cdw\"\nport = 7000\ndata-directory = \"/data/coordinator\"\n").expect("error writing toml");
    let config = InitConfig::load(&toml_file).expect("error loading toml");
    assert_eq!(config.coordinator.as_ref().map(|c| c.hostname.clone()), Some("cdw".to_string()));

    let unknown = tmpdir.path().join("cluster.ini");
    std::fs::write(&unknown, "").expect("error writing file");
    assert!(InitConfig::load(&unknown).is_err());
}

#[test]
fn test_load_rejects_unknown_keys() {
    let tmpdir = tempfile::tempdir().expect("error creating tempdir");
    let json = tmpdir.path().join("cluster.json");
    std::fs::write(&json, r#"{"coordinater": {"hostname": "cdw"}}"#).expect("error writing json");
    assert!(InitConfig::load(&json).is_err(), "misspelled keys must be rejected");
}

#[test]
fn test_validate_minimal_config_passes_and_fills_defaults() {
    let config = minimal_config();
    let mut request = config.to_request(false, false);
    validate_input_config(&mut request, &config, &service_config(&["cdw", "sdw1"])).expect("error validating config");

    let params = request.cluster_params.expect("missing params");
    assert_eq!(params.encoding, "UTF-8");
    assert!(params.data_checksums);
    assert_eq!(params.common_config.get("max_connections").map(String::as_str), Some("150"));
    assert_eq!(params.coordinator_config.get("max_connections").map(String::as_str), Some("150"));
    assert_eq!(params.segment_config.get("max_connections").map(String::as_str), Some("450"));
    assert_eq!(params.common_config.get("shared_buffers").map(String::as_str), Some("128000kB"));
}

#[test]
fn test_sql_ascii_encoding_is_rejected() {
    let mut config = minimal_config();
    config.encoding = "SQL_ASCII".into();
    let mut request = config.to_request(false, false);
    let err = validate_input_config(&mut request, &config, &service_config(&["cdw", "sdw1"])).unwrap_err();
    assert_eq!(err.to_string(), "SQL_ASCII is no longer supported as a server encoding");
}

#[test]
fn test_missing_coordinator_and_segments() {
    let mut config = minimal_config();
    config.coordinator = None;
    let mut request = config.to_request(false, false);
    let err = validate_input_config(&mut request, &config, &service_config(&["cdw", "sdw1"])).unwrap_err();
    assert_eq!(err.to_string(), "no coordinator segment provided in input config file");

    let mut config = minimal_config();
    config.segment_array.clear();
    let mut request = config.to_request(false, false);
    let err = validate_input_config(&mut request, &config, &service_config(&["cdw", "sdw1"])).unwrap_err();
    assert_eq!(err.to_string(), "no primary segments are provided in input config file");
}

#[test]
fn test_pair_without_primary_is_rejected() {
    let mut config = minimal_config();
    config.segment_array.push(SegmentPairConfig {
        primary: None,
        mirror: Some(segment("sdw2", 7502, "/data/mir0/gpseg-0")),
    });
    let mut request = config.to_request(false, false);
    let err = validate_input_config(&mut request, &config, &service_config(&["cdw", "sdw1", "sdw2"])).unwrap_err();
    assert_eq!(err.to_string(), "invalid segment array, primary segments are missing in some segment objects");
}

#[test]
fn test_partial_mirroring_is_rejected() {
    let mut config = minimal_config();
    config.segment_array = vec![
        SegmentPairConfig {
            primary: Some(segment("sdw1", 7002, "/data/pri0/gpseg-0")),
            mirror: Some(segment("sdw2", 7502, "/data/mir0/gpseg-0")),
        },
        SegmentPairConfig {
            primary: Some(segment("sdw2", 7002, "/data/pri0/gpseg-1")),
            mirror: None,
        },
    ];
    let mut request = config.to_request(false, false);
    let err = validate_input_config(&mut request, &config, &service_config(&["cdw", "sdw1", "sdw2"])).unwrap_err();
    assert_eq!(err.to_string(), "number of primary segments 2 and number of mirror segments 1 must be equal");
}

#[test]
fn test_address_defaults_to_hostname() {
    let mut seg = idl::Segment {
        port: 7002,
        data_directory: "/data/pri0/gpseg-0".into(),
        host_name: "sdw1".into(),
        host_address: String::new(),
        contentid: 0,
        dbid: 0,
    };
    validate_segment(&mut seg).expect("error validating segment");
    assert_eq!(seg.host_address, "sdw1");
}

#[test]
fn test_segment_identity_requirements() {
    let mut missing_host = idl::Segment {
        port: 7002,
        data_directory: "/d".into(),
        ..Default::default()
    };
    assert!(validate_segment(&mut missing_host).is_err());

    let mut bad_port = idl::Segment {
        port: 0,
        data_directory: "/d".into(),
        host_name: "sdw1".into(),
        ..Default::default()
    };
    assert!(validate_segment(&mut bad_port).is_err());

    let mut missing_dir = idl::Segment {
        port: 7002,
        host_name: "sdw1".into(),
        ..Default::default()
    };
    assert!(validate_segment(&mut missing_dir).is_err());
}

#[test]
fn test_duplicate_detection() {
    let a = idl::Segment {
        port: 7002,
        data_directory: "/data/pri0/gpseg-0".into(),
        host_name: "sdw1".into(),
        host_address: "sdw1".into(),
        ..Default::default()
    };
    let mut dup_dir = a.clone();
    dup_dir.port = 7003;
    let err = check_duplicate_port_and_data_directory(&[&a, &dup_dir]).unwrap_err();
    assert!(err.to_string().contains("duplicate data directory entry"), "got: {}", err);

    let mut dup_port = a.clone();
    dup_port.data_directory = "/data/pri1/gpseg-0".into();
    let err = check_duplicate_port_and_data_directory(&[&a, &dup_port]).unwrap_err();
    assert!(err.to_string().contains("duplicate port entry"), "got: {}", err);

    // The same port on a different address of the same host is allowed.
    let mut other_address = a.clone();
    other_address.data_directory = "/data/pri1/gpseg-0".into();
    other_address.host_address = "sdw1-alt".into();
    check_duplicate_port_and_data_directory(&[&a, &other_address]).expect("distinct addresses may reuse a port");
}

#[test]
fn test_unconfigured_hosts_are_rejected() {
    let config = minimal_config();
    let mut request = config.to_request(false, false);
    let err = validate_input_config(&mut request, &config, &service_config(&["cdw"])).unwrap_err();
    assert!(err.to_string().contains("do not have lattice services configured"), "got: {}", err);
    assert!(err.to_string().contains("sdw1"), "got: {}", err);
}

#[test]
fn test_invalid_max_connections() {
    let mut config = minimal_config();
    config.coordinator_config.insert("max_connections".into(), "lots".into());
    let mut request = config.to_request(false, false);
    let err = validate_input_config(&mut request, &config, &service_config(&["cdw", "sdw1"])).unwrap_err();
    assert!(err.to_string().contains("must be an integer"), "got: {}", err);

    let mut config = minimal_config();
    config.coordinator_config.insert("max_connections".into(), "0".into());
    let mut request = config.to_request(false, false);
    let err = validate_input_config(&mut request, &config, &service_config(&["cdw", "sdw1"])).unwrap_err();
    assert!(err.to_string().contains("too small"), "got: {}", err);
}

#[test]
fn test_explicit_settings_are_not_overwritten() {
    let mut config = minimal_config();
    config.common_config.insert("max_connections".into(), "200".into());
    config.segment_config.insert("max_connections".into(), "500".into());
    config.common_config.insert("shared_buffers".into(), "1GB".into());
    let mut request = config.to_request(false, false);
    validate_input_config(&mut request, &config, &service_config(&["cdw", "sdw1"])).expect("error validating config");

    let params = request.cluster_params.expect("missing params");
    assert_eq!(params.coordinator_config.get("max_connections").map(String::as_str), Some("200"));
    assert_eq!(params.segment_config.get("max_connections").map(String::as_str), Some("500"));
    assert_eq!(params.segment_config.get("shared_buffers").map(String::as_str), Some("1GB"));
}

#[test]
fn test_parse_locale_output() {
    let output = "LANG=en_US.UTF-8\nLC_ALL=\nLC_COLLATE=\"en_US.UTF-8\"\nLC_CTYPE=en_US.UTF-8\nLC_NUMERIC=\"de_DE.UTF-8\"\n";
    let locale = parse_locale_output(output);
    assert_eq!(locale.lc_all, "");
    assert_eq!(locale.lc_collate, "en_US.UTF-8");
    assert_eq!(locale.lc_ctype, "en_US.UTF-8");
    assert_eq!(locale.lc_numeric, "de_DE.UTF-8");
    assert_eq!(locale.lc_time, "");
}

#[test]
fn test_data_checksums_defaults_to_true_but_honors_false() {
    let mut config = minimal_config();
    config.data_checksums = Some(false);
    let request = config.to_request(false, false);
    assert!(!request.cluster_params.expect("missing params").data_checksums);

    let config = minimal_config();
    let request = config.to_request(true, true);
    assert!(request.cluster_params.expect("missing params").data_checksums);
    assert!(request.force_flag);
    assert!(request.verbose);
}
