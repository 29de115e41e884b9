use std::collections::HashMap;

use crate::config::{InitConfig, SegmentConfig};
use crate::expansion::{analyze_host_names, expand_segment_pairs, validate_expansion_config};

fn identity_map(hosts: &[&str]) -> HashMap<String, String> {
    hosts.iter().map(|h| (h.to_string(), h.to_string())).collect()
}

fn expansion_config(hosts: &[&str], primary_dirs: &[&str], mirror_dirs: &[&str], mirroring: Option<&str>) -> InitConfig {
    InitConfig {
        coordinator: Some(SegmentConfig {
            hostname: "cdw".into(),
            address: "cdw".into(),
            port: 7000,
            data_directory: "/data/coordinator".into(),
        }),
        hostlist: hosts.iter().map(|h| h.to_string()).collect(),
        primary_data_directories: primary_dirs.iter().map(|d| d.to_string()).collect(),
        primary_base_port: Some(7002),
        mirror_data_directories: mirror_dirs.iter().map(|d| d.to_string()).collect(),
        mirror_base_port: if mirror_dirs.is_empty() { None } else { Some(7502) },
        mirroring_type: mirroring.map(|m| m.to_string()),
        ..Default::default()
    }
}

#[test]
fn test_group_expansion_three_hosts_two_dirs() {
    let mut config = expansion_config(&["sdw1", "sdw2", "sdw3"], &["/pri0", "/pri1"], &["/mir0", "/mir1"], Some("group"));
    validate_expansion_config(&mut config).expect("error validating expansion config");
    let hosts = ["sdw1", "sdw2", "sdw3"];
    let topology = analyze_host_names(&config.hostlist, &identity_map(&hosts)).expect("error analyzing hosts");
    assert!(!topology.multi_home);

    let plan = expand_segment_pairs(&config, &topology).expect("error expanding");
    assert!(plan.contains_mirror);
    assert_eq!(plan.pairs.len(), 6);

    // Primaries walk the hosts in lexical order, two per host at the base
    // port and base port + 1, with globally numbered data directories.
    for (idx, pair) in plan.pairs.iter().enumerate() {
        let primary = pair.primary.as_ref().expect("missing primary");
        assert_eq!(primary.hostname, hosts[idx / 2]);
        assert_eq!(primary.port, 7002 + (idx as i32 % 2));
        assert_eq!(primary.data_directory, format!("/pri{}/gpseg-{}", idx % 2, idx));
    }

    // Group mirroring: all mirrors of host h land on host (h+1) mod 3.
    for (idx, pair) in plan.pairs.iter().enumerate() {
        let mirror = pair.mirror.as_ref().expect("missing mirror");
        assert_eq!(mirror.hostname, hosts[(idx / 2 + 1) % 3]);
        assert_eq!(mirror.port, 7502 + (idx as i32 % 2));
        assert_eq!(mirror.data_directory, format!("/mir{}/gpseg-{}", idx % 2, idx));
    }
}

#[test]
fn test_spread_expansion_places_mirrors_on_distinct_hosts() {
    let mut config = expansion_config(&["sdw1", "sdw2", "sdw3"], &["/pri0", "/pri1"], &["/mir0", "/mir1"], Some("spread"));
    validate_expansion_config(&mut config).expect("error validating expansion config");
    let topology = analyze_host_names(&config.hostlist, &identity_map(&["sdw1", "sdw2", "sdw3"])).expect("error analyzing hosts");

    let plan = expand_segment_pairs(&config, &topology).expect("error expanding");

    // For every host, its primaries' mirrors must live on that many distinct
    // other hosts.
    for host_idx in 0..3 {
        let host = format!("sdw{}", host_idx + 1);
        let mirror_hosts: std::collections::BTreeSet<String> = plan
            .pairs
            .iter()
            .filter(|pair| pair.primary.as_ref().map(|p| p.hostname == host).unwrap_or(false))
            .map(|pair| pair.mirror.as_ref().expect("missing mirror").hostname.clone())
            .collect();
        assert_eq!(mirror_hosts.len(), 2, "host {} mirrors not spread: {:?}", host, mirror_hosts);
        assert!(!mirror_hosts.contains(&host), "host {} mirrors onto itself", host);
    }
}

#[test]
fn test_spread_requires_more_hosts_than_primaries_per_host() {
    let mut config = expansion_config(&["sdw1", "sdw2"], &["/pri0", "/pri1"], &["/mir0", "/mir1"], Some("spread"));
    let err = validate_expansion_config(&mut config).unwrap_err();
    assert_eq!(
        err.to_string(),
        "To enable spread mirroring, number of hosts should be more than number of primary segments per host. \
         Current number of hosts is: 2 and number of primaries per host is:2"
    );
}

#[test]
fn test_expansion_is_deterministic() {
    let expand = || {
        let mut config = expansion_config(&["sdw3", "sdw1", "sdw2"], &["/pri0", "/pri1"], &["/mir0", "/mir1"], Some("group"));
        validate_expansion_config(&mut config).expect("error validating expansion config");
        let topology = analyze_host_names(&config.hostlist, &identity_map(&["sdw1", "sdw2", "sdw3"])).expect("error analyzing hosts");
        expand_segment_pairs(&config, &topology)
            .expect("error expanding")
            .pairs
            .iter()
            .map(|pair| {
                let p = pair.primary.as_ref().expect("missing primary");
                let m = pair.mirror.as_ref().expect("missing mirror");
                format!("{}:{}:{} {}:{}:{}", p.hostname, p.port, p.data_directory, m.hostname, m.port, m.data_directory)
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(expand(), expand(), "two runs over the same input must produce identical plans");
}

#[test]
fn test_base_port_defaults_derive_from_coordinator_port() {
    let mut config = expansion_config(&["sdw1", "sdw2"], &["/pri0"], &["/mir0"], Some("group"));
    config.primary_base_port = None;
    config.mirror_base_port = None;
    validate_expansion_config(&mut config).expect("error validating expansion config");
    assert_eq!(config.primary_base_port, Some(7002));
    assert_eq!(config.mirror_base_port, Some(8002));
}

#[test]
fn test_mirrorless_expansion() {
    let mut config = expansion_config(&["sdw1", "sdw2"], &["/pri0"], &[], None);
    validate_expansion_config(&mut config).expect("error validating expansion config");
    let topology = analyze_host_names(&config.hostlist, &identity_map(&["sdw1", "sdw2"])).expect("error analyzing hosts");

    let plan = expand_segment_pairs(&config, &topology).expect("error expanding");
    assert!(!plan.contains_mirror);
    assert!(plan.pairs.iter().all(|pair| pair.mirror.is_none()));
}

#[test]
fn test_unknown_mirroring_type_is_rejected() {
    let mut config = expansion_config(&["sdw1", "sdw2"], &["/pri0"], &["/mir0"], Some("striped"));
    let err = validate_expansion_config(&mut config).unwrap_err();
    assert!(err.to_string().contains("is not supported"), "got: {}", err);
}

#[test]
fn test_explicit_segment_array_conflicts_with_expansion() {
    let mut config = expansion_config(&["sdw1", "sdw2"], &["/pri0"], &[], None);
    config.segment_array = vec![Default::default()];
    let err = validate_expansion_config(&mut config).unwrap_err();
    assert!(err.to_string().contains("segment-array should be empty"), "got: {}", err);
}

#[test]
fn test_missing_mandatory_expansion_keys() {
    let mut config = expansion_config(&[], &["/pri0"], &[], None);
    let err = validate_expansion_config(&mut config).unwrap_err();
    assert!(err.to_string().contains("hostlist not specified"), "got: {}", err);

    let mut config = expansion_config(&["sdw1"], &[], &[], None);
    let err = validate_expansion_config(&mut config).unwrap_err();
    assert!(err.to_string().contains("primary-data-directories not specified"), "got: {}", err);
}

#[test]
fn test_multi_home_detection_and_round_robin_addresses() {
    // Two physical hosts, each reachable over two addresses.
    let mut config = expansion_config(&["sdw1-1", "sdw1-2", "sdw2-1", "sdw2-2"], &["/pri0", "/pri1"], &[], None);
    validate_expansion_config(&mut config).expect("error validating expansion config");

    let mut resolved = HashMap::new();
    resolved.insert("sdw1-1".to_string(), "sdw1".to_string());
    resolved.insert("sdw1-2".to_string(), "sdw1".to_string());
    resolved.insert("sdw2-1".to_string(), "sdw2".to_string());
    resolved.insert("sdw2-2".to_string(), "sdw2".to_string());
    let topology = analyze_host_names(&config.hostlist, &resolved).expect("error analyzing hosts");
    assert!(topology.multi_home);

    let plan = expand_segment_pairs(&config, &topology).expect("error expanding");
    assert_eq!(plan.pairs.len(), 4);

    // Addresses rotate round-robin within each hostname.
    let p0 = plan.pairs[0].primary.as_ref().expect("missing primary");
    let p1 = plan.pairs[1].primary.as_ref().expect("missing primary");
    assert_eq!(p0.hostname, "sdw1");
    assert_eq!(p0.address, "sdw1-1");
    assert_eq!(p1.hostname, "sdw1");
    assert_eq!(p1.address, "sdw1-2");
}
