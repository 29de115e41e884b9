use std::collections::BTreeMap;

use crate::catalog::{CatalogSegment, GpArray};
use crate::make_cluster::{build_host_maps, merge_segment_config, populate_mirrors_with_content_id};
use crate::mirrors::inconsistent_checksum_dbids;
use lattice_core::idl::{ClusterParams, ClusterPlan, Segment, SegmentPair};

fn segment(host: &str, port: i32, datadir: &str) -> Segment {
    Segment {
        port,
        data_directory: datadir.to_string(),
        host_name: host.to_string(),
        host_address: host.to_string(),
        contentid: 0,
        dbid: 0,
    }
}

fn sample_plan() -> ClusterPlan {
    ClusterPlan {
        coordinator: Some(segment("cdw", 7000, "/data/coordinator")),
        segment_array: vec![
            SegmentPair {
                primary: Some(segment("sdw1", 7002, "/data/pri0/gpseg-0")),
                mirror: Some(segment("sdw2", 7502, "/data/mir0/gpseg-0")),
            },
            SegmentPair {
                primary: Some(segment("sdw2", 7002, "/data/pri0/gpseg-1")),
                mirror: Some(segment("sdw1", 7502, "/data/mir0/gpseg-1")),
            },
        ],
    }
}

#[test]
fn test_build_host_maps_covers_every_planned_segment() {
    let (dirs, ports, addrs) = build_host_maps(&sample_plan()).expect("error building host maps");

    assert_eq!(dirs["cdw"], vec!["/data/coordinator".to_string()]);
    assert_eq!(dirs["sdw1"], vec!["/data/pri0/gpseg-0".to_string(), "/data/mir0/gpseg-1".to_string()]);
    assert_eq!(dirs["sdw2"], vec!["/data/mir0/gpseg-0".to_string(), "/data/pri0/gpseg-1".to_string()]);

    assert_eq!(ports["sdw1"], vec![7002, 7502]);
    assert_eq!(ports["sdw2"], vec![7502, 7002]);

    // Addresses default to the hostname here, so each host has exactly one.
    assert_eq!(addrs["sdw1"].len(), 1);
}

#[test]
fn test_merge_segment_config_precedence() {
    let mut params = ClusterParams::default();
    params.common_config.insert("max_connections".to_string(), "150".to_string());
    params.common_config.insert("shared_buffers".to_string(), "128000kB".to_string());
    params.coordinator_config.insert("max_connections".to_string(), "250".to_string());
    params.segment_config.insert("max_connections".to_string(), "450".to_string());

    let coordinator = merge_segment_config(&params, -1);
    assert_eq!(coordinator.get("max_connections").map(String::as_str), Some("250"));
    assert_eq!(coordinator.get("shared_buffers").map(String::as_str), Some("128000kB"));

    let segment = merge_segment_config(&params, 3);
    assert_eq!(segment.get("max_connections").map(String::as_str), Some("450"));
    assert_eq!(segment.get("shared_buffers").map(String::as_str), Some("128000kB"));
}

fn registered_array() -> GpArray {
    let row = |dbid, content, role: &str, host: &str, port, datadir: &str| CatalogSegment {
        dbid,
        content,
        role: role.to_string(),
        port,
        hostname: host.to_string(),
        address: host.to_string(),
        datadir: datadir.to_string(),
    };
    GpArray::from_rows(vec![
        row(1, -1, "p", "cdw", 7000, "/data/coordinator"),
        row(2, 0, "p", "sdw1", 7002, "/data/pri0/gpseg-0"),
        row(3, 1, "p", "sdw2", 7002, "/data/pri0/gpseg-1"),
    ])
    .expect("error building array")
}

#[test]
fn test_populate_mirrors_assigns_paired_primary_content() {
    let mirrors = populate_mirrors_with_content_id(&registered_array(), &sample_plan().segment_array).expect("error populating mirrors");

    assert_eq!(mirrors.len(), 2);
    assert_eq!(mirrors[0].host_name, "sdw2");
    assert_eq!(mirrors[0].contentid, 0);
    assert_eq!(mirrors[1].host_name, "sdw1");
    assert_eq!(mirrors[1].contentid, 1);
}

#[test]
fn test_populate_mirrors_fails_on_unknown_primary() {
    let mut plan = sample_plan();
    if let Some(primary) = plan.segment_array[0].primary.as_mut() {
        primary.port = 9999;
    }

    let err = populate_mirrors_with_content_id(&registered_array(), &plan.segment_array).unwrap_err();
    assert!(err.to_string().contains("did not find any primary segment"), "got: {}", err);
}

#[test]
fn test_populate_mirrors_skips_mirrorless_pairs() {
    let mut plan = sample_plan();
    plan.segment_array[1].mirror = None;

    let mirrors = populate_mirrors_with_content_id(&registered_array(), &plan.segment_array).expect("error populating mirrors");
    assert_eq!(mirrors.len(), 1);
}

#[test]
fn test_inconsistent_checksum_dbids() {
    let mut checksums = BTreeMap::new();
    checksums.insert(2, "1".to_string());
    checksums.insert(3, "0".to_string());
    checksums.insert(4, "1".to_string());

    assert_eq!(inconsistent_checksum_dbids("1", &checksums), vec![3]);
    assert!(inconsistent_checksum_dbids("1", &BTreeMap::new()).is_empty());

    let rendered = format!(
        "data page checksum version for segments with dbid {:?} does not match the coordinator value of {}",
        inconsistent_checksum_dbids("1", &checksums),
        "1"
    );
    assert_eq!(rendered, "data page checksum version for segments with dbid [3] does not match the coordinator value of 1");
}
