use std::net::TcpListener;

use lattice_core::idl::Locale;

use crate::validate::{check_directories, check_locales, check_ports};

#[test]
fn test_check_directories_reports_all_dirty_dirs() {
    let tmpdir = tempfile::tempdir().expect("error creating tempdir");
    let empty = tmpdir.path().join("empty");
    let dirty0 = tmpdir.path().join("dirty0");
    let dirty1 = tmpdir.path().join("dirty1");
    std::fs::create_dir_all(&empty).expect("error creating dir");
    std::fs::create_dir_all(&dirty0).expect("error creating dir");
    std::fs::create_dir_all(&dirty1).expect("error creating dir");
    std::fs::write(dirty0.join("postgresql.conf"), "port = 7000\n").expect("error writing file");
    std::fs::write(dirty1.join("PG_VERSION"), "13\n").expect("error writing file");

    let dirs = vec![
        empty.display().to_string(),
        dirty0.display().to_string(),
        dirty1.display().to_string(),
        tmpdir.path().join("missing").display().to_string(),
    ];

    let (warnings, fatal) = check_directories(&dirs, false).expect("error checking directories");
    assert!(warnings.is_empty(), "got warnings: {:?}", warnings);
    let fatal = fatal.expect("expected a fatal finding");
    assert_eq!(fatal, format!("directory not empty:[{}, {}]", dirty0.display(), dirty1.display()));
}

#[test]
fn test_check_directories_forced_downgrades_to_warnings() {
    let tmpdir = tempfile::tempdir().expect("error creating tempdir");
    let dirty = tmpdir.path().join("dirty");
    std::fs::create_dir_all(&dirty).expect("error creating dir");
    std::fs::write(dirty.join("junk"), "x").expect("error writing file");

    let (warnings, fatal) = check_directories(&[dirty.display().to_string()], true).expect("error checking directories");
    assert!(fatal.is_none(), "forced run must not produce a fatal, got {:?}", fatal);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("will be overwritten"), "got: {}", warnings[0].message);
}

#[test]
fn test_check_ports_detects_bound_port() {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("error binding probe listener");
    let bound = listener.local_addr().expect("error reading local addr").port() as u32;

    let (_, busy) = check_ports(&["127.0.0.1".to_string()], &[bound]);
    assert_eq!(busy, vec![bound]);

    // The external message renders the busy set in list form.
    let rendered = format!("ports already in use: {:?}, check if cluster already running", busy);
    assert_eq!(rendered, format!("ports already in use: [{}], check if cluster already running", bound));
}

#[test]
fn test_check_ports_free_port_passes() {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("error binding probe listener");
    let port = listener.local_addr().expect("error reading local addr").port() as u32;
    drop(listener);

    let (_, busy) = check_ports(&["127.0.0.1".to_string()], &[port]);
    assert!(busy.is_empty(), "freed port {} reported busy", port);
}

#[test]
fn test_check_locales_normalizes_codeset() {
    let available = vec!["C".to_string(), "POSIX".to_string(), "en_US.utf8".to_string()];

    let locale = Locale {
        lc_all: "en_US.UTF-8".into(),
        lc_collate: "C".into(),
        ..Default::default()
    };
    assert!(check_locales(&available, &locale).is_empty());

    let locale = Locale {
        lc_all: "xx_YY.UTF-8".into(),
        ..Default::default()
    };
    assert_eq!(check_locales(&available, &locale), vec!["xx_YY.UTF-8".to_string()]);
}

#[test]
fn test_check_locales_reports_each_missing_value_once() {
    let available = vec!["C".to_string()];
    let locale = Locale {
        lc_all: "xx_YY".into(),
        lc_collate: "xx_YY".into(),
        lc_numeric: "zz_QQ".into(),
        ..Default::default()
    };
    assert_eq!(check_locales(&available, &locale), vec!["xx_YY".to_string(), "zz_QQ".to_string()]);
}
