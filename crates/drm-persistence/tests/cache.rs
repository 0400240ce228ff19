use std::fs;

use drm_core::{ManifestSession, ScanOptions};
use drm_model::{Cell, ColumnLayout, DepotId, ManifestTable};
use drm_persistence::{
    CURRENT_CACHE_VERSION, PersistenceError, StationCache, load_cache, read_cache, save_cache,
    save_cache_async,
};
use tempfile::tempdir;

fn depot() -> DepotId {
    DepotId::new("north").unwrap()
}

fn scanned_session() -> ManifestSession {
    let mut cells = vec![Cell::Empty; 15];
    cells[0] = Cell::from("R1");
    cells[1] = Cell::from("D1");
    cells[4] = Cell::from("SO25210100");
    cells[10] = Cell::Number(2.0);
    let mut session = ManifestSession::new(depot(), ColumnLayout::default(), ScanOptions::default());
    session.load_table(ManifestTable::new(vec![Cell::from("Run")], vec![cells]), Vec::new());
    session.handle_scan("SO25210100001");
    session.set_note(0, "gate code 1234");
    session
}

#[test]
fn round_trip_restores_scans_and_notes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    let session = scanned_session();
    let mut cache = StationCache::new(depot(), session.snapshot());
    save_cache(&mut cache, &path).unwrap();

    let loaded = read_cache(&path).unwrap();
    assert_eq!(loaded.version, CURRENT_CACHE_VERSION);
    assert_eq!(loaded.depot_id, Some(depot()));
    let restored = ManifestSession::from_snapshot(
        depot(),
        ColumnLayout::default(),
        ScanOptions::default(),
        loaded.session,
    );
    assert_eq!(restored.scanned(), session.scanned());
    assert_eq!(restored.manifest(), session.manifest());
    assert_eq!(restored.note(0), Some("gate code 1234"));
}

#[test]
fn indices_are_not_written() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    let mut cache = StationCache::new(depot(), scanned_session().snapshot());
    save_cache(&mut cache, &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(!text.contains("rowLookup"));
    assert!(!text.contains("generated"));
}

#[test]
fn missing_file_loads_empty() {
    let dir = tempdir().unwrap();
    let cache = load_cache(&dir.path().join("absent.json"));
    assert!(cache.is_empty());
}

#[test]
fn malformed_file_loads_empty_but_reads_as_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, b"{ not json").unwrap();
    assert!(matches!(
        read_cache(&path),
        Err(PersistenceError::InvalidFormat { .. })
    ));
    assert!(load_cache(&path).is_empty());
}

#[test]
fn newer_versions_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    fs::write(&path, br#"{"version": 99}"#).unwrap();
    let error = read_cache(&path).unwrap_err();
    assert!(matches!(
        error,
        PersistenceError::UnsupportedVersion { found: 99, .. }
    ));
    assert!(error.user_message().contains("99"));
    assert!(load_cache(&path).is_empty());
}

#[tokio::test]
async fn async_save_writes_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    save_cache_async(StationCache::default(), path.clone())
        .await
        .unwrap();
    assert!(read_cache(&path).unwrap().is_empty());
}
