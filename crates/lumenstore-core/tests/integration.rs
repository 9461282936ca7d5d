//! Integration tests: FileStore across reopen, threads and bad files.
//!
//! These go through the public API only and check the backing file the
//! way another process would see it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use lumenstore_core::{
    Dataset, FileStore, ManualClock, StoreConfig, StoreError, SystemClock, FORMAT_VERSION,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn store_path(dir: &TempDir) -> PathBuf {
    dir.path().join("lumen-data.json")
}

fn open_at(path: &Path, clock: Arc<ManualClock>) -> FileStore {
    FileStore::open_with(path, StoreConfig::default(), clock).unwrap()
}

fn read_dataset(path: &Path) -> Dataset {
    Dataset::decode(&fs::read(path).unwrap(), path).unwrap()
}

// ---------------------------------------------------------------------------
// Persistence across reopen
// ---------------------------------------------------------------------------

#[test]
fn test_reopen_recovers_entries() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let clock = Arc::new(ManualClock::starting_now());

    {
        let store = open_at(&path, clock.clone());
        store.set("survive1", "yes", Duration::ZERO).unwrap();
        store.set("survive2", "also_yes", Duration::from_secs(3600)).unwrap();
        store.set("doomed", "temp", Duration::ZERO).unwrap();
        store.delete("doomed").unwrap();
    }
    {
        let store = open_at(&path, clock.clone());
        assert_eq!(store.get("survive1").unwrap(), "yes");
        assert_eq!(store.get("survive2").unwrap(), "also_yes");
        assert!(store.get("doomed").unwrap_err().is_not_found());
        assert_eq!(store.len(), 2);
        assert_eq!(store.seq(), 4);
    }
}

#[test]
fn test_reopen_keeps_absolute_expiry() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let start = Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));

    {
        let store = open_at(&path, clock.clone());
        store.set("session", "abc", Duration::from_secs(10)).unwrap();
    }

    // "Restart" 8 seconds later: 2 seconds of life left, not a fresh 10
    clock.advance(chrono::Duration::seconds(8));
    let store = open_at(&path, clock.clone());
    let entry = store.snapshot().pairs["session"].clone();
    assert!(!entry.no_expire);
    assert_eq!(entry.expires_on, start + chrono::Duration::seconds(10));
    assert_eq!(store.get("session").unwrap(), "abc");

    clock.advance(chrono::Duration::seconds(3));
    assert!(store.get("session").unwrap_err().is_not_found());
}

#[test]
fn test_reopen_no_expire_after_years() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let clock = Arc::new(ManualClock::starting_now());

    open_at(&path, clock.clone()).set("k", "v", Duration::ZERO).unwrap();
    clock.advance(chrono::Duration::days(365 * 10));

    assert_eq!(open_at(&path, clock).get("k").unwrap(), "v");
}

#[test]
fn test_backing_file_layout() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let store = FileStore::open(&path).unwrap();
    store.set("a", "1", Duration::ZERO).unwrap();

    let json: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(json["version"], FORMAT_VERSION);
    assert_eq!(json["seq"], 1);
    assert_eq!(json["pairs"]["a"]["value"], "1");
    assert_eq!(json["pairs"]["a"]["bool"], true);
    assert!(json["pairs"]["a"]["expires_on"].is_string());
}

#[test]
fn test_opens_file_written_by_other_tooling() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    fs::write(
        &path,
        r#"{"version":"1","seq":12,"pairs":{"default:network":{"value":"test","bool":true,"expires_on":"2018-02-03T10:11:12.123456789-05:00"},"default:old":{"value":"x","bool":false,"expires_on":"2018-02-03T10:11:12-05:00"}}}"#,
    )
    .unwrap();

    let store = FileStore::open(&path).unwrap();
    assert_eq!(store.seq(), 12);
    assert_eq!(store.get("default:network").unwrap(), "test");
    assert!(store.get("default:old").unwrap_err().is_not_found());
}

// ---------------------------------------------------------------------------
// Bad backing files
// ---------------------------------------------------------------------------

#[test]
fn test_invalid_content_fails_construction() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    fs::write(&path, "version: 1\npairs: {}\n").unwrap();

    let err = FileStore::open(&path).unwrap_err();
    assert!(matches!(err, StoreError::CorruptStore { .. }), "got {:?}", err);
    // Existing data is not replaced
    assert_eq!(fs::read_to_string(&path).unwrap(), "version: 1\npairs: {}\n");
}

#[test]
fn test_directory_at_store_path_is_not_replaced() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    fs::create_dir(&path).unwrap();
    fs::write(path.join("keep"), b"x").unwrap();

    for config in [StoreConfig::durable(), StoreConfig::legacy()] {
        let err = FileStore::open_with(&path, config, Arc::new(SystemClock)).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }), "got {:?}", err);
        assert!(!err.is_not_found());
    }
    assert!(path.is_dir());
    assert_eq!(fs::read(path.join("keep")).unwrap(), b"x");
}

#[test]
fn test_file_in_place_of_parent_dir_is_io_error() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"data").unwrap();

    let err = FileStore::open(blocker.join("store.json")).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }), "got {:?}", err);
    assert_eq!(fs::read(&blocker).unwrap(), b"data");
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_not_recreated() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    FileStore::open(&path).unwrap().set("k", "v", Duration::ZERO).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read(&path).is_ok() {
        eprintln!("skipping: permission bits are not enforced for this user");
        return;
    }

    let err = FileStore::open(&path).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }), "got {:?}", err);

    fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
    assert_eq!(read_dataset(&path).pairs["k"].value, "v");
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn test_concurrent_distinct_keys() {
    let dir = TempDir::new().unwrap();
    let path = store_path(&dir);
    let mut config = StoreConfig::default();
    config.durable_writes = false;
    let store = Arc::new(FileStore::open_with(&path, config, Arc::new(SystemClock)).unwrap());

    let n = 32;
    let writers: Vec<_> = (0..n)
        .map(|i| {
            let s = Arc::clone(&store);
            thread::spawn(move || s.set(&format!("k{}", i), &format!("v{}", i), Duration::ZERO).unwrap())
        })
        .collect();
    for h in writers { h.join().unwrap(); }

    let readers: Vec<_> = (0..n)
        .map(|i| {
            let s = Arc::clone(&store);
            thread::spawn(move || assert_eq!(s.get(&format!("k{}", i)).unwrap(), format!("v{}", i)))
        })
        .collect();
    for h in readers { h.join().unwrap(); }

    assert_eq!(store.seq(), n as u64);
    let on_disk = read_dataset(&path);
    assert_eq!(on_disk.len(), n);
    assert_eq!(on_disk, store.snapshot());
}

#[test]
fn test_concurrent_same_key_last_writer_wins() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::open_with(
        store_path(&dir),
        StoreConfig::legacy(),
        Arc::new(SystemClock),
    )
    .unwrap());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let s = Arc::clone(&store);
            thread::spawn(move || s.set("shared", &i.to_string(), Duration::ZERO).unwrap())
        })
        .collect();
    for h in handles { h.join().unwrap(); }

    // Whichever write held the lock last is both in memory and on disk
    let value = store.get("shared").unwrap();
    assert!(value.parse::<u32>().unwrap() < 16);
    assert_eq!(read_dataset(store.path()).pairs["shared"].value, value);
    assert_eq!(store.seq(), 16);
}

#[test]
fn test_readers_during_writes_see_whole_values() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::open_with(
        store_path(&dir),
        StoreConfig::legacy(),
        Arc::new(SystemClock),
    )
    .unwrap());
    store.set("k", &"a".repeat(64), Duration::ZERO).unwrap();

    let writer = {
        let s = Arc::clone(&store);
        thread::spawn(move || {
            for c in ['b', 'c', 'd', 'e'] {
                s.set("k", &c.to_string().repeat(64), Duration::ZERO).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let s = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..50 {
                    let v = s.get("k").unwrap();
                    assert_eq!(v.len(), 64);
                    let first = v.chars().next().unwrap();
                    assert!(v.chars().all(|c| c == first));
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for h in readers { h.join().unwrap(); }
    assert_eq!(store.get("k").unwrap(), "e".repeat(64));
}
