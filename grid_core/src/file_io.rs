//! # File I/O Module
//!
//! Snapshot file operations:
//! - **Atomic saves**: write a unique temp file beside the target, fsync, rename over it
//! - **Validated loads**: JSON is parsed and every key checked against the topology
//! - **File locking**: one editor per snapshot file
//! - **[`SnapshotFileStore`]**: a [`SnapshotSink`] that saves on every commit
//!
//! ## File Format
//!
//! Snapshots are the JSON of [`GridSnapshot`]. Lock files sit next to them
//! with a `.lock` suffix (`baygrid.json.lock`) and name the holder.
//!
//! ## Example
//!
//! ```rust,no_run
//! use grid_core::file_io::{save_snapshot, load_snapshot, FileLock};
//! use grid_core::snapshot::GridSnapshot;
//! use std::path::Path;
//!
//! let path = Path::new("baygrid.json");
//! let lock = FileLock::acquire(path, "engineer")?;
//!
//! save_snapshot(&GridSnapshot::new(), path)?;
//! let loaded = load_snapshot(path)?;
//! assert_eq!(loaded.rows, 3);
//!
//! drop(lock);
//! # Ok::<(), grid_core::errors::GridError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{GridError, GridResult};
use crate::session::SnapshotSink;
use crate::snapshot::GridSnapshot;

/// Locks older than this are taken over
const STALE_LOCK_HOURS: i64 = 24;

/// Lock file metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockInfo {
    /// User identifier
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// Editing session that holds the lock
    pub session_id: Uuid,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process and a fresh session
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            session_id: Uuid::new_v4(),
            locked_at: Utc::now(),
        }
    }

    /// `user (machine)`, for status lines
    pub fn holder(&self) -> String {
        format!("{} ({})", self.user_id, self.machine)
    }
}

fn hostname() -> Option<String> {
    whoami::fallible::hostname().ok().filter(|h| !h.is_empty())
}

/// Exclusive editor lock on a snapshot file, released on drop.
///
/// Held two ways: an OS lock on the `.lock` file (fs2) and the
/// [`LockInfo`] JSON inside it so other editors can see who holds it.
#[derive(Debug)]
pub struct FileLock {
    snapshot_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the editor lock for `path`.
    ///
    /// Fails with [`GridError::FileLocked`] while another live editor holds it.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> GridResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = FileLock::check(path) {
            return Err(GridError::file_locked(
                path.display().to_string(),
                existing.holder(),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| {
                GridError::file_error("create lock", lock_path.display().to_string(), e.to_string())
            })?;

        lock_file.try_lock_exclusive().map_err(|_| {
            GridError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info)
            .map_err(|e| GridError::serialization(e.to_string()))?;
        lock_file.write_all(lock_json.as_bytes()).map_err(|e| {
            GridError::file_error("write lock", lock_path.display().to_string(), e.to_string())
        })?;
        lock_file.sync_all().map_err(|e| {
            GridError::file_error("sync lock", lock_path.display().to_string(), e.to_string())
        })?;

        debug!(path = %path.display(), session = %info.session_id, "lock acquired");
        Ok(FileLock {
            snapshot_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current live holder of the lock on `path`, if any.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if !lock_path.exists() {
            return None;
        }
        read_lock_info(&lock_path).ok().filter(|info| !is_lock_stale(info))
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `<file>.<ext>.lock`, or `<file>.lock` without an extension
fn lock_path_for(snapshot_path: &Path) -> PathBuf {
    with_suffix(snapshot_path, "lock")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut out = path.to_path_buf();
    let extension = out
        .extension()
        .map(|e| format!("{}.{}", e.to_string_lossy(), suffix))
        .unwrap_or_else(|| suffix.to_string());
    out.set_extension(extension);
    out
}

fn read_lock_info(lock_path: &Path) -> GridResult<LockInfo> {
    let contents = read_to_string(lock_path, "read lock")?;
    serde_json::from_str(&contents).map_err(|e| GridError::serialization(e.to_string()))
}

/// A lock is stale when its process is gone (same machine) or it is too old
fn is_lock_stale(info: &LockInfo) -> bool {
    if hostname().as_deref() == Some(info.machine.as_str()) {
        if info.pid == std::process::id() {
            return false;
        }
        #[cfg(unix)]
        {
            if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                return true;
            }
        }
    }
    (Utc::now() - info.locked_at).num_hours() > STALE_LOCK_HOURS
}

fn read_to_string(path: &Path, operation: &str) -> GridResult<String> {
    let mut file = File::open(path).map_err(|e| {
        GridError::file_error(operation, path.display().to_string(), e.to_string())
    })?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| {
        GridError::file_error(operation, path.display().to_string(), e.to_string())
    })?;
    Ok(contents)
}

/// Save a snapshot with atomic write semantics.
///
/// Serializes to a uniquely named temp file in the target's directory,
/// syncs it, then renames it over `path`. An interrupted save never leaves
/// a half-written snapshot, and concurrent saves never share a temp file.
pub fn save_snapshot(snapshot: &GridSnapshot, path: &Path) -> GridResult<()> {
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| GridError::serialization(e.to_string()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp_file = NamedTempFile::new_in(dir).map_err(|e| {
        GridError::file_error("create temp file", dir.display().to_string(), e.to_string())
    })?;
    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        let tmp_path = tmp_file.path().display().to_string();
        GridError::file_error("write temp file", tmp_path, e.to_string())
    })?;
    tmp_file.as_file().sync_all().map_err(|e| {
        let tmp_path = tmp_file.path().display().to_string();
        GridError::file_error("sync temp file", tmp_path, e.to_string())
    })?;

    // A failed persist drops the temp file, which removes it
    tmp_file.persist(path).map_err(|e| {
        GridError::file_error("rename to final", path.display().to_string(), e.error.to_string())
    })?;

    debug!(path = %path.display(), rows = snapshot.rows, cols = snapshot.cols, "snapshot saved");
    Ok(())
}

/// Load and validate a snapshot.
///
/// Fails on I/O errors, invalid JSON, malformed keys and keys outside the
/// stored topology.
pub fn load_snapshot(path: &Path) -> GridResult<GridSnapshot> {
    let contents = read_to_string(path, "read")?;
    let snapshot: GridSnapshot = serde_json::from_str(&contents).map_err(|e| {
        GridError::serialization(format!("Invalid JSON in {}: {}", path.display(), e))
    })?;
    snapshot.validate()?;
    Ok(snapshot)
}

/// [`load_snapshot`], or the default grid if `path` does not exist yet.
pub fn load_or_default(path: &Path) -> GridResult<GridSnapshot> {
    match fs::metadata(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no snapshot yet, starting from the default grid");
            Ok(GridSnapshot::new())
        }
        _ => load_snapshot(path),
    }
}

/// Load a snapshot together with whoever currently holds its lock.
pub fn load_snapshot_with_lock_check(
    path: &Path,
) -> GridResult<(GridSnapshot, Option<LockInfo>)> {
    let snapshot = load_snapshot(path)?;
    Ok((snapshot, FileLock::check(path)))
}

/// [`SnapshotSink`] that saves every committed snapshot to one file.
///
/// Save failures are logged and kept until the next [`flush`](SnapshotSink::flush).
#[derive(Debug)]
pub struct SnapshotFileStore {
    path: PathBuf,
    last_error: Option<GridError>,
}

impl SnapshotFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotFileStore {
            path: path.into(),
            last_error: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotSink for SnapshotFileStore {
    fn persist(&mut self, snapshot: Arc<GridSnapshot>) {
        if let Err(err) = save_snapshot(&snapshot, &self.path) {
            warn!(path = %self.path.display(), "{}", err);
            self.last_error = Some(err);
        }
    }

    fn flush(&mut self) -> GridResult<()> {
        match self.last_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::addressing::position_key;
    use crate::members::{DimensionField, DimensionPatch, MemberKind};
    use crate::session::EditSession;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn test_sidecar_paths() {
        let path = Path::new("/path/to/baygrid.json");
        assert_eq!(lock_path_for(path), Path::new("/path/to/baygrid.json.lock"));
        assert_eq!(with_suffix(path, "bak"), Path::new("/path/to/baygrid.json.bak"));
        assert_eq!(lock_path_for(Path::new("grid")), Path::new("grid.lock"));
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("tester");
        assert_eq!(info.user_id, "tester");
        assert!(info.pid > 0);
        assert_ne!(info.session_id, LockInfo::new("tester").session_id);
        assert!(info.holder().starts_with("tester ("));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("roundtrip.json");
        let snapshot = GridSnapshot::with_size(4, 5);
        save_snapshot(&snapshot, &path).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded, snapshot);

        // Only the snapshot itself is left behind
        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_concurrent_saves_do_not_collide() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("shared.json");

        let writers: Vec<_> = [3, 4]
            .into_iter()
            .map(|rows| {
                let path = path.clone();
                thread::spawn(move || {
                    let snapshot = GridSnapshot::with_size(rows, 3);
                    (0..50)
                        .map(|_| save_snapshot(&snapshot, &path))
                        .collect::<GridResult<Vec<()>>>()
                })
            })
            .collect();
        for writer in writers {
            writer.join().expect("writer thread").unwrap();
        }

        let loaded = load_snapshot(&path).unwrap();
        assert!(loaded.rows == 3 || loaded.rows == 4);
        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_load_rejects_out_of_range_keys() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("dangling.json");
        fs::write(
            &path,
            r#"{"rows":1,"cols":1,"panelDimensions":{"2A":{"width":1,"height":1}},"columnDimensions":{},"beamDimensions":{}}"#,
        )
        .unwrap();
        assert!(matches!(load_snapshot(&path), Err(GridError::OutOfRange { .. })));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(load_snapshot(&path), Err(GridError::SerializationError { .. })));
    }

    #[test]
    fn test_load_or_default() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("missing.json");
        assert_eq!(load_or_default(&path).unwrap(), GridSnapshot::new());
        assert!(matches!(load_snapshot(&path), Err(GridError::FileError { .. })));
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("lock.json");
        let lock = FileLock::acquire(&path, "tester").unwrap();
        assert_eq!(lock.snapshot_path(), path.as_path());

        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());
        let holder = FileLock::check(&path).unwrap();
        assert_eq!(holder.session_id, lock.info.session_id);

        // Same process, live lock: a second editor is turned away
        assert!(matches!(
            FileLock::acquire(&path, "someone else"),
            Err(GridError::FileLocked { .. })
        ));

        drop(lock);
        assert!(!lock_path.exists());
        assert!(FileLock::check(&path).is_none());
    }

    #[test]
    fn test_old_lock_is_stale() {
        let mut info = LockInfo::new("tester");
        info.machine = "elsewhere".to_string();
        assert!(!is_lock_stale(&info));
        info.locked_at = Utc::now() - chrono::Duration::hours(STALE_LOCK_HOURS + 1);
        assert!(is_lock_stale(&info));
    }

    #[test]
    fn test_file_store_saves_each_commit() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("store.json");
        let store = Box::new(SnapshotFileStore::new(&path));
        let mut session = EditSession::new(GridSnapshot::new(), store);
        let patch = DimensionPatch::single(DimensionField::Rotation, 45.0);
        session.on_dimension_changed("3C", MemberKind::Column, &patch).unwrap();
        session.flush().unwrap();

        let (loaded, lock) = load_snapshot_with_lock_check(&path).unwrap();
        assert_eq!(loaded.column_dimensions[&position_key(3, 2)].rotation, 45.0);
        assert!(lock.is_none());
    }

    #[test]
    fn test_file_store_reports_failures_on_flush() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("no_such_dir").join("grid.json");
        let mut store = SnapshotFileStore::new(&path);
        store.persist(Arc::new(GridSnapshot::new()));
        assert!(matches!(store.flush(), Err(GridError::FileError { .. })));
        assert!(store.flush().is_ok());
    }
}
