//! Persistence engine — whole-dataset load and rewrite
//!
//! There is no log and no partial update: every sync serializes the entire
//! dataset and replaces the backing file.
//!
//! With `WriteMode::AtomicReplace` a sync follows the rename pattern:
//! 1. Write the encoded dataset to `<path>.tmp`
//! 2. durable_sync the temp file
//! 3. Rename it over `<path>` (atomic on POSIX)
//! 4. durable_sync the parent directory
//!
//! A crash before step 3 leaves the old file intact. `WriteMode::Overwrite`
//! truncates the target in place, and a crash mid-write can leave it torn.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info};

use crate::config::{StoreConfig, WriteMode};
use crate::error::{StoreError, StoreResult};
use crate::format::Dataset;
use crate::platform_durability::{durable_sync, sync_dir};

/// Symlink chain length after which resolution gives up
const MAX_SYMLINK_HOPS: usize = 40;

/// Load the dataset at `path`, creating an empty one if the file is absent.
///
/// - absent file: a fresh dataset is written to `path` and returned
/// - unparseable file: `CorruptStore`, and the file is left untouched
/// - any other read failure: `Io`, never a fresh store over existing data
pub fn load_or_create(path: &Path, config: &StoreConfig) -> StoreResult<Dataset> {
    debug!("load: reading {}", path.display());

    match fs::read(path) {
        Ok(bytes) => {
            let dataset = Dataset::decode(&bytes, path).map_err(|e| {
                error!("load: {}", e);
                e
            })?;
            debug!(
                "load: {} entries, seq {} from {}",
                dataset.len(),
                dataset.seq,
                path.display()
            );
            Ok(dataset)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("load: creating new store file {}", path.display());
            let dataset = Dataset::new();
            sync(&dataset, path, config)?;
            Ok(dataset)
        }
        Err(e) => {
            error!("load: cannot read {}: {}", path.display(), e);
            Err(StoreError::io(path, &e, "failed to read store file"))
        }
    }
}

/// Serialize `dataset` and replace the file at `path` with it.
///
/// Never modifies `dataset`. On error the file may lag behind memory.
pub fn sync(dataset: &Dataset, path: &Path, config: &StoreConfig) -> StoreResult<()> {
    let bytes = dataset.encode().map_err(|e| {
        error!("sync: {}", e);
        e
    })?;

    let target = resolve_target(path);
    ensure_parent(&target)?;

    debug!(
        "sync: writing {} bytes (seq {}) to {}",
        bytes.len(),
        dataset.seq,
        target.display()
    );

    let result = match config.write_mode {
        WriteMode::Overwrite => write_in_place(&target, &bytes, config),
        WriteMode::AtomicReplace => write_atomic(&target, &bytes, config),
    };

    if let Err(e) = &result {
        error!("sync: {}", e);
    }
    result
}

/// Follow symlinks so a linked store file is rewritten, not replaced.
///
/// A dangling link resolves to the path it points at; anything that is
/// not a symlink (including a missing path) resolves to itself.
pub fn resolve_target(path: &Path) -> PathBuf {
    let mut current = path.to_path_buf();
    for _ in 0..MAX_SYMLINK_HOPS {
        let is_link = fs::symlink_metadata(&current)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        if !is_link {
            break;
        }
        let link = match fs::read_link(&current) {
            Ok(link) => link,
            Err(_) => break,
        };
        // Relative links are relative to the directory holding the link
        current = match current.parent() {
            Some(parent) => parent.join(link),
            None => link,
        };
        debug!("sync: {} links to {}", path.display(), current.display());
    }
    current
}

/// Sibling path the atomic writer stages into.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn ensure_parent(path: &Path) -> StoreResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::io(parent, &e, "failed to create store directory"))
        }
        _ => Ok(()),
    }
}

fn open_for_write(path: &Path, config: &StoreConfig) -> StoreResult<File> {
    let mut opts = OpenOptions::new();
    opts.create(true).write(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(config.file_mode);
    }
    #[cfg(not(unix))]
    let _ = config;

    opts.open(path)
        .map_err(|e| StoreError::io(path, &e, "failed to open store file for writing"))
}

fn write_and_flush(file: &mut File, path: &Path, bytes: &[u8], durable: bool) -> StoreResult<()> {
    file.write_all(bytes)
        .map_err(|e| StoreError::io(path, &e, "failed to write store file"))?;
    if durable {
        durable_sync(file).map_err(|e| StoreError::io(path, &e, "failed to sync store file"))?;
    }
    Ok(())
}

fn write_in_place(path: &Path, bytes: &[u8], config: &StoreConfig) -> StoreResult<()> {
    let mut file = open_for_write(path, config)?;
    write_and_flush(&mut file, path, bytes, config.durable_writes)
}

fn write_atomic(path: &Path, bytes: &[u8], config: &StoreConfig) -> StoreResult<()> {
    let tmp = temp_path(path);

    let staged = open_for_write(&tmp, config)
        .and_then(|mut file| write_and_flush(&mut file, &tmp, bytes, config.durable_writes));
    if let Err(e) = staged {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::io(path, &e, "failed to rename staged store file"));
    }

    if config.durable_writes {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            sync_dir(parent)
                .map_err(|e| StoreError::io(parent, &e, "failed to sync store directory"))?;
        }
    }
    Ok(())
}
