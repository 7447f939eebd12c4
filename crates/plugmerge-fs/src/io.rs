//! File writes that never leave a half-written target behind

use crate::{Error, NormalizedPath, Result};
use fs2::FileExt;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Replace `path` with `content` through a locked sibling temp file and a
/// rename. Missing parent directories are created.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let target = path.to_native();
    if let Some(dir) = target.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }

    let staging = staging_path(&target);
    let written = fill_locked(&staging, &target, content)
        .and_then(|()| fs::rename(&staging, &target).map_err(|e| Error::io(&target, e)));
    if written.is_err() {
        let _ = fs::remove_file(&staging);
    }
    written
}

/// `.<name>.<pid>.tmp` next to `target`, so the rename stays on one filesystem.
fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

fn fill_locked(staging: &Path, target: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(staging).map_err(|e| Error::io(staging, e))?;
    let lock_failed = |_| Error::LockFailed {
        path: target.to_path_buf(),
    };

    file.lock_exclusive().map_err(lock_failed)?;
    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| Error::io(staging, e))?;
    FileExt::unlock(&file).map_err(lock_failed)
}

pub fn read_text(path: &NormalizedPath) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path.to_native(), e))
}

pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Remove a directory tree; a missing directory is not an error.
pub fn remove_dir_if_exists(path: &Path) -> Result<()> {
    ignore_missing(path, fs::remove_dir_all(path))
}

/// Remove a file; a missing file is not an error.
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    ignore_missing(path, fs::remove_file(path))
}

fn ignore_missing(path: &Path, outcome: std::io::Result<()>) -> Result<()> {
    match outcome {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(Error::io(path, e)),
        _ => Ok(()),
    }
}
