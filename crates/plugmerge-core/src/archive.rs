//! Zip extraction into a plugin install directory.
//!
//! Packaged repositories put every file below one root folder
//! (`image-slider-main/plugin.json`, ...). That folder is stripped so the
//! plugin's own files land directly in the install directory.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use plugmerge_fs::Error as FsError;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Extract the zip at `archive` into `dest`, returning the number of files
/// written.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(archive).map_err(|e| FsError::io(archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| corrupt(archive, e))?;

    let mut entries = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let entry = zip.by_index(i).map_err(|e| corrupt(archive, e))?;
        let name = entry.enclosed_name().ok_or_else(|| Error::UnsafeArchiveEntry {
            entry: entry.name().to_string(),
        })?;
        entries.push((name, entry.is_dir()));
    }

    let root = common_root(&entries);
    if let Some(root) = &root {
        tracing::debug!(archive = %archive.display(), root = %root.display(), "stripping root folder");
    }

    fs::create_dir_all(dest).map_err(|e| FsError::io(dest, e))?;

    let mut written = 0;
    for (i, (name, is_dir)) in entries.into_iter().enumerate() {
        let relative = match &root {
            Some(root) => name.strip_prefix(root).map(Path::to_path_buf).unwrap_or(name),
            None => name,
        };
        if relative.as_os_str().is_empty() {
            continue;
        }
        let target = dest.join(&relative);

        if is_dir {
            fs::create_dir_all(&target).map_err(|e| FsError::io(&target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| FsError::io(parent, e))?;
        }
        let mut entry = zip.by_index(i).map_err(|e| corrupt(archive, e))?;
        let mut out = File::create(&target).map_err(|e| FsError::io(&target, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| corrupt(archive, e))?;
        apply_mode(&target, entry.unix_mode());
        written += 1;
    }

    Ok(written)
}

/// The single first path segment shared by all entries, when that segment
/// is a directory.
fn common_root(entries: &[(PathBuf, bool)]) -> Option<PathBuf> {
    let mut root: Option<&Path> = None;

    for (name, is_dir) in entries {
        let first = match name.components().next() {
            Some(Component::Normal(first)) => Path::new(first),
            _ => return None,
        };
        // A plain file at the top level means there is no wrapping folder
        if !is_dir && name.components().count() == 1 {
            return None;
        }
        match root {
            None => root = Some(first),
            Some(existing) if existing == first => {}
            Some(_) => return None,
        }
    }

    root.map(Path::to_path_buf)
}

fn corrupt(archive: &Path, e: impl std::fmt::Display) -> Error {
    Error::Archive {
        path: archive.to_path_buf(),
        message: e.to_string(),
    }
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) {
    use std::os::unix::fs::PermissionsExt;
    // Owner keeps read/write so later cleanup and re-extraction work
    if let Some(mode) = mode.map(|m| (m & 0o777) | 0o600) {
        if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(mode)) {
            tracing::debug!(path = %path.display(), error = %e, "could not apply archived mode");
        }
    }
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) {}
