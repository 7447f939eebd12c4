//! Content identity of installed plugin trees (`sha256:<hex>`)

use crate::{Error, NormalizedPath, Result};
use sha2::{Digest, Sha256};
use std::path::Path;
use walkdir::WalkDir;

const PREFIX: &str = "sha256:";

/// OS-generated directory listing caches that never count towards identity.
pub const VOLATILE_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// Compute a deterministic checksum over every regular file below `dir`.
///
/// Files are ordered by their forward-slash relative path. For each file the
/// hash receives the relative path, a NUL byte, the raw contents and another
/// NUL byte. Enumeration order of the host filesystem does not matter, while
/// renaming, adding, removing or editing any file changes the result.
/// Files named in [`VOLATILE_FILES`] are skipped.
pub fn compute_dir_checksum(dir: &Path) -> Result<String> {
    let mut files: Vec<(NormalizedPath, std::path::PathBuf)> = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if VOLATILE_FILES.contains(&name.as_ref()) {
            continue;
        }
        if let Some(rel) = NormalizedPath::relative(entry.path(), dir) {
            files.push((rel, entry.into_path()));
        }
    }

    files.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));

    let mut hasher = Sha256::new();
    for (rel, path) in &files {
        let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        hasher.update(rel.as_str().as_bytes());
        hasher.update([0u8]);
        hasher.update(&data);
        hasher.update([0u8]);
    }

    tracing::debug!(dir = %dir.display(), files = files.len(), "computed tree checksum");
    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}
