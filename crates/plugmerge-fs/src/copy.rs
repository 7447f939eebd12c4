//! Recursive whole-file tree copies.

use crate::{Error, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Counts produced by a tree copy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyStats {
    pub files: usize,
    pub dirs: usize,
}

impl std::ops::AddAssign for CopyStats {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.dirs += other.dirs;
    }
}

/// Recursively copy `src` into `dst`.
///
/// Existing files at the same relative path are overwritten whole; files
/// already in `dst` that `src` does not provide are left alone. Directory
/// creation is idempotent.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<CopyStats> {
    copy_dir_filtered(src, dst, |_| true)
}

/// [`copy_dir`] limited to the files for which `keep` returns true.
pub fn copy_dir_filtered(src: &Path, dst: &Path, keep: impl Fn(&Path) -> bool) -> Result<CopyStats> {
    let mut stats = CopyStats::default();

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_dir() && !keep(entry.path()) {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| Error::Walk {
                path: entry.path().to_path_buf(),
                message: format!("entry escaped {}", src.display()),
            })?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
            stats.dirs += 1;
        } else {
            copy_file(entry.path(), &target)?;
            stats.files += 1;
        }
    }

    Ok(stats)
}

/// Copy a single file, creating parent directories as needed.
///
/// On unix the copy is normalized to mode `0644`; failing to set the mode is
/// logged and otherwise ignored.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::copy(src, dst).map_err(|e| Error::io(src, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = fs::set_permissions(dst, fs::Permissions::from_mode(0o644)) {
            tracing::debug!(path = %dst.display(), error = %e, "could not normalize file mode");
        }
    }

    Ok(())
}
