//! Project-level content around the plugin merge.
//!
//! Before plugins are merged, an unseeded destination receives a copy of
//! the baseline template. After plugins, the custom directory is overlaid
//! with the same subdirectory mapping as plugins, then individual files are
//! copied to fixed destinations.

use std::path::{Path, PathBuf};

use plugmerge_fs::CopyStats;
use plugmerge_fs::copy::{copy_dir_filtered, copy_file};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::merge::{MergeEngine, OverlayResult};

/// A single file copied from the custom directory into the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOverride {
    /// Relative to the custom directory.
    pub from: String,
    /// Relative to the destination root.
    pub to: String,
}

impl FileOverride {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

pub fn default_file_overrides() -> Vec<FileOverride> {
    vec![
        FileOverride::new("pocketstore.json", "app/pocketstore.json"),
        FileOverride::new("daisyui.css", "daisyui.css"),
    ]
}

/// Copy `baseline` into `destination` unless `destination/marker` exists.
///
/// Files listed in `skip` (manifest layers) stay behind. Returns `None`
/// when the destination is already seeded or there is no baseline
/// directory. A copy failure is fatal.
pub fn seed_destination(
    baseline: &Path,
    destination: &Path,
    marker: &str,
    skip: &[PathBuf],
) -> Result<Option<CopyStats>> {
    let marker_path = destination.join(marker);
    if marker_path.exists() {
        tracing::debug!(marker = %marker_path.display(), "destination already seeded");
        return Ok(None);
    }
    if !baseline.is_dir() {
        tracing::debug!(path = %baseline.display(), "no baseline to seed from");
        return Ok(None);
    }

    let stats = copy_dir_filtered(baseline, destination, |file| !skip.iter().any(|s| s == file))?;
    tracing::info!(from = %baseline.display(), to = %destination.display(), files = stats.files, "seeded destination");
    Ok(Some(stats))
}

/// Overlay `custom` onto the engine's destination and copy `files`.
///
/// Missing sources are skipped; failures are recorded, never fatal.
pub fn apply_overrides(engine: &MergeEngine, custom: &Path, files: &[FileOverride]) -> OverlayResult {
    if !custom.is_dir() {
        tracing::debug!(path = %custom.display(), "no custom directory");
        return OverlayResult::default();
    }

    let mut result = engine.overlay(custom);

    for file in files {
        let src = custom.join(&file.from);
        if !src.is_file() {
            continue;
        }
        let dst = engine.destination().join(&file.to);
        match copy_file(&src, &dst) {
            Ok(()) => {
                tracing::debug!(from = %src.display(), to = %dst.display(), "override copied");
                result.stats.files += 1;
            }
            Err(e) => {
                tracing::warn!(from = %src.display(), error = %e, "override failed");
                result.errors.push(format!("{}: {e}", file.from));
            }
        }
    }

    result
}
