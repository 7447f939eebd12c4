//! Overlay merge of installed plugins into the destination tree.
//!
//! Plugins are applied in ascending priority; a later plugin overwrites
//! files of an earlier one at the same relative path, so the highest
//! priority wins. Equal priorities keep discovery order.

use std::fs;
use std::path::{Path, PathBuf};

use plugmerge_fs::copy::copy_dir;
use plugmerge_fs::{CopyStats, ProjectPath};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::manifest::{PluginKey, PluginMetadata};

/// Where an installed plugin was found below the repos directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginLocation {
    /// Legacy layout: `<repos>/<name>/plugin.json`.
    Flat(PathBuf),
    /// `<repos>/<vendor>/<name>/plugin.json`.
    Vendored { vendor: String, path: PathBuf },
}

impl PluginLocation {
    pub fn path(&self) -> &Path {
        match self {
            Self::Flat(path) => path,
            Self::Vendored { path, .. } => path,
        }
    }

    pub fn key(&self) -> PluginKey {
        let name = dir_name(self.path());
        match self {
            Self::Flat(_) => PluginKey::new("", name),
            Self::Vendored { vendor, .. } => PluginKey::new(vendor.clone(), name),
        }
    }
}

/// A plugin found on disk together with its merge priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPlugin {
    pub key: PluginKey,
    pub location: PluginLocation,
    pub prio: i32,
}

impl InstalledPlugin {
    fn at(location: PluginLocation) -> Self {
        let key = location.key();
        let prio = match PluginMetadata::load_from_dir(location.path(), &key) {
            Ok(meta) => meta.priority(),
            Err(e) => {
                tracing::warn!(plugin = %key, error = %e, "unreadable descriptor, using priority 0");
                0
            }
        };
        Self { key, location, prio }
    }

    pub fn path(&self) -> &Path {
        self.location.path()
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn has_descriptor(dir: &Path) -> bool {
    dir.join(ProjectPath::Descriptor).is_file()
}

/// Subdirectories of `dir`, sorted by name, skipping hidden entries.
fn sorted_subdirs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if entry.file_type()?.is_dir() || entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Scan `repos_dir` for installed plugins in both layouts.
///
/// A missing repos directory yields an empty list.
pub fn discover(repos_dir: &Path) -> Result<Vec<InstalledPlugin>> {
    let top = match sorted_subdirs(repos_dir) {
        Ok(dirs) => dirs,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %repos_dir.display(), "no repos directory");
            return Ok(Vec::new());
        }
        Err(e) => return Err(plugmerge_fs::Error::io(repos_dir, e).into()),
    };

    let mut plugins = Vec::new();
    for dir in top {
        if has_descriptor(&dir) {
            plugins.push(InstalledPlugin::at(PluginLocation::Flat(dir)));
            continue;
        }

        let vendor = dir_name(&dir);
        let children = match sorted_subdirs(&dir) {
            Ok(children) => children,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "skipping unreadable vendor directory");
                continue;
            }
        };
        for child in children {
            if has_descriptor(&child) {
                plugins.push(InstalledPlugin::at(PluginLocation::Vendored {
                    vendor: vendor.clone(),
                    path: child,
                }));
            } else {
                tracing::debug!(path = %child.display(), "no descriptor, skipping");
            }
        }
    }

    tracing::info!(count = plugins.len(), "discovered installed plugins");
    Ok(plugins)
}

/// Stable ascending sort by priority.
pub fn merge_order(mut plugins: Vec<InstalledPlugin>) -> Vec<InstalledPlugin> {
    plugins.sort_by_key(|p| p.prio);
    plugins
}

/// Which plugin subdirectories are merged and where they land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeLayout {
    /// Subdirectories copied from each plugin, in copy order.
    pub directories: Vec<String>,
    /// Directories mapped to `<destination>/<dir>`.
    pub top_level: Vec<String>,
    /// Every other directory goes to `<destination>/<nested_prefix>/<dir>`.
    pub nested_prefix: String,
}

impl Default for MergeLayout {
    fn default() -> Self {
        Self {
            directories: ["pages", "components", "layouts", "public", "utils"]
                .map(String::from)
                .to_vec(),
            top_level: vec!["public".to_string()],
            nested_prefix: "app".to_string(),
        }
    }
}

impl MergeLayout {
    /// Destination of subdirectory `dir` below `root`.
    pub fn target(&self, root: &Path, dir: &str) -> PathBuf {
        if self.top_level.iter().any(|d| d == dir) || self.nested_prefix.is_empty() {
            root.join(dir)
        } else {
            root.join(&self.nested_prefix).join(dir)
        }
    }
}

/// Result of overlaying one source tree.
#[derive(Debug, Clone, Default)]
pub struct OverlayResult {
    pub stats: CopyStats,
    /// Subdirectories that were present and copied.
    pub directories: Vec<String>,
    /// `"<dir>: <error>"` per failed subdirectory.
    pub errors: Vec<String>,
}

impl OverlayResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// One plugin's share of a merge.
#[derive(Debug, Clone)]
pub struct PluginMerge {
    pub key: PluginKey,
    pub prio: i32,
    pub result: OverlayResult,
}

#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub plugins: Vec<PluginMerge>,
}

impl MergeReport {
    pub fn discovered(&self) -> usize {
        self.plugins.len()
    }

    pub fn clean(&self) -> usize {
        self.plugins.iter().filter(|p| p.result.is_clean()).count()
    }

    pub fn files(&self) -> usize {
        self.plugins.iter().map(|p| p.result.stats.files).sum()
    }

    /// `"<key>/<dir>: <error>"` across all plugins.
    pub fn errors(&self) -> Vec<String> {
        self.plugins
            .iter()
            .flat_map(|p| p.result.errors.iter().map(move |e| format!("{}/{e}", p.key)))
            .collect()
    }

    /// Fails when plugins were found but none merged cleanly.
    pub fn ensure_any_merged(&self) -> Result<()> {
        if self.discovered() > 0 && self.clean() == 0 {
            return Err(Error::NothingMerged {
                discovered: self.discovered(),
            });
        }
        Ok(())
    }
}

/// Copies plugin subtrees into a destination root.
#[derive(Debug, Clone)]
pub struct MergeEngine {
    destination: PathBuf,
    layout: MergeLayout,
}

impl MergeEngine {
    pub fn new(destination: impl Into<PathBuf>, layout: MergeLayout) -> Self {
        Self {
            destination: destination.into(),
            layout,
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn layout(&self) -> &MergeLayout {
        &self.layout
    }

    /// Merge `plugins` in priority order. Never fails as a whole; use
    /// [`MergeReport::ensure_any_merged`] to judge the outcome.
    pub fn merge(&self, plugins: &[InstalledPlugin]) -> MergeReport {
        let mut report = MergeReport::default();

        for plugin in merge_order(plugins.to_vec()) {
            tracing::info!(plugin = %plugin.key, prio = plugin.prio, "merging");
            let result = self.overlay(plugin.path());
            report.plugins.push(PluginMerge {
                key: plugin.key,
                prio: plugin.prio,
                result,
            });
        }

        report
    }

    /// Copy every configured subdirectory present under `source`.
    pub fn overlay(&self, source: &Path) -> OverlayResult {
        let mut result = OverlayResult::default();

        for dir in &self.layout.directories {
            let src = source.join(dir);
            if !src.is_dir() {
                continue;
            }
            let dst = self.layout.target(&self.destination, dir);

            match copy_dir(&src, &dst) {
                Ok(stats) => {
                    tracing::debug!(from = %src.display(), to = %dst.display(), files = stats.files, "copied");
                    result.stats += stats;
                    result.directories.push(dir.clone());
                }
                Err(e) => {
                    tracing::warn!(from = %src.display(), error = %e, "copy failed");
                    result.errors.push(format!("{dir}: {e}"));
                }
            }
        }

        result
    }
}
