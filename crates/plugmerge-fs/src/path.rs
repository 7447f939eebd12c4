//! Slash-separated paths for plugin trees and project files

use std::path::{Component, Path, PathBuf};

/// A host path paired with a `/`-separated rendering.
///
/// Host paths from [`new`](Self::new) are kept exactly as given for I/O.
/// Relative paths inside plugin trees come from [`relative`](Self::relative),
/// which joins normal components with `/` so that ordering and identity do
/// not depend on the host separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    slashed: String,
    native: PathBuf,
}

impl NormalizedPath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let native = path.as_ref().to_path_buf();
        Self {
            slashed: native.to_string_lossy().into_owned(),
            native,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.slashed
    }

    /// Host path for I/O.
    pub fn to_native(&self) -> PathBuf {
        self.native.clone()
    }

    /// `path` below `base`, built from normal components only.
    ///
    /// Returns `None` when `path` is not inside `base` or is `base` itself.
    pub fn relative(path: &Path, base: &Path) -> Option<Self> {
        let rest = path.strip_prefix(base).ok()?;
        let parts: Vec<&std::ffi::OsStr> = rest
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            return None;
        }
        let slashed = parts
            .iter()
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Some(Self {
            slashed,
            native: parts.iter().collect(),
        })
    }

    /// Lowercased extension of the file name; dotfiles have none.
    pub fn extension(&self) -> Option<String> {
        self.native
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        &self.native
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.slashed)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}
