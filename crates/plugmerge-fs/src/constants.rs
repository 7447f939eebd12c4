//! Well-known file and directory names.

use std::path::Path;

/// File and directory names plugmerge reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectPath {
    /// The `repos` directory under the plugins dir (extracted plugins)
    ReposDir,
    /// The `cache` directory under the plugins dir (downloaded archives)
    CacheDir,
    /// The `installed.json` installed-set file
    InstalledSet,
    /// The per-plugin `plugin.json` descriptor
    Descriptor,
    /// The per-plugin `schema.json` fragment
    SchemaFragment,
    /// The `plugmerge.toml` project configuration
    ProjectConfig,
    /// A `.git` metadata directory shipped inside an artifact
    GitDir,
}

impl ProjectPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReposDir => "repos",
            Self::CacheDir => "cache",
            Self::InstalledSet => "installed.json",
            Self::Descriptor => "plugin.json",
            Self::SchemaFragment => "schema.json",
            Self::ProjectConfig => "plugmerge.toml",
            Self::GitDir => ".git",
        }
    }
}

impl AsRef<Path> for ProjectPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl std::fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
