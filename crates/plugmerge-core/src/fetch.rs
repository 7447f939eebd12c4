//! Artifact download and installation.
//!
//! Each plugin is downloaded from `<base_url>/<vendor>/<name>/<version>.zip`
//! into `<plugins_dir>/cache/`, and extracted over a freshly emptied
//! `<plugins_dir>/repos/<vendor>/<name>/`. A failed install leaves neither a
//! cache file nor an install directory behind.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use plugmerge_fs::{NormalizedPath, ProjectPath, io};
use serde::{Deserialize, Serialize};

use crate::archive::extract_zip;
use crate::error::{Error, Result};
use crate::identity::{Revision, resolve_revision};
use crate::manifest::{ManifestStore, MetadataSource, PluginKey, PluginMetadata, ResolvedPlugin};
use crate::transport::Transport;
use crate::version::VersionSpec;

/// Default artifact registry.
pub const DEFAULT_REGISTRY: &str = "https://download.pocketstore.io/d/plugins";

/// What a failed plugin install does to the rest of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and continue with the remaining plugins.
    #[default]
    Isolate,
    /// Stop at the first failure.
    Abort,
}

/// Result of installing one plugin.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub key: PluginKey,
    pub path: PathBuf,
    pub files: usize,
    pub revision: Revision,
}

/// Progress notifications from [`Fetcher::install_all`].
#[derive(Debug)]
pub enum InstallEvent<'a> {
    Started {
        key: &'a PluginKey,
        index: usize,
        total: usize,
    },
    Installed(&'a FetchOutcome),
    Failed {
        key: &'a PluginKey,
        error: &'a Error,
    },
}

/// Aggregate result of installing an install set.
#[derive(Debug, Default)]
pub struct InstallReport {
    pub installed: Vec<FetchOutcome>,
    pub failures: Vec<(PluginKey, Error)>,
    /// True when [`FailurePolicy::Abort`] stopped the run early.
    pub aborted: bool,
}

impl InstallReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// `"<key>: <error>"` per failure.
    pub fn failure_messages(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|(key, error)| format!("{key}: {error}"))
            .collect()
    }
}

/// Downloads and installs plugin artifacts through a [`Transport`].
pub struct Fetcher<T: Transport> {
    transport: T,
    base_url: String,
    plugins_dir: PathBuf,
    check_latest: bool,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, base_url: impl Into<String>, plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            plugins_dir: plugins_dir.into(),
            check_latest: true,
        }
    }

    /// Check the `latest` locator with HEAD before downloading it.
    pub fn with_check_latest(mut self, check: bool) -> Self {
        self.check_latest = check;
        self
    }

    pub fn repos_dir(&self) -> PathBuf {
        self.plugins_dir.join(ProjectPath::ReposDir)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.plugins_dir.join(ProjectPath::CacheDir)
    }

    /// Download URL of `plugin`'s artifact.
    pub fn locator(&self, plugin: &ResolvedPlugin) -> String {
        let version = VersionSpec::parse(&plugin.version);
        format!(
            "{}/{}/{}/{}.zip",
            self.base_url.trim_end_matches('/'),
            plugin.vendor,
            plugin.name,
            version.locator()
        )
    }

    /// Cache file of `plugin`'s artifact.
    pub fn cache_path(&self, plugin: &ResolvedPlugin) -> PathBuf {
        let version = VersionSpec::parse(&plugin.version);
        self.cache_dir().join(format!(
            "{}-{}-{}.zip",
            plugin.vendor,
            plugin.name,
            version.locator()
        ))
    }

    /// Download and extract `plugin`, replacing any previous install.
    ///
    /// Returns the install directory and the number of files extracted. A
    /// failed download keeps the previous install; a failed extraction
    /// removes the cache file and the partial install directory.
    pub fn fetch(&self, plugin: &ResolvedPlugin) -> Result<(PathBuf, usize)> {
        let key = plugin.key();
        if let Some(reason) = key.unsafe_reason() {
            return Err(Error::UnsafePluginKey {
                key: key.to_string(),
                reason,
            });
        }
        let cache = self.cache_path(plugin);
        let install_dir = key.install_path(&self.repos_dir());

        self.download(plugin, &cache)?;

        match self.replace_install(&cache, &install_dir) {
            Ok(files) => Ok((install_dir, files)),
            Err(e) => {
                tracing::warn!(plugin = %key, error = %e, "extraction failed, cleaning up");
                if let Err(cleanup) = io::remove_file_if_exists(&cache) {
                    tracing::warn!(path = %cache.display(), error = %cleanup, "could not remove cache file");
                }
                if let Err(cleanup) = io::remove_dir_if_exists(&install_dir) {
                    tracing::warn!(path = %install_dir.display(), error = %cleanup, "could not remove install directory");
                }
                Err(e)
            }
        }
    }

    fn download(&self, plugin: &ResolvedPlugin, cache: &Path) -> Result<()> {
        let url = self.locator(plugin);
        if VersionSpec::parse(&plugin.version).is_latest() && self.check_latest {
            self.transport.head(&url)?;
        }

        tracing::info!(url = %url, "downloading");
        let bytes = self.transport.get(&url)?;
        io::write_atomic(&NormalizedPath::new(cache), &bytes)?;
        Ok(())
    }

    fn replace_install(&self, cache: &Path, install_dir: &Path) -> Result<usize> {
        io::remove_dir_if_exists(install_dir)?;
        let files = extract_zip(cache, install_dir)?;
        tracing::debug!(path = %install_dir.display(), files, "extracted");
        Ok(files)
    }

    pub fn install(&self, plugin: &mut ResolvedPlugin) -> Result<FetchOutcome> {
        let key = plugin.key();
        let (path, files) = self.fetch(plugin)?;

        let metadata = match PluginMetadata::load_from_dir(&path, &key) {
            Ok(meta) => Some(meta),
            Err(e) if e.is_metadata_not_found() => None,
            Err(e) => {
                tracing::warn!(plugin = %key, error = %e, "ignoring unreadable descriptor");
                None
            }
        };

        plugin.version = VersionSpec::parse(&plugin.version).locator().to_string();
        if let Some(meta) = &metadata {
            plugin.prio = meta.priority();
            if let Some(version) = meta.declared_version() {
                plugin.version = version.to_string();
            }
        }

        let revision = resolve_revision(&path, metadata.as_ref())?;
        plugin.revision = Some(revision.value.clone());
        tracing::info!(plugin = %key, revision = %revision.value, origin = %revision.origin, "installed");

        Ok(FetchOutcome {
            key,
            path,
            files,
            revision,
        })
    }

    /// Install every plugin in order under `policy`, reporting progress.
    pub fn install_all<F>(&self, plugins: &mut [ResolvedPlugin], policy: FailurePolicy, mut progress: F) -> InstallReport
    where
        F: FnMut(InstallEvent<'_>),
    {
        let mut report = InstallReport::default();
        let total = plugins.len();

        for (index, plugin) in plugins.iter_mut().enumerate() {
            let key = plugin.key();
            progress(InstallEvent::Started {
                key: &key,
                index,
                total,
            });

            match self.install(plugin) {
                Ok(outcome) => {
                    progress(InstallEvent::Installed(&outcome));
                    report.installed.push(outcome);
                }
                Err(error) => {
                    progress(InstallEvent::Failed { key: &key, error: &error });
                    report.failures.push((key, error));
                    if policy == FailurePolicy::Abort {
                        report.aborted = index + 1 < total;
                        break;
                    }
                }
            }
        }

        report
    }
}

/// Metadata source that installs plugins whose descriptor is missing.
///
/// Lets the resolver expand requirements of plugins that are not installed
/// yet. Install failures degrade to "descriptor unavailable".
pub struct FetchingSource<'a, T: Transport> {
    fetcher: &'a Fetcher<T>,
    store: &'a ManifestStore,
    fetched: HashSet<PluginKey>,
}

impl<'a, T: Transport> FetchingSource<'a, T> {
    pub fn new(fetcher: &'a Fetcher<T>, store: &'a ManifestStore) -> Self {
        Self {
            fetcher,
            store,
            fetched: HashSet::new(),
        }
    }

    /// Plugins installed during resolution.
    pub fn fetched(&self) -> &HashSet<PluginKey> {
        &self.fetched
    }
}

impl<T: Transport> MetadataSource for FetchingSource<'_, T> {
    fn metadata(&mut self, plugin: &ResolvedPlugin) -> Result<Option<PluginMetadata>> {
        let key = plugin.key();
        match self.store.load_metadata(&key) {
            Ok(meta) => return Ok(Some(meta)),
            Err(e) if e.is_metadata_not_found() => {}
            Err(e) => return Err(e),
        }

        if !self.fetched.insert(key.clone()) {
            return Ok(None);
        }
        tracing::info!(plugin = %key, "fetching to read requirements");
        if let Err(e) = self.fetcher.fetch(plugin) {
            tracing::warn!(plugin = %key, error = %e, "could not fetch during resolution");
            return Ok(None);
        }

        match self.store.load_metadata(&key) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if e.is_metadata_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
