//! The resolve → install → merge pipeline for one project root.

use std::path::{Path, PathBuf};

use plugmerge_fs::CopyStats;
use serde::Serialize;

use crate::config::ProjectConfig;
use crate::dependency::{Resolution, resolve};
use crate::error::{Error, Result};
use crate::fetch::{FailurePolicy, Fetcher, FetchingSource, InstallEvent, InstallReport};
use crate::identity::resolve_revision;
use crate::manifest::{ManifestStore, PluginMetadata, ResolvedPlugin};
use crate::merge::{MergeEngine, MergeReport, OverlayResult, discover, merge_order};
use crate::overrides::{apply_overrides, seed_destination};
use crate::schema::{SchemaMerge, merge_schemas};
use crate::transport::{HttpTransport, Transport};

/// Everything a merge run did.
#[derive(Debug, Clone, Default)]
pub struct MergeSummary {
    /// Files copied from the baseline into an unseeded destination.
    pub seeded: Option<CopyStats>,
    pub plugins: MergeReport,
    pub overrides: OverlayResult,
    pub schema: SchemaMerge,
}

/// Result of a full sync.
#[derive(Debug)]
pub struct SyncSummary {
    pub resolution: Resolution,
    pub install: InstallReport,
    pub merge: MergeSummary,
}

/// State of one installed-set entry on disk.
#[derive(Debug, Clone, Serialize)]
pub struct PluginStatus {
    #[serde(flatten)]
    pub plugin: ResolvedPlugin,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_revision: Option<String>,
}

impl PluginStatus {
    /// Installed files no longer match the recorded revision.
    pub fn is_drifted(&self) -> bool {
        self.installed && self.plugin.revision.is_some() && self.current_revision != self.plugin.revision
    }
}

/// A project root with its configuration and registry transport.
pub struct Project {
    root: PathBuf,
    config: ProjectConfig,
    store: ManifestStore,
    transport: Box<dyn Transport>,
}

impl Project {
    /// Load the configuration under `root` and connect to the registry.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = ProjectConfig::load(&root)?;
        let transport = HttpTransport::new(config.timeout())?;
        Ok(Self::with_transport(root, config, Box::new(transport)))
    }

    /// Build a project around an explicit transport.
    pub fn with_transport(root: impl Into<PathBuf>, config: ProjectConfig, transport: Box<dyn Transport>) -> Self {
        let root = root.into();
        let store = ManifestStore::new(&root, root.join(&config.paths.plugins_dir));
        Self {
            root,
            config,
            store,
            transport,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.plugins_dir)
    }

    pub fn repos_dir(&self) -> PathBuf {
        self.store.repos_dir()
    }

    pub fn destination(&self) -> PathBuf {
        self.root.join(&self.config.paths.destination)
    }

    fn fetcher(&self) -> Fetcher<&dyn Transport> {
        Fetcher::new(
            self.transport.as_ref(),
            self.config.registry.base_url.clone(),
            self.plugins_dir(),
        )
        .with_check_latest(self.config.registry.check_latest)
    }

    /// Resolve the layers without touching the installed set.
    pub fn plan(&self, deep: bool) -> Result<Resolution> {
        let layers = self.store.load_layers(&self.config.layers)?;

        if deep {
            let fetcher = self.fetcher();
            let mut source = FetchingSource::new(&fetcher, &self.store);
            resolve(&layers, &mut source)
        } else {
            let mut source = self.store.clone();
            resolve(&layers, &mut source)
        }
    }

    /// Resolve the layers and persist the result as the installed set.
    pub fn resolve(&self, deep: bool) -> Result<Resolution> {
        let resolution = self.plan(deep)?;
        self.store.save_installed(&resolution.plugins)?;
        Ok(resolution)
    }

    /// Install every plugin of the persisted installed set.
    ///
    /// The installed set is written back afterwards, also when some
    /// installs failed.
    pub fn install<F>(&self, policy: FailurePolicy, progress: F) -> Result<InstallReport>
    where
        F: FnMut(InstallEvent<'_>),
    {
        let mut plugins = self.store.load_installed()?;
        let report = self.fetcher().install_all(&mut plugins, policy, progress);
        self.store.save_installed(&plugins)?;

        if report.is_success() {
            tracing::info!(count = report.installed.len(), "install complete");
        } else {
            tracing::warn!(failed = report.failures.len(), "install finished with failures");
        }
        Ok(report)
    }

    /// Seed the destination from the baseline, overlay installed plugins,
    /// then project overrides, then merge schemas.
    pub fn merge(&self) -> Result<MergeSummary> {
        let plugins = merge_order(discover(&self.repos_dir())?);
        let engine = MergeEngine::new(self.destination(), self.config.merge.clone());

        let paths = &self.config.paths;
        let seeded = if paths.baseline.trim().is_empty() {
            None
        } else {
            let manifests: Vec<PathBuf> = self.config.layers.iter().map(|l| self.root.join(&l.path)).collect();
            seed_destination(
                &self.root.join(&paths.baseline),
                engine.destination(),
                &paths.seed_marker,
                &manifests,
            )?
        };

        let report = engine.merge(&plugins);
        report.ensure_any_merged()?;

        let overrides = apply_overrides(
            &engine,
            &self.root.join(&self.config.paths.custom),
            &self.config.overrides.files,
        );
        let schema = merge_schemas(&plugins, &self.root.join(&self.config.paths.schema_output))?;

        Ok(MergeSummary {
            seeded,
            plugins: report,
            overrides,
            schema,
        })
    }

    /// Resolve, install and merge.
    ///
    /// Under [`FailurePolicy::Abort`] a failed install stops the run with
    /// [`Error::FetchFailed`]. Under [`FailurePolicy::Isolate`] the merge
    /// runs over what installed and the failures are in the summary.
    pub fn sync<F>(&self, deep: bool, policy: FailurePolicy, progress: F) -> Result<SyncSummary>
    where
        F: FnMut(InstallEvent<'_>),
    {
        let resolution = self.resolve(deep)?;
        let install = self.install(policy, progress)?;

        if policy == FailurePolicy::Abort && !install.is_success() {
            return Err(Error::FetchFailed {
                failures: install.failure_messages(),
            });
        }

        let merge = self.merge()?;
        Ok(SyncSummary {
            resolution,
            install,
            merge,
        })
    }

    /// Compare the installed set with what is on disk.
    pub fn status(&self) -> Result<Vec<PluginStatus>> {
        let repos = self.repos_dir();
        self.store
            .load_installed()?
            .into_iter()
            .map(|plugin| {
                let path = plugin.install_path(&repos);
                if !path.is_dir() {
                    return Ok(PluginStatus {
                        plugin,
                        installed: false,
                        current_revision: None,
                    });
                }
                let metadata = PluginMetadata::load_from_dir(&path, &plugin.key()).ok();
                let revision = resolve_revision(&path, metadata.as_ref())?;
                Ok(PluginStatus {
                    plugin,
                    installed: true,
                    current_revision: Some(revision.value),
                })
            })
            .collect()
    }
}
