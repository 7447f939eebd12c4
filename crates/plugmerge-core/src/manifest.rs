//! Manifest layers, plugin descriptors and the installed-set file.
//!
//! A project declares plugins in several JSON layers, each an array of
//! plugin references:
//!
//! ```json
//! [
//!   { "vendor": "pocketstore-io", "name": "image-slider", "version": "1.0.0" },
//!   { "vendor": "pocketstore-io", "name": "reviews", "version": "v-latest" }
//! ]
//! ```
//!
//! Every installed plugin ships a `plugin.json` descriptor at its root:
//!
//! ```json
//! {
//!   "prio": 10,
//!   "version": "1.0.3",
//!   "revision": "3f2c9e1",
//!   "requirements": ["github.com/pocketstore-io/plugin-reviews"]
//! }
//! ```

use std::path::{Path, PathBuf};

use plugmerge_fs::{ConfigStore, NormalizedPath, ProjectPath};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::version::LATEST;

/// Stable identity of a plugin: vendor plus name.
///
/// The vendor is empty only for plugins found in the legacy one-level
/// install layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginKey {
    pub vendor: String,
    pub name: String,
}

impl PluginKey {
    pub fn new(vendor: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            name: name.into(),
        }
    }

    /// Reason the key cannot name a directory below `repos/`, if any.
    ///
    /// An empty vendor is accepted for the one-level layout.
    pub fn unsafe_reason(&self) -> Option<String> {
        let vendor = (!self.vendor.is_empty())
            .then(|| segment_problem(&self.vendor).map(|p| format!("vendor '{}' {p}", self.vendor)))
            .flatten();
        vendor.or_else(|| segment_problem(&self.name).map(|p| format!("name '{}' {p}", self.name)))
    }

    /// Install directory of this plugin below `repos_dir`.
    pub fn install_path(&self, repos_dir: &Path) -> PathBuf {
        if self.vendor.is_empty() {
            repos_dir.join(&self.name)
        } else {
            repos_dir.join(&self.vendor).join(&self.name)
        }
    }
}

impl std::fmt::Display for PluginKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.vendor.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}/{}", self.vendor, self.name)
        }
    }
}

/// Why `segment` cannot be used as a vendor or plugin directory name.
pub fn segment_problem(segment: &str) -> Option<&'static str> {
    if segment.trim().is_empty() {
        Some("is empty")
    } else if segment == "." || segment == ".." {
        Some("is a relative path component")
    } else if segment.contains(['/', '\\', '\0']) {
        Some("contains a path separator")
    } else {
        None
    }
}

fn latest() -> String {
    LATEST.to_string()
}

/// A plugin as declared in a manifest layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PluginRef {
    pub vendor: String,
    pub name: String,
    #[serde(default = "latest")]
    pub version: String,
}

impl PluginRef {
    pub fn new(vendor: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn key(&self) -> PluginKey {
        PluginKey::new(&self.vendor, &self.name)
    }
}

/// An entry of the installed set.
///
/// Created during resolution with a provisional version and no revision,
/// then completed by the fetcher once the artifact is on disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolvedPlugin {
    pub vendor: String,
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default)]
    pub prio: i32,
    /// Layer name, or the key of the plugin that required this one.
    #[serde(default)]
    pub source: String,
}

impl ResolvedPlugin {
    /// A freshly declared plugin from `source`.
    pub fn declared(plugin: &PluginRef, source: impl Into<String>) -> Self {
        Self {
            vendor: plugin.vendor.clone(),
            name: plugin.name.clone(),
            version: plugin.version.clone(),
            revision: None,
            prio: 0,
            source: source.into(),
        }
    }

    /// A plugin discovered only through another plugin's requirements.
    pub fn transitive(key: &PluginKey, required_by: &PluginKey) -> Self {
        Self {
            vendor: key.vendor.clone(),
            name: key.name.clone(),
            version: latest(),
            revision: None,
            prio: 0,
            source: required_by.to_string(),
        }
    }

    pub fn key(&self) -> PluginKey {
        PluginKey::new(&self.vendor, &self.name)
    }

    pub fn install_path(&self, repos_dir: &Path) -> PathBuf {
        self.key().install_path(repos_dir)
    }
}

/// The `plugin.json` descriptor shipped inside an installed plugin.
///
/// Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PluginMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(alias = "priority", skip_serializing_if = "Option::is_none")]
    pub prio: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
}

impl PluginMetadata {
    /// Read the descriptor from a plugin directory.
    ///
    /// `key` is only used to label errors.
    pub fn load_from_dir(dir: &Path, key: &PluginKey) -> Result<Self> {
        let path = NormalizedPath::new(dir.join(ProjectPath::Descriptor));
        ConfigStore::new().load(&path).map_err(|e| match e {
            e if e.is_not_found() => Error::MetadataNotFound {
                key: key.to_string(),
                path: path.to_native(),
            },
            plugmerge_fs::Error::ConfigParse { message, .. } => Error::MetadataParse {
                key: key.to_string(),
                path: path.to_native(),
                message,
            },
            other => Error::Fs(other),
        })
    }

    /// Priority with the default of `0` applied.
    pub fn priority(&self) -> i32 {
        self.prio.unwrap_or(0)
    }

    /// Declared revision, ignoring empty strings.
    pub fn declared_revision(&self) -> Option<&str> {
        self.revision.as_deref().filter(|r| !r.trim().is_empty())
    }

    /// Declared version, ignoring empty strings.
    pub fn declared_version(&self) -> Option<&str> {
        self.version.as_deref().filter(|v| !v.trim().is_empty())
    }
}

/// One named source of plugin declarations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Layer {
    pub name: String,
    /// Manifest path relative to the project root.
    pub path: String,
    /// A missing optional layer is an empty list instead of an error.
    #[serde(default)]
    pub optional: bool,
}

impl Layer {
    pub fn new(name: impl Into<String>, path: impl Into<String>, optional: bool) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            optional,
        }
    }
}

/// Where the resolver gets descriptors of plugins it walks through.
pub trait MetadataSource {
    /// Descriptor of `plugin`, or `None` when it is not available yet.
    fn metadata(&mut self, plugin: &ResolvedPlugin) -> Result<Option<PluginMetadata>>;
}

/// Reads layer manifests, installed descriptors and the installed set.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    root: PathBuf,
    plugins_dir: PathBuf,
    store: ConfigStore,
}

impl ManifestStore {
    /// `plugins_dir` holds `repos/`, `cache/` and `installed.json`.
    pub fn new(root: impl Into<PathBuf>, plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            plugins_dir: plugins_dir.into(),
            store: ConfigStore::new(),
        }
    }

    pub fn repos_dir(&self) -> PathBuf {
        self.plugins_dir.join(ProjectPath::ReposDir)
    }

    pub fn installed_path(&self) -> PathBuf {
        self.plugins_dir.join(ProjectPath::InstalledSet)
    }

    /// Load one layer's plugin references.
    pub fn load_layer(&self, layer: &Layer) -> Result<Vec<PluginRef>> {
        let path = NormalizedPath::new(self.root.join(&layer.path));
        match self.store.load_optional::<Vec<PluginRef>>(&path) {
            Ok(Some(refs)) => {
                for plugin in &refs {
                    // Manifest entries always use the vendor/name layout
                    let problem = segment_problem(&plugin.vendor)
                        .map(|p| format!("vendor '{}' {p}", plugin.vendor))
                        .or_else(|| plugin.key().unsafe_reason());
                    if let Some(message) = problem {
                        return Err(Error::ManifestParse {
                            layer: layer.name.clone(),
                            path: path.to_native(),
                            message,
                        });
                    }
                }
                Ok(refs)
            }
            Ok(None) if layer.optional => {
                tracing::debug!(layer = %layer.name, path = %path, "optional layer absent");
                Ok(Vec::new())
            }
            Ok(None) => Err(Error::ManifestNotFound {
                layer: layer.name.clone(),
                path: path.to_native(),
            }),
            Err(plugmerge_fs::Error::ConfigParse { message, .. }) => Err(Error::ManifestParse {
                layer: layer.name.clone(),
                path: path.to_native(),
                message,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Load every layer in declaration order.
    pub fn load_layers(&self, layers: &[Layer]) -> Result<Vec<(String, Vec<PluginRef>)>> {
        layers
            .iter()
            .map(|layer| {
                let refs = self.load_layer(layer)?;
                tracing::info!(layer = %layer.name, count = refs.len(), "loaded manifest layer");
                Ok((layer.name.clone(), refs))
            })
            .collect()
    }

    /// Read the descriptor of an installed plugin.
    pub fn load_metadata(&self, key: &PluginKey) -> Result<PluginMetadata> {
        PluginMetadata::load_from_dir(&key.install_path(&self.repos_dir()), key)
    }

    /// Persist the installed set, replacing any previous one.
    pub fn save_installed(&self, plugins: &[ResolvedPlugin]) -> Result<()> {
        let path = NormalizedPath::new(self.installed_path());
        self.store.save(&path, &plugins)?;
        tracing::debug!(path = %path, count = plugins.len(), "wrote installed set");
        Ok(())
    }

    /// Load the installed set written by a previous resolve.
    pub fn load_installed(&self) -> Result<Vec<ResolvedPlugin>> {
        let path = NormalizedPath::new(self.installed_path());
        self.store
            .load_optional(&path)?
            .ok_or_else(|| Error::InstalledSetMissing(path.to_native()))
    }
}

impl MetadataSource for ManifestStore {
    fn metadata(&mut self, plugin: &ResolvedPlugin) -> Result<Option<PluginMetadata>> {
        match self.load_metadata(&plugin.key()) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if e.is_metadata_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
