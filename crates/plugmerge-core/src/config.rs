//! Project configuration (`plugmerge.toml`).
//!
//! Every section and field is optional. A project without the file uses
//! the defaults below.
//!
//! ```toml
//! [registry]
//! base_url = "https://download.pocketstore.io/d/plugins"
//! timeout_secs = 60
//! check_latest = true
//!
//! [paths]
//! plugins_dir = ".plugins"
//! destination = "storefront"
//! custom = "custom"
//! baseline = "baseline"
//! seed_marker = "nuxt.config.ts"
//! schema_output = ".data/schema.json"
//!
//! [install]
//! failure_policy = "isolate"
//!
//! [merge]
//! directories = ["pages", "components", "layouts", "public", "utils"]
//! top_level = ["public"]
//! nested_prefix = "app"
//!
//! [[layers]]
//! name = "baseline"
//! path = "baseline/plugins.json"
//!
//! [[overrides.files]]
//! from = "pocketstore.json"
//! to = "app/pocketstore.json"
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use plugmerge_fs::{ConfigStore, NormalizedPath, ProjectPath};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fetch::{DEFAULT_REGISTRY, FailurePolicy};
use crate::manifest::Layer;
use crate::merge::MergeLayout;
use crate::overrides::{FileOverride, default_file_overrides};
use crate::transport::DEFAULT_TIMEOUT;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Check `latest` artifacts with HEAD before downloading them.
    pub check_latest: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REGISTRY.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            check_latest: true,
        }
    }
}

/// Project-relative locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub plugins_dir: String,
    pub destination: String,
    pub custom: String,
    /// Template copied into the destination before the first merge. Empty
    /// disables seeding.
    pub baseline: String,
    /// Destination-relative file whose presence marks a seeded destination.
    pub seed_marker: String,
    pub schema_output: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            plugins_dir: ".plugins".to_string(),
            destination: "storefront".to_string(),
            custom: "custom".to_string(),
            baseline: "baseline".to_string(),
            seed_marker: "nuxt.config.ts".to_string(),
            schema_output: ".data/schema.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    pub failure_policy: FailurePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverridesConfig {
    pub files: Vec<FileOverride>,
}

impl Default for OverridesConfig {
    fn default() -> Self {
        Self {
            files: default_file_overrides(),
        }
    }
}

/// The four standard manifest layers in declaration order.
pub fn default_layers() -> Vec<Layer> {
    vec![
        Layer::new("baseline", "baseline/plugins.json", false),
        Layer::new("custom", "custom/plugins.json", false),
        Layer::new("storefront", "storefront/plugins.json", true),
        Layer::new("extensions", "extensions/plugins.json", true),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub registry: RegistryConfig,
    pub paths: PathsConfig,
    pub install: InstallConfig,
    pub merge: MergeLayout,
    pub layers: Vec<Layer>,
    pub overrides: OverridesConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            registry: RegistryConfig::default(),
            paths: PathsConfig::default(),
            install: InstallConfig::default(),
            merge: MergeLayout::default(),
            layers: default_layers(),
            overrides: OverridesConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Load `<root>/plugmerge.toml`, or the defaults when it does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = NormalizedPath::new(root.join(ProjectPath::ProjectConfig));
        let config = match ConfigStore::new().load_optional::<Self>(&path)? {
            Some(config) => {
                tracing::debug!(path = %path, "loaded project config");
                config
            }
            None => {
                tracing::debug!(path = %path, "no project config, using defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return invalid("at least one layer is required");
        }

        let mut names = HashSet::new();
        for layer in &self.layers {
            if layer.name.trim().is_empty() || layer.name.contains('/') {
                return invalid(format!("invalid layer name '{}'", layer.name));
            }
            if layer.path.trim().is_empty() {
                return invalid(format!("layer '{}' has an empty path", layer.name));
            }
            if !names.insert(layer.name.as_str()) {
                return invalid(format!("duplicate layer name '{}'", layer.name));
            }
        }

        if self.registry.base_url.trim().is_empty() {
            return invalid("registry.base_url must not be empty");
        }
        if self.registry.timeout_secs == 0 {
            return invalid("registry.timeout_secs must be positive");
        }
        if self.merge.directories.is_empty() {
            return invalid("merge.directories must not be empty");
        }
        if self.paths.destination.trim().is_empty() {
            return invalid("paths.destination must not be empty");
        }
        if !self.paths.baseline.trim().is_empty() && self.paths.seed_marker.trim().is_empty() {
            return invalid("paths.seed_marker must not be empty when paths.baseline is set");
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.registry.timeout_secs)
    }
}

fn invalid<T>(message: impl Into<String>) -> Result<T> {
    Err(Error::Config {
        message: message.into(),
    })
}
