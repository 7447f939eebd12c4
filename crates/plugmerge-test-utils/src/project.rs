//! [`TestProject`] builder for plugmerge test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project root with helpers for layer manifests and installed
/// plugin trees.
///
/// # Example
///
/// ```rust,no_run
/// use plugmerge_test_utils::project::TestProject;
///
/// let project = TestProject::new();
/// project.write_layer("custom/plugins.json", &[("acme", "slider", "1.0.0")]);
/// project.install_plugin("acme", "slider", r#"{"prio": 3}"#, &[("pages/index.vue", "x")]);
/// project.assert_file_exists(".plugins/repos/acme/slider/plugin.json");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary project root.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the project root.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Default install root for extracted plugins.
    pub fn repos_dir(&self) -> PathBuf {
        self.root().join(".plugins").join("repos")
    }

    /// Write a layer manifest at `rel` from `(vendor, name, version)` triples.
    pub fn write_layer(&self, rel: &str, plugins: &[(&str, &str, &str)]) {
        let entries: Vec<serde_json::Value> = plugins
            .iter()
            .map(|(vendor, name, version)| {
                serde_json::json!({ "vendor": vendor, "name": name, "version": version })
            })
            .collect();
        let text = serde_json::to_string_pretty(&entries).unwrap();
        self.write_file(rel, &text);
    }

    /// Write an arbitrary file relative to the root, creating parents.
    pub fn write_file(&self, rel: &str, content: &str) {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("write_file: failed to write {}: {e}", path.display()));
    }

    /// Materialize a two-level `vendor/name` plugin under the repos dir.
    pub fn install_plugin(
        &self,
        vendor: &str,
        name: &str,
        descriptor: &str,
        files: &[(&str, &str)],
    ) -> PathBuf {
        let dir = self.repos_dir().join(vendor).join(name);
        write_plugin_dir(&dir, descriptor, files);
        dir
    }

    /// Materialize a legacy one-level plugin directly under the repos dir.
    pub fn install_flat_plugin(&self, name: &str, descriptor: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = self.repos_dir().join(name);
        write_plugin_dir(&dir, descriptor, files);
        dir
    }

    /// Read a file relative to the root.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, rel: &str) -> String {
        let path = self.root().join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Assert that `rel` exists.
    pub fn assert_file_exists(&self, rel: &str) {
        let full_path = self.root().join(rel);
        assert!(full_path.exists(), "Expected file to exist: {}", full_path.display());
    }

    /// Assert that `rel` does **not** exist.
    pub fn assert_file_not_exists(&self, rel: &str) {
        let full_path = self.root().join(rel);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }
}

fn write_plugin_dir(dir: &Path, descriptor: &str, files: &[(&str, &str)]) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("plugin.json"), descriptor).unwrap();
    for (rel, content) in files {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
    }
}
