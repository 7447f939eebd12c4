//! Concatenation of plugin `schema.json` fragments.

use std::path::Path;

use plugmerge_fs::{ConfigStore, NormalizedPath, ProjectPath};
use serde_json::Value;

use crate::error::Result;
use crate::merge::InstalledPlugin;

/// Outcome of a schema merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaMerge {
    /// Fragments that contributed entries.
    pub sources: usize,
    /// Total entries written.
    pub entries: usize,
}

/// Concatenate the array in each plugin's `schema.json`, in the given
/// order, into `output`.
///
/// Unreadable or non-array fragments are skipped. When no plugin ships a
/// fragment, `output` is left untouched.
pub fn merge_schemas(plugins: &[InstalledPlugin], output: &Path) -> Result<SchemaMerge> {
    let store = ConfigStore::new();
    let mut merged: Vec<Value> = Vec::new();
    let mut result = SchemaMerge::default();

    for plugin in plugins {
        let path = NormalizedPath::new(plugin.path().join(ProjectPath::SchemaFragment));
        match store.load_optional::<Vec<Value>>(&path) {
            Ok(Some(entries)) => {
                tracing::debug!(plugin = %plugin.key, entries = entries.len(), "schema fragment");
                result.sources += 1;
                merged.extend(entries);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(plugin = %plugin.key, error = %e, "skipping schema fragment");
            }
        }
    }

    if result.sources == 0 {
        tracing::debug!("no schema fragments found");
        return Ok(result);
    }

    result.entries = merged.len();
    store.save(&NormalizedPath::new(output), &merged)?;
    tracing::info!(path = %output.display(), entries = result.entries, "wrote merged schema");
    Ok(result)
}
