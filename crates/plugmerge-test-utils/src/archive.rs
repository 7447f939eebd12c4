//! In-memory zip archives for fetcher tests.

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

/// Build a zip archive from `(name, contents)` pairs.
///
/// A name ending in `/` is written as a directory entry and its contents are
/// ignored.
///
/// # Panics
/// Panics if the zip writer fails.
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        if name.ends_with('/') {
            let options = SimpleFileOptions::default().unix_permissions(0o755);
            writer
                .add_directory(name.trim_end_matches('/'), options)
                .unwrap_or_else(|e| panic!("zip_archive: failed to add dir {name}: {e}"));
        } else {
            let options = SimpleFileOptions::default().unix_permissions(0o644);
            writer
                .start_file(*name, options)
                .unwrap_or_else(|e| panic!("zip_archive: failed to start {name}: {e}"));
            writer
                .write_all(contents)
                .unwrap_or_else(|e| panic!("zip_archive: failed to write {name}: {e}"));
        }
    }

    writer
        .finish()
        .unwrap_or_else(|e| panic!("zip_archive: failed to finish: {e}"))
        .into_inner()
}

/// Build an archive the way a source host packages a repository: every entry
/// lives under a single `root/` folder, with the root directory entry first.
///
/// `descriptor` is written as `root/plugin.json` when given.
pub fn plugin_archive(root: &str, descriptor: Option<&str>, files: &[(&str, &str)]) -> Vec<u8> {
    let root_entry = format!("{root}/");
    let mut owned: Vec<(String, Vec<u8>)> = vec![(root_entry, Vec::new())];

    if let Some(descriptor) = descriptor {
        owned.push((format!("{root}/plugin.json"), descriptor.as_bytes().to_vec()));
    }
    for (name, contents) in files {
        owned.push((format!("{root}/{name}"), contents.as_bytes().to_vec()));
    }

    let borrowed: Vec<(&str, &[u8])> = owned
        .iter()
        .map(|(name, data)| (name.as_str(), data.as_slice()))
        .collect();
    zip_archive(&borrowed)
}
