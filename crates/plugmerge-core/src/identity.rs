//! Best-effort content identity for installed plugins.
//!
//! The first rule that yields a non-empty value wins:
//!
//! 1. `revision` from the plugin descriptor
//! 2. `version` from the plugin descriptor
//! 3. the commit named by a shipped `.git/HEAD`
//! 4. a `sha256:` checksum over the install directory
//!
//! Only `HEAD`, loose refs and `packed-refs` are read for rule 3; artifact
//! exports frequently carry a `.git` directory without an object store.

use std::fs;
use std::path::Path;

use plugmerge_fs::ProjectPath;
use plugmerge_fs::checksum::compute_dir_checksum;

use crate::error::Result;
use crate::manifest::PluginMetadata;

/// Which rule produced a [`Revision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionOrigin {
    Declared,
    Version,
    GitHead,
    ContentHash,
}

impl std::fmt::Display for RevisionOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Declared => "declared",
            Self::Version => "version",
            Self::GitHead => "git",
            Self::ContentHash => "content",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub value: String,
    pub origin: RevisionOrigin,
}

/// Derive the revision of the plugin installed at `path`.
pub fn resolve_revision(path: &Path, metadata: Option<&PluginMetadata>) -> Result<Revision> {
    if let Some(meta) = metadata {
        if let Some(revision) = meta.declared_revision() {
            return Ok(Revision {
                value: revision.trim().to_string(),
                origin: RevisionOrigin::Declared,
            });
        }
        if let Some(version) = meta.declared_version() {
            return Ok(Revision {
                value: version.trim().to_string(),
                origin: RevisionOrigin::Version,
            });
        }
    }

    if let Some(head) = read_git_head(path) {
        return Ok(Revision {
            value: head,
            origin: RevisionOrigin::GitHead,
        });
    }

    let value = compute_dir_checksum(path)?;
    Ok(Revision {
        value,
        origin: RevisionOrigin::ContentHash,
    })
}

/// Commit id from `<path>/.git/HEAD`, following one symbolic ref through the
/// loose ref file and then `packed-refs`.
pub fn read_git_head(path: &Path) -> Option<String> {
    let git_dir = path.join(ProjectPath::GitDir);
    let head = fs::read_to_string(git_dir.join("HEAD")).ok()?;
    let head = head.trim();

    let Some(reference) = head.strip_prefix("ref:") else {
        return non_empty(head);
    };
    let reference = reference.trim();

    if let Ok(loose) = fs::read_to_string(git_dir.join(reference))
        && let Some(sha) = non_empty(loose.trim())
    {
        return Some(sha);
    }

    let packed = fs::read_to_string(git_dir.join("packed-refs")).ok()?;
    packed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('^'))
        .find_map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(sha), Some(name), None) if name == reference => Some(sha.to_string()),
                _ => None,
            }
        })
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
