//! Fake `.git` metadata as found inside packaged plugin artifacts.
//!
//! Only `HEAD`, loose refs and `packed-refs` are written; there is no object
//! store, which matches what archive exports that include `.git` look like.

use std::fs;
use std::path::Path;

/// Write `.git/HEAD` pointing at `refs/heads/<branch>` and a loose ref file
/// containing `sha`.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_loose_ref(path: &Path, branch: &str, sha: &str) {
    let git = path.join(".git");
    fs::create_dir_all(git.join("refs/heads"))
        .unwrap_or_else(|e| panic!("fake_git_loose_ref: failed to create refs/heads: {e}"));
    fs::write(git.join("HEAD"), format!("ref: refs/heads/{branch}\n"))
        .unwrap_or_else(|e| panic!("fake_git_loose_ref: failed to write HEAD: {e}"));
    fs::write(git.join("refs/heads").join(branch), format!("{sha}\n"))
        .unwrap_or_else(|e| panic!("fake_git_loose_ref: failed to write ref: {e}"));
}

/// Write `.git/HEAD` pointing at `refs/heads/<branch>` with the ref only
/// present in `packed-refs`.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_packed_ref(path: &Path, branch: &str, sha: &str) {
    let git = path.join(".git");
    fs::create_dir_all(&git)
        .unwrap_or_else(|e| panic!("fake_git_packed_ref: failed to create .git: {e}"));
    fs::write(git.join("HEAD"), format!("ref: refs/heads/{branch}\n"))
        .unwrap_or_else(|e| panic!("fake_git_packed_ref: failed to write HEAD: {e}"));
    let packed = format!(
        "# pack-refs with: peeled fully-peeled sorted\n\
         1111111111111111111111111111111111111111 refs/heads/other\n\
         {sha} refs/heads/{branch}\n\
         ^2222222222222222222222222222222222222222\n"
    );
    fs::write(git.join("packed-refs"), packed)
        .unwrap_or_else(|e| panic!("fake_git_packed_ref: failed to write packed-refs: {e}"));
}

/// Write a detached `.git/HEAD` containing a raw commit sha.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_detached(path: &Path, sha: &str) {
    let git = path.join(".git");
    fs::create_dir_all(&git)
        .unwrap_or_else(|e| panic!("fake_git_detached: failed to create .git: {e}"));
    fs::write(git.join("HEAD"), format!("{sha}\n"))
        .unwrap_or_else(|e| panic!("fake_git_detached: failed to write HEAD: {e}"));
}
