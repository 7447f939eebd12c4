//! Version string normalization for registry downloads.
//!
//! Manifest versions are free-form. Three spellings request the newest
//! artifact rather than a pinned one:
//!
//! - `latest` (any case)
//! - `v-latest` (any case), an alias of `latest`
//! - a four-component dotted number such as `0.0.1.3`
//!
//! Everything else is passed to the registry verbatim.
//!
//! # Examples
//!
//! ```
//! use plugmerge_core::version::VersionSpec;
//!
//! assert_eq!(VersionSpec::parse("V-Latest"), VersionSpec::Latest);
//! assert_eq!(VersionSpec::parse("0.0.1.3"), VersionSpec::Latest);
//! assert_eq!(VersionSpec::parse("1.2.0").locator(), "1.2.0");
//! ```

use std::sync::LazyLock;

use regex::Regex;

/// The literal used for "newest available" in locators and installed sets.
pub const LATEST: &str = "latest";

static FOUR_COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+$").expect("static pattern"));

/// A normalized download version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// Resolve to the newest artifact.
    Latest,
    /// A specific version string.
    Pinned(String),
}

impl VersionSpec {
    /// Classify a manifest version string.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.is_empty() || lower == LATEST || lower == "v-latest" || FOUR_COMPONENT.is_match(&lower) {
            Self::Latest
        } else {
            Self::Pinned(trimmed.to_string())
        }
    }

    /// The version segment used in download locators.
    pub fn locator(&self) -> &str {
        match self {
            Self::Latest => LATEST,
            Self::Pinned(v) => v,
        }
    }

    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }
}

impl std::fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.locator())
    }
}
