//! Plugin resolution, fetching and overlay merging for plugmerge
//!
//! Layered manifests are resolved into one deduplicated install set
//! ([`dependency`]), each plugin is downloaded and extracted ([`fetch`]),
//! given a content identity ([`identity`]), and finally overlaid into the
//! destination tree in priority order ([`merge`]). [`Project`] wires the
//! stages together for one project root.

pub mod archive;
pub mod config;
pub mod dependency;
pub mod error;
pub mod fetch;
pub mod identity;
pub mod manifest;
pub mod merge;
pub mod overrides;
pub mod project;
pub mod requirement;
pub mod schema;
pub mod transport;
pub mod version;

pub use config::ProjectConfig;
pub use dependency::{Resolution, Resolver, resolve};
pub use error::{Error, Result};
pub use fetch::{FailurePolicy, FetchOutcome, Fetcher, FetchingSource, InstallEvent, InstallReport};
pub use identity::{Revision, RevisionOrigin, resolve_revision};
pub use manifest::{Layer, ManifestStore, MetadataSource, PluginKey, PluginMetadata, PluginRef, ResolvedPlugin};
pub use merge::{InstalledPlugin, MergeEngine, MergeLayout, MergeReport, PluginLocation};
pub use project::{MergeSummary, PluginStatus, Project, SyncSummary};
pub use transport::{HttpTransport, Transport};
pub use version::VersionSpec;
