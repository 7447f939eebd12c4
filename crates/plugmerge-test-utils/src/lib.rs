//! Shared test utilities for the plugmerge workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`archive`] - in-memory zip archives shaped like registry artifacts
//! - [`git`] - fake `.git` metadata shipped inside an extracted plugin
//! - [`project`] - [`TestProject`](project::TestProject) builder for a project root

pub mod archive;
pub mod git;
pub mod project;
