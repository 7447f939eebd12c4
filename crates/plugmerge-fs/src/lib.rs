//! Filesystem layer for plugmerge
//!
//! Provides normalized paths, locked atomic writes, format-agnostic config
//! files, sha256 checksums over files and whole trees, and recursive copies.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod copy;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::ProjectPath;
pub use copy::CopyStats;
pub use error::{Error, Result};
pub use path::NormalizedPath;
