use std::path::PathBuf;

/// Errors that can occur while resolving, fetching or merging plugins.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem or config-file error from plugmerge-fs.
    #[error(transparent)]
    Fs(#[from] plugmerge_fs::Error),

    /// A required manifest layer does not exist.
    #[error("manifest layer '{layer}' not found at {path}")]
    ManifestNotFound { layer: String, path: PathBuf },

    /// A manifest layer exists but is not a JSON array of plugin references.
    #[error("failed to parse manifest layer '{layer}' at {path}: {message}")]
    ManifestParse {
        layer: String,
        path: PathBuf,
        message: String,
    },

    /// The plugin has no descriptor on disk (not yet installed).
    #[error("plugin descriptor for {key} not found at {path}")]
    MetadataNotFound { key: String, path: PathBuf },

    /// The plugin descriptor exists but cannot be parsed.
    #[error("failed to parse plugin descriptor for {key} at {path}: {message}")]
    MetadataParse {
        key: String,
        path: PathBuf,
        message: String,
    },

    /// A requirement string does not name a vendor/name pair.
    #[error("invalid requirement '{requirement}': {reason}")]
    InvalidRequirement { requirement: String, reason: String },

    /// A plugin key would address a directory outside `repos/`.
    #[error("refusing to install {key}: {reason}")]
    UnsafePluginKey { key: String, reason: String },

    /// The project configuration is inconsistent.
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// The installed-set file has not been written yet.
    #[error("installed set not found at {0}; run resolve first")]
    InstalledSetMissing(PathBuf),

    /// Network or client failure talking to the registry.
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// The registry answered with a non-success status.
    #[error("bad status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    /// The downloaded archive could not be read.
    #[error("corrupt archive {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// An archive entry would land outside the install directory.
    #[error("unsafe archive entry '{entry}'")]
    UnsafeArchiveEntry { entry: String },

    /// One or more plugins could not be installed.
    #[error("{} plugin(s) failed to install: {}", failures.len(), failures.join(", "))]
    FetchFailed { failures: Vec<String> },

    /// Plugins were discovered but none merged cleanly.
    #[error("none of the {discovered} discovered plugin(s) could be merged")]
    NothingMerged { discovered: usize },
}

impl Error {
    /// True for the expected "descriptor not on disk yet" condition.
    pub fn is_metadata_not_found(&self) -> bool {
        matches!(self, Self::MetadataNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
