//! Serde-backed loading and saving of JSON and TOML files

use crate::{Error, NormalizedPath, Result, io};
use serde::{Serialize, de::DeserializeOwned};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &NormalizedPath) -> Result<Self> {
        match path.extension().as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(Error::UnsupportedFormat {
                extension: other.unwrap_or_default().to_string(),
            }),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Toml => "TOML",
        }
    }
}

/// Store for the JSON manifests, installed set and TOML project config.
///
/// The format follows the file extension (`.json` or `.toml`).
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    pub fn load<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<T> {
        let format = Format::of(path)?;
        let content = io::read_text(path)?;
        Self::decode(path, format, &content)
    }

    /// Like [`load`](Self::load), but a missing file yields `Ok(None)`.
    pub fn load_optional<T: DeserializeOwned>(&self, path: &NormalizedPath) -> Result<Option<T>> {
        let format = Format::of(path)?;
        match io::read_text(path) {
            Ok(content) => Self::decode(path, format, &content).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Serialize `value` and replace the file atomically.
    pub fn save<T: Serialize>(&self, path: &NormalizedPath, value: &T) -> Result<()> {
        let format = Format::of(path)?;
        let encoded = match format {
            Format::Json => serde_json::to_string_pretty(value)
                .map(|text| text + "\n")
                .map_err(|e| e.to_string()),
            Format::Toml => toml::to_string_pretty(value).map_err(|e| e.to_string()),
        };
        let text = encoded.map_err(|message| Error::ConfigSerialize {
            path: path.to_native(),
            format: format.label().to_string(),
            message,
        })?;
        io::write_text(path, &text)
    }

    fn decode<T: DeserializeOwned>(path: &NormalizedPath, format: Format, content: &str) -> Result<T> {
        let decoded = match format {
            Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        };
        decoded.map_err(|message| Error::ConfigParse {
            path: path.to_native(),
            format: format.label().to_string(),
            message,
        })
    }
}
