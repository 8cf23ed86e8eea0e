//! Configuration file access.
//!
//! Reads the primary file, falling back to a secondary location, and records
//! where the configuration actually came from. Only `.json` files are
//! accepted, for reading and for writing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::encoding::Encoding;
use crate::error::{ConfigError, FileError};

/// The one recognized configuration file extension.
pub const CONFIG_EXTENSION: &str = "json";

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedSource {
    /// Path that was actually read
    pub path: PathBuf,

    /// True if the primary (global) path was used, false for the fallback
    pub is_global: bool,

    /// SHA-256 digest of the raw file bytes
    pub digest: String,

    /// When the file was read
    pub loaded_at: DateTime<Utc>,
}

/// Decoded contents of a single file.
#[derive(Debug, Clone)]
pub struct FileContents {
    pub text: String,
    pub digest: String,
}

/// Result of a primary/fallback load.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub text: String,
    pub source: LoadedSource,
}

/// Reads and writes configuration files in a fixed encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader {
    encoding: Encoding,
}

impl FileLoader {
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Load `primary`, or `fallback` if the primary cannot be read for any reason.
    pub fn load(&self, primary: &Path, fallback: Option<&Path>) -> Result<LoadedFile, ConfigError> {
        let primary_err = match self.read(primary) {
            Ok(contents) => return Ok(Self::loaded(primary, true, contents)),
            Err(e) => e,
        };

        let Some(fallback) = fallback else {
            return Err(ConfigError::LoadFailure {
                primary: primary_err,
                fallback: None,
            });
        };

        warn!(
            primary = %primary.display(),
            fallback = %fallback.display(),
            error = %primary_err,
            "Primary configuration unavailable, trying fallback"
        );

        match self.read(fallback) {
            Ok(contents) => Ok(Self::loaded(fallback, false, contents)),
            Err(fallback_err) => Err(ConfigError::LoadFailure {
                primary: primary_err,
                fallback: Some(fallback_err),
            }),
        }
    }

    fn loaded(path: &Path, is_global: bool, contents: FileContents) -> LoadedFile {
        LoadedFile {
            text: contents.text,
            source: LoadedSource {
                path: path.to_path_buf(),
                is_global,
                digest: contents.digest,
                loaded_at: Utc::now(),
            },
        }
    }

    /// Read and decode a single file.
    pub fn read(&self, path: &Path) -> Result<FileContents, FileError> {
        check_extension(path)?;

        let bytes = fs::read(path).map_err(|source| FileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let text = self
            .encoding
            .decode(&bytes)
            .map_err(|reason| FileError::Encoding {
                path: path.to_path_buf(),
                encoding: self.encoding,
                reason,
            })?;

        debug!(path = %path.display(), bytes = bytes.len(), %digest, "Read configuration file");
        Ok(FileContents { text, digest })
    }

    /// Write `text`, creating parent directories and replacing any existing file.
    pub fn write(&self, path: &Path, text: &str) -> Result<(), FileError> {
        check_extension(path)?;

        let bytes = self.encoding.encode(text).map_err(|reason| FileError::Encoding {
            path: path.to_path_buf(),
            encoding: self.encoding,
            reason,
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| FileError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, bytes).map_err(|source| FileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Wrote configuration file");
        Ok(())
    }
}

fn check_extension(path: &Path) -> Result<(), FileError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(CONFIG_EXTENSION) => Ok(()),
        _ => Err(FileError::UnsupportedExtension {
            path: path.to_path_buf(),
            expected: CONFIG_EXTENSION,
        }),
    }
}
