//! Configurator options.
//!
//! Paths and encoding used by [`crate::Configurator`]. Options can be built in
//! code, deserialized, or overridden from `CFGLAYER_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::encoding::{Encoding, UnknownEncoding};

/// Conventional location of the persisted override file.
pub const DEFAULT_ADDS_PATH: &str = "./runtime/config-adds/config-adds.json";

/// Default primary configuration file.
pub const DEFAULT_GLOBAL_PATH: &str = "./config.json";

pub const ENV_GLOBAL_PATH: &str = "CFGLAYER_GLOBAL";
pub const ENV_LOCAL_PATH: &str = "CFGLAYER_LOCAL";
pub const ENV_ADDS_PATH: &str = "CFGLAYER_ADDS_PATH";
pub const ENV_ENCODING: &str = "CFGLAYER_ENCODING";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfiguratorOptions {
    /// Primary configuration file
    pub global_path: PathBuf,

    /// Fallback used when the primary cannot be read
    pub local_path: Option<PathBuf>,

    /// Encoding for every file the configurator reads or writes
    pub encoding: Encoding,

    /// Persisted override file
    pub adds_path: PathBuf,
}

impl Default for ConfiguratorOptions {
    fn default() -> Self {
        Self {
            global_path: PathBuf::from(DEFAULT_GLOBAL_PATH),
            local_path: None,
            encoding: Encoding::default(),
            adds_path: PathBuf::from(DEFAULT_ADDS_PATH),
        }
    }
}

impl ConfiguratorOptions {
    pub fn new(global_path: impl Into<PathBuf>) -> Self {
        Self {
            global_path: global_path.into(),
            ..Default::default()
        }
    }

    pub fn with_fallback(mut self, local_path: impl Into<PathBuf>) -> Self {
        self.local_path = Some(local_path.into());
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_adds_path(mut self, adds_path: impl Into<PathBuf>) -> Self {
        self.adds_path = adds_path.into();
        self
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, UnknownEncoding> {
        Self::default().apply_env_with(|key| std::env::var(key).ok())
    }

    /// Override fields from `lookup`, which maps `CFGLAYER_*` names to values.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, UnknownEncoding>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_GLOBAL_PATH) {
            self.global_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_LOCAL_PATH) {
            self.local_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup(ENV_ADDS_PATH) {
            self.adds_path = PathBuf::from(path);
        }
        if let Some(label) = lookup(ENV_ENCODING) {
            self.encoding = label.parse()?;
        }
        Ok(self)
    }
}
