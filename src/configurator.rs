//! Layered configuration state.
//!
//! A [`Configurator`] holds three values of the same schema type:
//! - `default`: bound from the primary/fallback file, never modified
//! - `adds`: the accumulated sparse overrides
//! - `current`: `default` with `adds` merged in
//!
//! Construction either fully succeeds or returns an error. Overrides persisted
//! by an earlier run are applied on a best-effort basis: any problem with them
//! is logged and the configurator starts with no overrides.

use cfglayer_schema::{bind, parse, to_sparse_plain, validate, Schema};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ErrorCode};
use crate::loader::{FileLoader, LoadedSource};
use crate::merge::merge;
use crate::options::ConfiguratorOptions;

/// What happened to the persisted override file at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OverridesStatus {
    /// No override file exists.
    NotFound { path: PathBuf },

    /// The file sets no schema field.
    Empty { path: PathBuf },

    /// Overrides were merged into the current configuration.
    Applied { path: PathBuf, digest: String },

    /// The file could not be used; the configurator runs without overrides.
    Rejected {
        path: PathBuf,
        code: ErrorCode,
        reason: String,
    },
}

/// Result of the optional write-through after a successful change.
#[derive(Debug)]
pub enum PersistOutcome {
    /// Persistence was not requested.
    Skipped,

    /// Overrides were written to this path.
    Written(PathBuf),

    /// Writing failed; the in-memory change stands.
    Failed(ConfigError),

    /// A newer change was already written, so this one was not.
    Superseded,
}

impl PersistOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, PersistOutcome::Failed(_))
    }
}

/// Serialized overrides waiting to be written.
#[derive(Debug)]
pub(crate) struct PersistJob {
    loader: FileLoader,
    path: PathBuf,
    generation: u64,
    text: Result<String, ConfigError>,
}

impl PersistJob {
    /// Commit count of the state this job serializes.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn run(self) -> PersistOutcome {
        let text = match self.text {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Failed to serialize overrides");
                return PersistOutcome::Failed(err);
            }
        };

        match self.loader.write(&self.path, &text) {
            Ok(()) => {
                info!(path = %self.path.display(), "Persisted configuration overrides");
                PersistOutcome::Written(self.path)
            }
            Err(e) => {
                let err = ConfigError::PersistFailure(e);
                warn!(path = %self.path.display(), error = %err, "Failed to persist overrides");
                PersistOutcome::Failed(err)
            }
        }
    }
}

/// Loaded configuration with runtime overrides.
#[derive(Debug)]
pub struct Configurator<T: Schema> {
    loader: FileLoader,
    adds_path: PathBuf,
    source: LoadedSource,
    default_config: T,
    current: T,
    adds: T,
    overrides_status: OverridesStatus,
    generation: u64,
}

impl<T: Schema> Configurator<T> {
    /// Load from `global_path` only.
    pub fn new(global_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Self::with_options(ConfiguratorOptions::new(global_path))
    }

    /// Load from `global_path`, falling back to `local_path`.
    pub fn with_fallback(
        global_path: impl Into<PathBuf>,
        local_path: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        Self::with_options(ConfiguratorOptions::new(global_path).with_fallback(local_path))
    }

    pub fn with_options(options: ConfiguratorOptions) -> Result<Self, ConfigError> {
        let loader = FileLoader::new(options.encoding);
        let loaded = loader.load(&options.global_path, options.local_path.as_deref())?;

        let doc = parse(&loaded.text).map_err(|source| ConfigError::ParseFailure {
            origin: loaded.source.path.display().to_string(),
            source,
        })?;
        let bound: T = bind(&doc)?;

        let errors = validate(&bound);
        if !errors.is_empty() {
            return Err(ConfigError::ValidationFailure(errors));
        }

        info!(
            path = %loaded.source.path.display(),
            is_global = loaded.source.is_global,
            digest = %loaded.source.digest,
            "Loaded configuration"
        );

        let mut configurator = Self {
            loader,
            overrides_status: OverridesStatus::NotFound {
                path: options.adds_path.clone(),
            },
            adds_path: options.adds_path,
            source: loaded.source,
            default_config: bound.clone(),
            current: bound,
            adds: T::default(),
            generation: 0,
        };
        configurator.apply_persisted_overrides();
        Ok(configurator)
    }

    fn apply_persisted_overrides(&mut self) {
        let path = self.adds_path.clone();

        self.overrides_status = match self.read_overrides(&path) {
            Ok((adds, current, digest)) => {
                info!(path = %path.display(), "Applied persisted overrides");
                self.adds = adds;
                self.current = current;
                OverridesStatus::Applied { path, digest }
            }
            Err(ConfigError::LoadFailure { primary, .. }) if primary.is_not_found() => {
                debug!(path = %path.display(), "No persisted overrides");
                OverridesStatus::NotFound { path }
            }
            Err(ConfigError::EmptyOverrides(_)) => {
                debug!(path = %path.display(), "Persisted overrides are empty");
                OverridesStatus::Empty { path }
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    code = %err.code(),
                    error = %err,
                    "Ignoring persisted overrides"
                );
                OverridesStatus::Rejected {
                    path,
                    code: err.code(),
                    reason: err.to_string(),
                }
            }
        };
    }

    /// Read, bind and tentatively apply the override file.
    fn read_overrides(&self, path: &Path) -> Result<(T, T, String), ConfigError> {
        let contents = self
            .loader
            .read(path)
            .map_err(|primary| ConfigError::LoadFailure {
                primary,
                fallback: None,
            })?;

        let doc = parse(&contents.text).map_err(|source| ConfigError::ParseFailure {
            origin: path.display().to_string(),
            source,
        })?;
        let adds: T = bind(&doc)?;
        if T::schema().is_empty_document(&doc) {
            return Err(ConfigError::EmptyOverrides(path.to_path_buf()));
        }

        let current = merge(&self.default_config, &adds)?;
        let errors = validate(&current);
        if !errors.is_empty() {
            return Err(ConfigError::ValidationFailure(errors));
        }

        Ok((adds, current, contents.digest))
    }

    /// Fold `values` into the overrides and recompute the current configuration.
    ///
    /// If the result is invalid nothing changes and the validation errors are
    /// returned. With `persist`, the overrides are then written to disk; a
    /// write failure is reported in the outcome and does not undo the change.
    pub fn change(&mut self, values: &T, persist: bool) -> Result<PersistOutcome, ConfigError> {
        let (adds, current) = self.stage(values)?;
        self.commit(adds, current);

        Ok(if persist {
            self.persist_job().run()
        } else {
            PersistOutcome::Skipped
        })
    }

    /// Drop every override; the current configuration becomes the default.
    pub fn reset(&mut self, persist: bool) -> PersistOutcome {
        self.commit(T::default(), self.default_config.clone());

        if persist {
            self.persist_job().run()
        } else {
            PersistOutcome::Skipped
        }
    }

    pub(crate) fn stage(&self, values: &T) -> Result<(T, T), ConfigError> {
        let adds = merge(&self.adds, values)?;
        let candidate = merge(&self.current, &adds)?;

        let errors = validate(&candidate);
        if !errors.is_empty() {
            let err = ConfigError::ValidationFailure(errors);
            warn!(error = %err, "Rejected configuration change");
            return Err(err);
        }

        Ok((adds, candidate))
    }

    pub(crate) fn commit(&mut self, adds: T, current: T) {
        self.adds = adds;
        self.current = current;
        self.generation += 1;
        debug!(generation = self.generation, "Committed configuration change");
    }

    pub(crate) fn persist_job(&self) -> PersistJob {
        let text = to_sparse_plain(&self.adds)
            .map_err(ConfigError::from)
            .and_then(|doc| {
                serde_json::to_string_pretty(&doc).map_err(|source| {
                    ConfigError::ConversionFailure {
                        context: "overrides",
                        source,
                    }
                })
            });

        PersistJob {
            loader: self.loader,
            path: self.adds_path.clone(),
            generation: self.generation,
            text,
        }
    }

    /// Current configuration: default with overrides applied.
    pub fn curr(&self) -> T {
        self.current.clone()
    }

    /// Configuration as loaded from file.
    pub fn default_config(&self) -> T {
        self.default_config.clone()
    }

    /// Accumulated overrides; unset fields are not overridden.
    pub fn adds(&self) -> T {
        self.adds.clone()
    }

    pub fn loaded_from(&self) -> LoadedSource {
        self.source.clone()
    }

    pub fn overrides_status(&self) -> OverridesStatus {
        self.overrides_status.clone()
    }

    pub fn adds_path(&self) -> &Path {
        &self.adds_path
    }
}
