//! Thread-safe handle around a [`Configurator`].
//!
//! `change` is a read-modify-write of the current configuration and the
//! overrides, so it runs under a single mutex. The optional disk write happens
//! after that lock is released. Writes are ordered by commit generation: a job
//! older than the last one written is dropped, so the file never goes back to
//! an earlier override set.

use cfglayer_schema::Schema;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::configurator::{Configurator, OverridesStatus, PersistJob, PersistOutcome};
use crate::error::ConfigError;
use crate::loader::LoadedSource;

#[derive(Debug)]
pub struct SharedConfigurator<T: Schema> {
    inner: Arc<Mutex<Configurator<T>>>,
    // Generation of the last job handed to the disk.
    written: Arc<Mutex<u64>>,
}

impl<T: Schema> Clone for SharedConfigurator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            written: Arc::clone(&self.written),
        }
    }
}

impl<T: Schema> SharedConfigurator<T> {
    pub fn new(configurator: Configurator<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(configurator)),
            written: Arc::new(Mutex::new(0)),
        }
    }

    // State is only ever replaced whole, so a poisoned lock still guards a
    // consistent configurator.
    fn lock(&self) -> MutexGuard<'_, Configurator<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn change(&self, values: &T, persist: bool) -> Result<PersistOutcome, ConfigError> {
        let job = {
            let mut configurator = self.lock();
            let (adds, current) = configurator.stage(values)?;
            configurator.commit(adds, current);
            persist.then(|| configurator.persist_job())
        };

        Ok(match job {
            Some(job) => self.write(job),
            None => PersistOutcome::Skipped,
        })
    }

    pub fn reset(&self, persist: bool) -> PersistOutcome {
        let job = {
            let mut configurator = self.lock();
            configurator.reset(false);
            persist.then(|| configurator.persist_job())
        };

        match job {
            Some(job) => self.write(job),
            None => PersistOutcome::Skipped,
        }
    }

    pub(crate) fn write(&self, job: PersistJob) -> PersistOutcome {
        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        if job.generation() < *written {
            debug!(
                generation = job.generation(),
                written = *written,
                "Skipping superseded override write"
            );
            return PersistOutcome::Superseded;
        }
        *written = job.generation();
        job.run()
    }

    pub fn curr(&self) -> T {
        self.lock().curr()
    }

    pub fn default_config(&self) -> T {
        self.lock().default_config()
    }

    pub fn adds(&self) -> T {
        self.lock().adds()
    }

    pub fn loaded_from(&self) -> LoadedSource {
        self.lock().loaded_from()
    }

    pub fn overrides_status(&self) -> OverridesStatus {
        self.lock().overrides_status()
    }
}
