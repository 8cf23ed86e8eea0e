//! cfglayer - layered JSON configuration
//!
//! Loads a configuration file from a primary or fallback location, binds and
//! validates it against a static schema, and layers runtime overrides on top.
//! Overrides can be persisted so they survive restarts.

pub mod configurator;
pub mod encoding;
pub mod error;
pub mod loader;
pub mod logging;
pub mod merge;
pub mod options;
pub mod shared;

pub use cfglayer_schema as schema;
pub use cfglayer_schema::{FieldError, FieldSpec, ObjectSchema, Rule, Schema};

pub use configurator::{Configurator, OverridesStatus, PersistOutcome};
pub use encoding::Encoding;
pub use error::{ConfigError, ErrorCode, FileError};
pub use loader::{FileLoader, LoadedSource};
pub use merge::{merge, merge_layers};
pub use options::ConfiguratorOptions;
pub use shared::SharedConfigurator;
