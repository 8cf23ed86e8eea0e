//! Schema binding for cfglayer.
//!
//! Typed configuration structs implement [`Schema`] by pointing at a static
//! [`ObjectSchema`]. This crate converts between those structs and plain JSON
//! documents and checks them against the declared rules.

mod descriptor;
mod error;
mod plain;
mod validate;

pub use descriptor::{FieldKind, FieldSpec, ObjectSchema};
pub use error::{join_field_errors, BindError, FieldError, Rule};
pub use plain::{
    bind, check_shapes, from_plain, mark_unset, parse, project, prune_unset, strip_unset,
    to_plain, to_sparse_plain, ROOT_PATH,
};
pub use validate::{validate, validate_document};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// A typed configuration value with a fixed, static schema.
///
/// Every field is an `Option` so the same type can carry both a fully-formed
/// configuration and a sparse override set. `Default` must produce the value
/// with every field unset, and serde field names must match the
/// [`FieldSpec::name`] of the descriptor.
pub trait Schema: Serialize + DeserializeOwned + Clone + Default + Debug + PartialEq {
    fn schema() -> &'static ObjectSchema;
}
