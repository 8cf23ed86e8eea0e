//! Configuration merge logic
//!
//! Merges a sparse source value into a target value, field by field:
//! - Objects: deep-merge by declared key (recursive)
//! - Arrays: REPLACE (source wins entirely)
//! - Scalars: a set source value overrides, an unset one keeps the target
//! - Object vs scalar at the same field: type mismatch, reported as a
//!   validation failure
//!
//! An object present on either side stays present in the result, even when
//! none of its fields are set.
//!
//! Neither input is modified. The result is not validated.

use cfglayer_schema::{
    from_plain, strip_unset, to_plain, FieldError, FieldSpec, ObjectSchema, Rule, Schema,
    ROOT_PATH,
};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Merge `source` over `target`, returning a new value.
pub fn merge<T: Schema>(target: &T, source: &T) -> Result<T, ConfigError> {
    let schema = T::schema();
    let target = to_plain(target)?;
    let source = to_plain(source)?;

    let merged =
        deep_merge(target, source, schema).map_err(|e| ConfigError::ValidationFailure(vec![e]))?;

    Ok(from_plain(strip_unset(merged))?)
}

/// Merge multiple override layers in order (last has highest precedence).
pub fn merge_layers<T: Schema>(layers: &[T]) -> Result<T, ConfigError> {
    layers
        .iter()
        .try_fold(T::default(), |acc, layer| merge(&acc, layer))
}

/// Deep merge two plain documents, where `null` marks an unset field.
///
/// Only keys declared by `schema` survive; the result still contains `null`
/// for fields unset on both sides.
pub fn deep_merge(target: Value, source: Value, schema: &ObjectSchema) -> Result<Value, FieldError> {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            merge_object(target_map, source_map, schema, "").map(Value::Object)
        }
        (target, source) => Err(mismatch(ROOT_PATH, "object", &target, &source)),
    }
}

fn merge_object(
    mut target: Map<String, Value>,
    mut source: Map<String, Value>,
    schema: &ObjectSchema,
    prefix: &str,
) -> Result<Map<String, Value>, FieldError> {
    let mut merged = Map::new();
    for field in schema.fields {
        let path = if prefix.is_empty() {
            field.name.to_string()
        } else {
            format!("{}.{}", prefix, field.name)
        };
        let target_value = target.remove(field.name).unwrap_or(Value::Null);
        let source_value = source.remove(field.name).unwrap_or(Value::Null);

        let value = merge_field(field, target_value, source_value, &path)?;
        merged.insert(field.name.to_string(), value);
    }
    Ok(merged)
}

fn merge_field(field: &FieldSpec, target: Value, source: Value, path: &str) -> Result<Value, FieldError> {
    let expected = field.kind.name();

    match field.kind.nested() {
        Some(nested) => match (target, source) {
            // Both objects: deep merge
            (Value::Object(t), Value::Object(s)) => merge_object(t, s, nested, path).map(Value::Object),

            // Unset target: source subtree merged over nothing
            (Value::Null, Value::Object(s)) => {
                merge_object(Map::new(), s, nested, path).map(Value::Object)
            }

            // Unset source keeps the target subtree
            (target @ (Value::Null | Value::Object(_)), Value::Null) => Ok(target),

            (target, source) => Err(mismatch(path, expected, &target, &source)),
        },
        None => {
            if target.is_object() || source.is_object() {
                return Err(mismatch(path, expected, &target, &source));
            }
            match source {
                Value::Null => Ok(target),
                // Scalars and arrays: source wins
                source => Ok(source),
            }
        }
    }
}

fn mismatch(path: &str, expected: &str, target: &Value, source: &Value) -> FieldError {
    FieldError::new(
        path,
        Rule::Type,
        format!(
            "cannot merge {} into {} (field is {})",
            kind(source),
            kind(target),
            expected
        ),
    )
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "unset",
        Value::Object(_) => "object",
        Value::Array(_) => "list",
        _ => "scalar",
    }
}
