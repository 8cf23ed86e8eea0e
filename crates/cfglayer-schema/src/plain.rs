//! Conversion between typed values and plain JSON documents.
//!
//! Binding is closed-world: keys the schema does not declare are dropped at
//! every level, so they never reach the typed value or its serialization.
//! In plain form an unset field is an explicit `null`, distinct from any
//! present value including `0`, `false` and `""`.

use serde_json::{Map, Value};

use crate::descriptor::{join_path, json_kind, ObjectSchema};
use crate::error::{BindError, FieldError, Rule};
use crate::Schema;

/// Path reported for errors about the document root.
pub const ROOT_PATH: &str = "(root)";

/// Parse JSON text into a plain document.
pub fn parse(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(text)
}

/// Keep only declared keys, recursively.
///
/// Values of the wrong kind are kept as-is so [`check_shapes`] can report them.
pub fn project(doc: &Map<String, Value>, schema: &ObjectSchema) -> Map<String, Value> {
    let mut projected = Map::new();
    for field in schema.fields {
        let Some(value) = doc.get(field.name) else {
            continue;
        };
        let value = match (field.kind.nested(), value) {
            (Some(nested), Value::Object(inner)) => Value::Object(project(inner, nested)),
            _ => value.clone(),
        };
        projected.insert(field.name.to_string(), value);
    }
    projected
}

/// Report every declared, non-null field whose JSON kind does not match.
pub fn check_shapes(doc: &Map<String, Value>, schema: &ObjectSchema, prefix: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    collect_shape_errors(doc, schema, prefix, &mut errors);
    errors
}

fn collect_shape_errors(
    doc: &Map<String, Value>,
    schema: &ObjectSchema,
    prefix: &str,
    errors: &mut Vec<FieldError>,
) {
    for field in schema.fields {
        let value = match doc.get(field.name) {
            None | Some(Value::Null) => continue,
            Some(value) => value,
        };
        let path = join_path(prefix, field.name);

        if !field.kind.matches(value) {
            errors.push(type_error(&path, field.kind.name(), value));
            continue;
        }

        if let (Some(nested), Value::Object(inner)) = (field.kind.nested(), value) {
            collect_shape_errors(inner, nested, &path, errors);
        }
    }
}

pub(crate) fn type_error(path: &str, expected: &str, found: &Value) -> FieldError {
    FieldError::new(
        path,
        Rule::Type,
        format!("expected {}, found {}", expected, json_kind(found)),
    )
}

/// Insert an explicit `null` for every declared field that is absent.
pub fn mark_unset(doc: &mut Map<String, Value>, schema: &ObjectSchema) {
    for field in schema.fields {
        let entry = doc.entry(field.name.to_string()).or_insert(Value::Null);
        if let (Some(nested), Value::Object(inner)) = (field.kind.nested(), entry) {
            mark_unset(inner, nested);
        }
    }
}

/// Remove `null` leaves. Objects stay, even when nothing is left in them.
pub fn strip_unset(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(strip_map(map, false)),
        other => other,
    }
}

/// Remove `null` leaves, then any object the removal left empty.
///
/// Used for the sparse form, where an empty object sets nothing.
pub fn prune_unset(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(strip_map(map, true)),
        other => other,
    }
}

fn strip_map(map: Map<String, Value>, prune_empty: bool) -> Map<String, Value> {
    map.into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::Object(inner) => {
                let inner = strip_map(inner, prune_empty);
                if prune_empty && inner.is_empty() {
                    None
                } else {
                    Some((key, Value::Object(inner)))
                }
            }
            other => Some((key, other)),
        })
        .collect()
}

/// Closed-world structural coercion from a plain document to a typed value.
pub fn bind<T: Schema>(doc: &Value) -> Result<T, BindError> {
    let schema = T::schema();
    let Value::Object(map) = doc else {
        return Err(BindError::Invalid(vec![type_error(ROOT_PATH, "object", doc)]));
    };

    let projected = project(map, schema);
    let errors = check_shapes(&projected, schema, "");
    if !errors.is_empty() {
        return Err(BindError::Invalid(errors));
    }

    Ok(serde_json::from_value(Value::Object(projected))?)
}

/// Typed value to plain document, with `null` marking every unset declared field.
pub fn to_plain<T: Schema>(value: &T) -> Result<Value, BindError> {
    let schema = T::schema();
    match serde_json::to_value(value)? {
        Value::Object(map) => {
            let mut projected = project(&map, schema);
            mark_unset(&mut projected, schema);
            Ok(Value::Object(projected))
        }
        other => Err(BindError::Invalid(vec![type_error(ROOT_PATH, "object", &other)])),
    }
}

/// Inverse of [`to_plain`]; `null` fields bind as unset.
pub fn from_plain<T: Schema>(doc: Value) -> Result<T, BindError> {
    bind(&doc)
}

/// Sparse plain form: only fields that are set.
pub fn to_sparse_plain<T: Schema>(value: &T) -> Result<Value, BindError> {
    to_plain(value).map(prune_unset)
}
