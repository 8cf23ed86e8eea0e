//! Rule checks against a schema.

use serde_json::{Map, Value};

use crate::descriptor::{join_path, FieldKind, ObjectSchema};
use crate::error::{BindError, FieldError, Rule};
use crate::plain::{to_plain, type_error, ROOT_PATH};
use crate::Schema;

/// Validate a typed value. An empty list means the value is fully formed.
pub fn validate<T: Schema>(value: &T) -> Vec<FieldError> {
    match to_plain(value) {
        Ok(doc) => validate_document(&doc, T::schema()),
        Err(BindError::Invalid(errors)) => errors,
        Err(BindError::Convert(e)) => vec![FieldError::new(ROOT_PATH, Rule::Type, e.to_string())],
    }
}

/// Validate a plain document against a schema.
pub fn validate_document(doc: &Value, schema: &ObjectSchema) -> Vec<FieldError> {
    let mut errors = Vec::new();
    match doc {
        Value::Object(map) => validate_object(map, schema, "", &mut errors),
        other => errors.push(type_error(ROOT_PATH, "object", other)),
    }
    errors
}

fn validate_object(
    map: &Map<String, Value>,
    schema: &ObjectSchema,
    prefix: &str,
    errors: &mut Vec<FieldError>,
) {
    for field in schema.fields {
        let path = join_path(prefix, field.name);
        let value = match map.get(field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    errors.push(FieldError::new(path, Rule::Required, "field is required"));
                }
                continue;
            }
            Some(value) => value,
        };

        if !field.kind.matches(value) {
            errors.push(type_error(&path, field.kind.name(), value));
            continue;
        }

        match (field.kind, value) {
            (FieldKind::Integer, Value::Number(n)) => {
                if let (Some((min, max)), Some(n)) = (field.range, n.as_i64()) {
                    if n < min || n > max {
                        errors.push(FieldError::new(
                            path,
                            Rule::Range,
                            format!("must be in [{}, {}], got {}", min, max, n),
                        ));
                    }
                }
            }
            (FieldKind::String, Value::String(s)) => {
                if field.non_empty && s.is_empty() {
                    errors.push(FieldError::new(path, Rule::NonEmpty, "must not be empty"));
                } else if let Some(allowed) = field.one_of {
                    if !allowed.contains(&s.as_str()) {
                        errors.push(FieldError::new(
                            path,
                            Rule::OneOf,
                            format!("must be one of [{}], got '{}'", allowed.join(", "), s),
                        ));
                    }
                }
            }
            (FieldKind::Object(nested), Value::Object(inner)) => {
                validate_object(inner, nested, &path, errors);
            }
            _ => {}
        }
    }
}
