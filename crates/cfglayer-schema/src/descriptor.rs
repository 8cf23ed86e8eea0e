//! Static schema descriptors.
//!
//! A schema is a tree of [`ObjectSchema`] values declared as `static` items.
//! Each [`FieldSpec`] names a JSON key, its primitive kind and the rules the
//! validator enforces for it.

use serde_json::Value;

/// Primitive kind of a declared field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Signed 64-bit integer.
    Integer,
    /// UTF-8 string.
    String,
    /// `true` / `false`.
    Boolean,
    /// JSON array, treated as an opaque value (replaced wholesale on merge).
    List,
    /// Nested object described by its own schema.
    Object(&'static ObjectSchema),
}

impl FieldKind {
    /// Human-readable kind name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::String => "string",
            FieldKind::Boolean => "boolean",
            FieldKind::List => "list",
            FieldKind::Object(_) => "object",
        }
    }

    /// Check whether a non-null JSON value has this kind.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::Integer => value.as_i64().is_some(),
            FieldKind::String => value.is_string(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::List => value.is_array(),
            FieldKind::Object(_) => value.is_object(),
        }
    }

    /// Nested schema for object fields.
    pub fn nested(&self) -> Option<&'static ObjectSchema> {
        match self {
            FieldKind::Object(schema) => Some(*schema),
            _ => None,
        }
    }
}

/// A single declared field.
///
/// Built with const constructors so schemas can live in `static` items:
///
/// ```
/// use cfglayer_schema::{FieldSpec, ObjectSchema};
///
/// static DB: ObjectSchema = ObjectSchema {
///     fields: &[
///         FieldSpec::string("host").non_empty(),
///         FieldSpec::integer("port").range(1, 65535),
///     ],
/// };
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// JSON key (must match the serde name of the struct field).
    pub name: &'static str,

    /// Primitive kind.
    pub kind: FieldKind,

    /// Whether a fully-formed value must set this field.
    pub required: bool,

    /// Inclusive integer bounds.
    pub range: Option<(i64, i64)>,

    /// Reject empty strings.
    pub non_empty: bool,

    /// Allowed string values.
    pub one_of: Option<&'static [&'static str]>,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            range: None,
            non_empty: false,
            one_of: None,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub const fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub const fn list(name: &'static str) -> Self {
        Self::new(name, FieldKind::List)
    }

    pub const fn object(name: &'static str, schema: &'static ObjectSchema) -> Self {
        Self::new(name, FieldKind::Object(schema))
    }

    /// Allow a fully-formed value to leave this field unset.
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Restrict an integer field to `[min, max]`.
    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.range = Some((min, max));
        self
    }

    /// Reject the empty string.
    pub const fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    /// Restrict a string field to a fixed set of values.
    pub const fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.one_of = Some(values);
        self
    }
}

/// An object shape: the closed set of fields a document may carry.
#[derive(Debug)]
pub struct ObjectSchema {
    pub fields: &'static [FieldSpec],
}

impl ObjectSchema {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    /// Look up a declared field by JSON key.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns true if `doc` sets no declared leaf.
    ///
    /// Undeclared keys and `null` values do not count; nested objects count
    /// only through their own leaves.
    pub fn is_empty_document(&self, doc: &Value) -> bool {
        let Some(map) = doc.as_object() else {
            return false;
        };

        self.fields.iter().all(|field| match map.get(field.name) {
            None | Some(Value::Null) => true,
            Some(value) => match (field.kind.nested(), value) {
                (Some(nested), Value::Object(_)) => nested.is_empty_document(value),
                _ => false,
            },
        })
    }
}

/// Join a dotted field path.
pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// JSON kind name of a value, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static INNER: ObjectSchema = ObjectSchema {
        fields: &[FieldSpec::integer("port").range(1, 10)],
    };

    static OUTER: ObjectSchema = ObjectSchema {
        fields: &[
            FieldSpec::string("name").non_empty().optional(),
            FieldSpec::object("inner", &INNER),
        ],
    };

    #[test]
    fn test_builders() {
        let field = FieldSpec::integer("port").range(1, 10).optional();
        assert_eq!(field.name, "port");
        assert!(!field.required);
        assert_eq!(field.range, Some((1, 10)));
        assert!(!field.non_empty);

        let field = FieldSpec::string("mode").one_of(&["a", "b"]);
        assert!(field.required);
        assert_eq!(field.one_of, Some(&["a", "b"][..]));
    }

    #[test]
    fn test_kind_matches() {
        assert!(FieldKind::Integer.matches(&json!(5)));
        assert!(!FieldKind::Integer.matches(&json!(5.5)));
        assert!(!FieldKind::Integer.matches(&json!("5")));
        assert!(FieldKind::Boolean.matches(&json!(false)));
        assert!(FieldKind::List.matches(&json!([1, 2])));
        assert!(FieldKind::Object(&INNER).matches(&json!({})));
    }

    #[test]
    fn test_field_lookup() {
        assert!(OUTER.field("inner").is_some());
        assert!(OUTER.field("missing").is_none());
        assert!(OUTER.field("inner").unwrap().kind.nested().is_some());
    }

    #[test]
    fn test_is_empty_document() {
        assert!(OUTER.is_empty_document(&json!({})));
        assert!(OUTER.is_empty_document(&json!({"unknown": 1})));
        assert!(OUTER.is_empty_document(&json!({"inner": {}, "name": null})));
        assert!(!OUTER.is_empty_document(&json!({"inner": {"port": 0}})));
        assert!(!OUTER.is_empty_document(&json!({"name": ""})));
        assert!(!OUTER.is_empty_document(&json!([])));
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "db"), "db");
        assert_eq!(join_path("db", "port"), "db.port");
    }
}
