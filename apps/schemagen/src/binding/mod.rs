//! Checks a raw JSON payload against a schema tree and produces the validated
//! in-memory `Document`.
//!
//! No coercion happens here: a numeric string is not an integer, a float is
//! not an integer, and a missing required field is never defaulted. Absent
//! optional fields come out as `null` so every document carries the full
//! schema shape. The first violation found wins.

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::schema::{join_path, Kind, SchemaNode};

pub mod models;

const ROOT: &str = "$";

/// A materialized value mirroring the shape of its schema.
///
/// Mappings keep the schema's declared field order, not the payload's.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// An optional field that was absent or explicitly `null`.
    Null,
    String(String),
    Integer(i64),
    Sequence(Vec<Document>),
    Mapping(Vec<(String, Document)>),
}

impl Document {
    /// Top-level keys in order; empty for non-mappings.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Document::Mapping(fields) => fields.iter().map(|(k, _)| k.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Document::Null => Value::Null,
            Document::String(s) => Value::String(s.clone()),
            Document::Integer(n) => Value::Number(Number::from(*n)),
            Document::Sequence(items) => Value::Array(items.iter().map(Document::to_value).collect()),
            Document::Mapping(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    /// Converts the document into a typed model.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_value())
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Document::Null => serializer.serialize_unit(),
            Document::String(s) => serializer.serialize_str(s),
            Document::Integer(n) => serializer.serialize_i64(*n),
            Document::Sequence(items) => serializer.collect_seq(items),
            Document::Mapping(fields) => {
                serializer.collect_map(fields.iter().map(|(k, v)| (k.as_str(), v)))
            }
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Violation {
    #[error("payload is not valid JSON: {0}")]
    Malformed(String),

    #[error("required field missing")]
    MissingField,

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value '{value}' not in allowed set")]
    NotAllowed { value: String },

    #[error("integer out of range")]
    IntegerOutOfRange,

    #[error("field not declared in schema")]
    UndeclaredField,
}

/// The first schema violation found in a payload, qualified by field path
/// (`work_experience[1].position`, or `$` for the payload itself).
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{path}: {violation}")]
pub struct ValidationError {
    pub path: String,
    pub violation: Violation,
}

impl ValidationError {
    fn new(path: &str, violation: Violation) -> Self {
        Self {
            path: path.to_string(),
            violation,
        }
    }
}

/// Parses `raw` as JSON and checks it against `schema`.
///
/// With `strict` set, fields not declared in the schema are rejected;
/// otherwise they are dropped from the resulting document.
pub fn validate(raw: &str, schema: &SchemaNode, strict: bool) -> Result<Document, ValidationError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ValidationError::new(ROOT, Violation::Malformed(e.to_string())))?;
    Validator { strict }.node(&value, schema, ROOT)
}

struct Validator {
    strict: bool,
}

impl Validator {
    fn node(&self, value: &Value, schema: &SchemaNode, path: &str) -> Result<Document, ValidationError> {
        match (&schema.kind, value) {
            (Kind::String, Value::String(s)) => Ok(Document::String(s.clone())),
            (Kind::Integer, Value::Number(n)) => match n.as_i64() {
                Some(i) => Ok(Document::Integer(i)),
                None if n.is_u64() => Err(ValidationError::new(path, Violation::IntegerOutOfRange)),
                None => Err(mismatch(path, &schema.kind, value)),
            },
            (Kind::Enum(allowed), Value::String(s)) => {
                if allowed.iter().any(|a| a == s) {
                    Ok(Document::String(s.clone()))
                } else {
                    Err(ValidationError::new(
                        path,
                        Violation::NotAllowed { value: s.clone() },
                    ))
                }
            }
            (Kind::Array(items), Value::Array(values)) => values
                .iter()
                .enumerate()
                .map(|(i, v)| self.node(v, items, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Document::Sequence),
            (Kind::Object(_), Value::Object(map)) => self.object(schema, map, path),
            (kind, value) => Err(mismatch(path, kind, value)),
        }
    }

    fn object(
        &self,
        schema: &SchemaNode,
        map: &Map<String, Value>,
        path: &str,
    ) -> Result<Document, ValidationError> {
        let mut out = Vec::with_capacity(schema.fields().len());

        for field in schema.fields() {
            let field_path = join_path(path, &field.name);
            match map.get(&field.name) {
                None | Some(Value::Null) if !field.required => {
                    out.push((field.name.clone(), Document::Null));
                }
                None => return Err(ValidationError::new(&field_path, Violation::MissingField)),
                Some(value) => {
                    out.push((field.name.clone(), self.node(value, field, &field_path)?));
                }
            }
        }

        if self.strict {
            if let Some(extra) = map.keys().find(|k| schema.field(k).is_none()) {
                return Err(ValidationError::new(
                    &join_path(path, extra),
                    Violation::UndeclaredField,
                ));
            }
        }

        Ok(Document::Mapping(out))
    }
}

fn mismatch(path: &str, expected: &Kind, found: &Value) -> ValidationError {
    ValidationError::new(
        path,
        Violation::TypeMismatch {
            expected: expected.type_name(),
            found: json_type(found),
        },
    )
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
