//! Recursive description of a structured document.
//!
//! A schema is a tree of `SchemaNode`s. Leaves are strings, integers or enums;
//! containers are arrays (one item schema) and objects (ordered, uniquely named
//! children). The tree is built once at startup and only ever read afterwards.

use std::collections::HashSet;

use thiserror::Error;

pub mod catalog;
pub mod json_schema;

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("{path}: field name must not be empty")]
    EmptyName { path: String },

    #[error("{path}: duplicate field '{name}'")]
    DuplicateField { path: String, name: String },

    #[error("{path}: enum must declare at least one value")]
    EmptyEnum { path: String },

    #[error("{path}: duplicate enum value '{value}'")]
    DuplicateEnumValue { path: String, value: String },

    #[error("{path}: required field '{name}' is not declared in properties")]
    UnknownRequired { path: String, name: String },

    #[error("{path}: unsupported schema construct: {detail}")]
    Unsupported { path: String, detail: String },
}

/// The shape of a single schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    String,
    Integer,
    /// A string restricted to the listed values.
    Enum(Vec<String>),
    /// A homogeneous sequence; every item must satisfy the boxed schema.
    Array(Box<SchemaNode>),
    /// A mapping with ordered, uniquely named fields.
    Object(Vec<SchemaNode>),
}

impl Kind {
    /// The JSON type name used in schema payloads and diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Kind::String | Kind::Enum(_) => "string",
            Kind::Integer => "integer",
            Kind::Array(_) => "array",
            Kind::Object(_) => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub name: String,
    pub description: Option<String>,
    pub required: bool,
    pub kind: Kind,
}

impl SchemaNode {
    fn new(name: &str, kind: Kind) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            required: true,
            kind,
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, Kind::String)
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, Kind::Integer)
    }

    pub fn enumeration(name: &str, values: &[&str]) -> Self {
        Self::new(
            name,
            Kind::Enum(values.iter().map(|v| v.to_string()).collect()),
        )
    }

    pub fn array(name: &str, items: SchemaNode) -> Self {
        Self::new(name, Kind::Array(Box::new(items)))
    }

    pub fn object(name: &str, fields: Vec<SchemaNode>) -> Self {
        Self::new(name, Kind::Object(fields))
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Marks the node as optional within its parent object.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Marks every object field in the tree as required.
    pub fn require_all(mut self) -> Self {
        self.required = true;
        self.kind = match self.kind {
            Kind::Object(fields) => {
                Kind::Object(fields.into_iter().map(SchemaNode::require_all).collect())
            }
            Kind::Array(items) => Kind::Array(Box::new(items.require_all())),
            other => other,
        };
        self
    }

    /// Object fields, or an empty slice for every other kind.
    pub fn fields(&self) -> &[SchemaNode] {
        match &self.kind {
            Kind::Object(fields) => fields,
            _ => &[],
        }
    }

    pub fn field(&self, name: &str) -> Option<&SchemaNode> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Checks the structural invariants of the whole tree.
    ///
    /// - every node has a non-empty name
    /// - object fields are uniquely named
    /// - enums declare at least one value and no value twice
    pub fn check(&self) -> Result<(), SchemaError> {
        check_node(self, "$")
    }
}

fn check_node(node: &SchemaNode, path: &str) -> Result<(), SchemaError> {
    if node.name.trim().is_empty() {
        return Err(SchemaError::EmptyName {
            path: path.to_string(),
        });
    }

    match &node.kind {
        Kind::String | Kind::Integer => Ok(()),
        Kind::Enum(values) => {
            if values.is_empty() {
                return Err(SchemaError::EmptyEnum {
                    path: path.to_string(),
                });
            }
            let mut seen = HashSet::new();
            for value in values {
                if !seen.insert(value.as_str()) {
                    return Err(SchemaError::DuplicateEnumValue {
                        path: path.to_string(),
                        value: value.clone(),
                    });
                }
            }
            Ok(())
        }
        Kind::Array(items) => check_node(items, &format!("{path}[]")),
        Kind::Object(fields) => {
            let mut seen = HashSet::new();
            for field in fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(SchemaError::DuplicateField {
                        path: path.to_string(),
                        name: field.name.clone(),
                    });
                }
                check_node(field, &join_path(path, &field.name))?;
            }
            Ok(())
        }
    }
}

pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if parent == "$" {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_default_to_required() {
        let node = SchemaNode::string("name").describe("Full name");
        assert!(node.required);
        assert_eq!(node.description.as_deref(), Some("Full name"));
        assert!(!SchemaNode::string("github").optional().required);
    }

    #[test]
    fn test_check_accepts_deep_nesting() {
        let schema = SchemaNode::object(
            "root",
            vec![SchemaNode::array(
                "a",
                SchemaNode::object(
                    "item",
                    vec![SchemaNode::array(
                        "b",
                        SchemaNode::object(
                            "item",
                            vec![SchemaNode::enumeration("c", &["x", "y"])],
                        ),
                    )],
                ),
            )],
        );
        assert!(schema.check().is_ok());
    }

    #[test]
    fn test_check_rejects_duplicate_fields() {
        let schema = SchemaNode::object(
            "root",
            vec![SchemaNode::string("email"), SchemaNode::integer("email")],
        );
        assert_eq!(
            schema.check(),
            Err(SchemaError::DuplicateField {
                path: "$".to_string(),
                name: "email".to_string()
            })
        );
    }

    #[test]
    fn test_check_rejects_duplicate_fields_in_array_items() {
        let schema = SchemaNode::object(
            "root",
            vec![SchemaNode::array(
                "jobs",
                SchemaNode::object(
                    "job",
                    vec![SchemaNode::string("title"), SchemaNode::string("title")],
                ),
            )],
        );
        let err = schema.check().unwrap_err();
        assert!(err.to_string().starts_with("jobs[]: duplicate field 'title'"));
    }

    #[test]
    fn test_check_rejects_empty_enum() {
        let schema = SchemaNode::object("root", vec![SchemaNode::enumeration("level", &[])]);
        assert_eq!(
            schema.check(),
            Err(SchemaError::EmptyEnum {
                path: "level".to_string()
            })
        );
    }

    #[test]
    fn test_check_rejects_duplicate_enum_value() {
        let node = SchemaNode::enumeration("level", &["Mid", "Mid"]);
        assert!(matches!(
            node.check(),
            Err(SchemaError::DuplicateEnumValue { .. })
        ));
    }

    #[test]
    fn test_check_rejects_blank_name() {
        let schema = SchemaNode::object("root", vec![SchemaNode::string(" ")]);
        assert!(matches!(schema.check(), Err(SchemaError::EmptyName { .. })));
    }

    #[test]
    fn test_require_all_is_recursive() {
        let schema = SchemaNode::object(
            "root",
            vec![
                SchemaNode::string("github").optional(),
                SchemaNode::array(
                    "jobs",
                    SchemaNode::object("job", vec![SchemaNode::string("url").optional()]),
                ),
            ],
        )
        .require_all();

        assert!(schema.field("github").unwrap().required);
        let Kind::Array(items) = &schema.field("jobs").unwrap().kind else {
            panic!("jobs should be an array");
        };
        assert!(items.field("url").unwrap().required);
    }

    #[test]
    fn test_fields_empty_for_scalars() {
        assert!(SchemaNode::integer("n").fields().is_empty());
        assert_eq!(Kind::Enum(vec!["a".into()]).type_name(), "string");
    }
}
