//! JSON Schema rendering and parsing for `SchemaNode` trees.
//!
//! Rendering produces the `response_format.json_schema` payload sent to the
//! completion endpoint. Parsing accepts the same subset back, so callers can
//! hand the tool a schema file instead of using a built-in one.
//!
//! Supported subset: `string` (optionally with `enum`), `integer`, `array`
//! with `items`, `object` with `properties`/`required`, and nullable object
//! properties written as `["<type>", "null"]`. Array items cannot be nullable.

use serde_json::{json, Map, Value};

use super::{join_path, Kind, SchemaError, SchemaNode};

/// Renders the `{"name", "schema", "strict"}` object the endpoint expects.
pub fn to_response_format(schema: &SchemaNode, strict: bool) -> Value {
    json!({
        "name": schema.name,
        "schema": to_json_schema(schema, strict),
        "strict": strict,
    })
}

/// Renders a schema tree as JSON Schema.
///
/// In strict mode every property is listed under `required` and optional
/// fields are expressed as nullable instead, and objects reject undeclared
/// properties.
pub fn to_json_schema(schema: &SchemaNode, strict: bool) -> Value {
    render(schema, strict, false)
}

fn render(node: &SchemaNode, strict: bool, nullable: bool) -> Value {
    let mut out = Map::new();
    let type_name = node.kind.type_name();
    out.insert(
        "type".to_string(),
        if nullable {
            json!([type_name, "null"])
        } else {
            json!(type_name)
        },
    );
    if let Some(description) = &node.description {
        out.insert("description".to_string(), json!(description));
    }

    match &node.kind {
        Kind::String | Kind::Integer => {}
        Kind::Enum(values) => {
            let mut allowed: Vec<Value> = values.iter().map(|v| json!(v)).collect();
            if nullable {
                allowed.push(Value::Null);
            }
            out.insert("enum".to_string(), Value::Array(allowed));
        }
        Kind::Array(items) => {
            out.insert("items".to_string(), render(items, strict, false));
        }
        Kind::Object(fields) => {
            let properties: Map<String, Value> = fields
                .iter()
                .map(|f| (f.name.clone(), render(f, strict, strict && !f.required)))
                .collect();
            let required: Vec<&str> = fields
                .iter()
                .filter(|f| strict || f.required)
                .map(|f| f.name.as_str())
                .collect();
            out.insert("properties".to_string(), Value::Object(properties));
            out.insert("required".to_string(), json!(required));
            if strict {
                out.insert("additionalProperties".to_string(), Value::Bool(false));
            }
        }
    }

    Value::Object(out)
}

/// Parses a JSON Schema document into a checked `SchemaNode` tree.
///
/// Accepts a bare schema, the `{"name", "schema", "strict"}` wrapper, or a
/// full `{"type": "json_schema", "json_schema": {...}}` response format.
/// `fallback_name` is used when the document does not name itself.
pub fn from_json_schema(fallback_name: &str, value: &Value) -> Result<SchemaNode, SchemaError> {
    let value = value.get("json_schema").unwrap_or(value);
    let (name, schema) = match value.get("schema") {
        Some(schema) if schema.is_object() => (
            value.get("name").and_then(Value::as_str).unwrap_or(fallback_name),
            schema,
        ),
        _ => (
            value.get("title").and_then(Value::as_str).unwrap_or(fallback_name),
            value,
        ),
    };

    let node = parse_node(name, schema, "$")?;
    if !matches!(node.kind, Kind::Object(_)) {
        return Err(unsupported("$", "top-level schema must be an object"));
    }
    node.check()?;
    Ok(node)
}

fn parse_node(name: &str, value: &Value, path: &str) -> Result<SchemaNode, SchemaError> {
    let obj = value
        .as_object()
        .ok_or_else(|| unsupported(path, "schema must be a JSON object"))?;

    let (type_name, nullable) = parse_type(obj, path)?;
    let nullable = nullable
        || obj
            .get("enum")
            .and_then(Value::as_array)
            .is_some_and(|values| values.iter().any(Value::is_null));
    let kind = match type_name {
        "string" => match obj.get("enum") {
            Some(values) => Kind::Enum(parse_enum(values, path)?),
            None => Kind::String,
        },
        "integer" => Kind::Integer,
        "array" => {
            let items = obj
                .get("items")
                .ok_or_else(|| unsupported(path, "array without 'items'"))?;
            let item_path = format!("{path}[]");
            let items = parse_node("item", items, &item_path)?;
            if !items.required {
                return Err(unsupported(&item_path, "nullable array items"));
            }
            Kind::Array(Box::new(items))
        }
        "object" => Kind::Object(parse_properties(obj, path)?),
        other => return Err(unsupported(path, &format!("type '{other}'"))),
    };

    Ok(SchemaNode {
        name: name.to_string(),
        description: obj
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        required: !nullable,
        kind,
    })
}

fn parse_type<'a>(obj: &'a Map<String, Value>, path: &str) -> Result<(&'a str, bool), SchemaError> {
    match obj.get("type") {
        Some(Value::String(t)) => Ok((t.as_str(), false)),
        Some(Value::Array(types)) => {
            let nullable = types.iter().any(|t| t.as_str() == Some("null"));
            let concrete: Vec<&str> = types
                .iter()
                .filter_map(Value::as_str)
                .filter(|t| *t != "null")
                .collect();
            match concrete.as_slice() {
                [single] => Ok((*single, nullable)),
                _ => Err(unsupported(path, "union types other than [T, \"null\"]")),
            }
        }
        Some(_) => Err(unsupported(path, "'type' must be a string or array")),
        None if obj.contains_key("enum") => Ok(("string", false)),
        None => Err(unsupported(path, "missing 'type'")),
    }
}

fn parse_enum(values: &Value, path: &str) -> Result<Vec<String>, SchemaError> {
    let values = values
        .as_array()
        .ok_or_else(|| unsupported(path, "'enum' must be an array"))?;
    values
        .iter()
        .filter(|v| !v.is_null())
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| unsupported(path, "non-string enum value"))
        })
        .collect()
}

fn parse_properties(
    obj: &Map<String, Value>,
    path: &str,
) -> Result<Vec<SchemaNode>, SchemaError> {
    let properties = obj
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| unsupported(path, "object without 'properties'"))?;

    let required: Vec<&str> = match obj.get("required") {
        None => Vec::new(),
        Some(Value::Array(names)) => names
            .iter()
            .map(|n| {
                n.as_str()
                    .ok_or_else(|| unsupported(path, "non-string entry in 'required'"))
            })
            .collect::<Result<_, _>>()?,
        Some(_) => return Err(unsupported(path, "'required' must be an array")),
    };

    if let Some(unknown) = required.iter().find(|r| !properties.contains_key(**r)) {
        return Err(SchemaError::UnknownRequired {
            path: path.to_string(),
            name: unknown.to_string(),
        });
    }

    properties
        .iter()
        .map(|(name, schema)| {
            let mut field = parse_node(name, schema, &join_path(path, name))?;
            field.required = field.required && required.contains(&name.as_str());
            Ok(field)
        })
        .collect()
}

fn unsupported(path: &str, detail: &str) -> SchemaError {
    SchemaError::Unsupported {
        path: path.to_string(),
        detail: detail.to_string(),
    }
}
