//! OpenAPI 3.0 schemas to JSON Schema.
//!
//! Generated schemas use OpenAPI dialect: `nullable`, refs into
//! `#/components/schemas` and `x-validation-constraints`. Validators are
//! compiled from a JSON Schema rendition where `nullable` becomes a
//! `null` alternative, component refs point into `$defs` and sign
//! constraints become exclusive bounds.

use crate::openapi::{Schema, COMPONENTS_SCHEMAS_PREFIX, X_VALIDATION_CONSTRAINTS};
use jsonschema::Validator;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};

const DEFS_PREFIX: &str = "#/$defs/";

/// Keywords whose value is a single subschema.
const SCHEMA_KEYWORDS: &[&str] = &["items", "additionalProperties", "not"];
/// Keywords whose value is a list of subschemas.
const SCHEMA_LIST_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf"];

/// JSON Schema for a value of `schema`, with every component it refers to
/// (transitively) under `$defs`.
pub fn to_json_schema(
    schema: &Schema,
    nullable: bool,
    components: &BTreeMap<String, Schema>,
) -> serde_json::Result<Value> {
    let mut root = convert(serde_json::to_value(schema)?);
    if nullable {
        root = allow_null(root);
    }

    let mut defs = Map::new();
    let mut pending: Vec<String> = referenced(&root).into_iter().collect();
    let mut seen: BTreeSet<String> = pending.iter().cloned().collect();
    while let Some(name) = pending.pop() {
        let Some(component) = components.get(&name) else {
            continue;
        };
        let converted = convert(serde_json::to_value(component)?);
        for next in referenced(&converted) {
            if seen.insert(next.clone()) {
                pending.push(next);
            }
        }
        defs.insert(name, converted);
    }

    if !defs.is_empty() {
        if let Value::Object(map) = &mut root {
            map.insert("$defs".to_string(), Value::Object(defs));
        } else {
            root = json!({ "allOf": [root], "$defs": defs });
        }
    }
    Ok(root)
}

/// Compiles a JSON Schema with format assertions enabled.
pub fn compile(schema: &Value) -> Result<Validator, String> {
    jsonschema::options()
        .should_validate_formats(true)
        .build(schema)
        .map_err(|e| e.to_string())
}

/// Messages of every violation, in validator order.
pub fn violations(validator: &Validator, value: &Value) -> Vec<String> {
    validator.iter_errors(value).map(|e| e.to_string()).collect()
}

fn convert(value: Value) -> Value {
    let Value::Object(mut map) = value else {
        return value;
    };

    if let Some(Value::String(reference)) = map.get("$ref") {
        if let Some(name) = reference.strip_prefix(COMPONENTS_SCHEMAS_PREFIX) {
            let target = format!("{DEFS_PREFIX}{}", escape(name));
            map.insert("$ref".to_string(), Value::String(target));
        }
    }

    for keyword in SCHEMA_KEYWORDS {
        if let Some(child) = map.remove(*keyword) {
            map.insert((*keyword).to_string(), convert(child));
        }
    }
    for keyword in SCHEMA_LIST_KEYWORDS {
        if let Some(Value::Array(children)) = map.remove(*keyword) {
            let converted = children.into_iter().map(convert).collect();
            map.insert((*keyword).to_string(), Value::Array(converted));
        }
    }
    if let Some(Value::Object(properties)) = map.remove("properties") {
        let converted = properties
            .into_iter()
            .map(|(name, child)| (name, convert(child)))
            .collect();
        map.insert("properties".to_string(), Value::Object(converted));
    }

    if let Some(Value::Array(constraints)) = map.get(X_VALIDATION_CONSTRAINTS) {
        let names: Vec<String> = constraints
            .iter()
            .filter_map(|c| c.get("simpleName").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        for name in names {
            match name.as_str() {
                "Positive" => {
                    map.insert("exclusiveMinimum".to_string(), json!(0));
                }
                "Negative" => {
                    map.insert("exclusiveMaximum".to_string(), json!(0));
                }
                _ => {}
            }
        }
    }
    map.retain(|key, _| !key.starts_with("x-"));

    // The any schema accepts any value.
    if map.len() == 1 && map.get("type") == Some(&json!("object")) {
        map.clear();
    }

    let nullable = matches!(map.remove("nullable"), Some(Value::Bool(true)));
    let converted = Value::Object(map);
    if nullable {
        allow_null(converted)
    } else {
        converted
    }
}

fn allow_null(schema: Value) -> Value {
    let Value::Object(mut map) = schema else {
        return schema;
    };
    if map.is_empty() {
        return Value::Object(map);
    }
    match map.get("type").cloned() {
        Some(Value::String(single)) if map.get("enum").is_none() && !map.contains_key("$ref") => {
            map.insert("type".to_string(), json!([single, "null"]));
            Value::Object(map)
        }
        _ => json!({ "anyOf": [{ "type": "null" }, Value::Object(map)] }),
    }
}

/// Component names a converted schema refers to.
fn referenced(value: &Value) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    collect_refs(value, &mut names);
    names
}

fn collect_refs(value: &Value, names: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "$ref" {
                    if let Some(name) = child.as_str().and_then(|r| r.strip_prefix(DEFS_PREFIX)) {
                        names.insert(unescape(name));
                    }
                } else {
                    collect_refs(child, names);
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_refs(item, names)),
        _ => {}
    }
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
