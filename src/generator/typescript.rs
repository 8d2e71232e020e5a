use crate::openapi::{OpenApiDocument, Schema, SchemaType, X_TYPE_ARGUMENTS, X_TYPE_VARIABLE};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Serialize)]
pub(crate) struct ModelView {
    pub name: String,
    pub kind: &'static str,
    pub extends: Option<String>,
    pub type_params: Vec<String>,
    pub properties: Vec<PropertyView>,
    pub values: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PropertyView {
    pub name: String,
    pub ty: String,
    pub optional: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct EndpointView {
    pub endpoint: String,
    pub imports: Vec<String>,
    pub methods: Vec<MethodView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MethodView {
    pub name: String,
    pub params: Vec<PropertyView>,
    pub result: String,
}

/// TypeScript names for component schemas: the simple class name, or
/// the underscored qualified name when two simple names collide.
pub(crate) struct TypeNames(BTreeMap<String, String>);

impl TypeNames {
    pub fn new(document: &OpenApiDocument) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for name in document.components.schemas.keys() {
            *counts.entry(simple(name)).or_default() += 1;
        }
        let names = document
            .components
            .schemas
            .keys()
            .map(|name| {
                let short = simple(name);
                let ts = if counts.get(short).copied().unwrap_or_default() > 1 {
                    name.replace(['.', '$'], "_")
                } else {
                    short.replace('$', "_")
                };
                (name.clone(), ts)
            })
            .collect();
        Self(names)
    }

    pub fn get(&self, component: &str) -> String {
        self.0
            .get(component)
            .cloned()
            .unwrap_or_else(|| simple(component).to_string())
    }
}

fn simple(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Renders a schema as a TypeScript type; components it names are added
/// to `imports`.
pub(crate) fn ts_type(schema: &Schema, names: &TypeNames, imports: &mut BTreeSet<String>) -> String {
    let base = base_type(schema, names, imports);
    if schema.is_nullable() {
        format!("{base} | undefined")
    } else {
        base
    }
}

fn base_type(schema: &Schema, names: &TypeNames, imports: &mut BTreeSet<String>) -> String {
    if let Some(component) = schema.referenced_component() {
        let name = names.get(component);
        imports.insert(name.clone());
        let arguments = type_arguments(schema, names, imports);
        return if arguments.is_empty() {
            name
        } else {
            format!("{name}<{}>", arguments.join(", "))
        };
    }
    if let [single] = schema.any_of.as_slice() {
        return base_type(single, names, imports);
    }
    if let Some(Value::String(variable)) = schema.extensions.get(X_TYPE_VARIABLE) {
        return variable.clone();
    }
    match schema.schema_type {
        Some(SchemaType::String) if !schema.enum_values.is_empty() => schema
            .enum_values
            .iter()
            .filter_map(Value::as_str)
            .map(|v| format!("'{v}'"))
            .collect::<Vec<_>>()
            .join(" | "),
        Some(SchemaType::String) => "string".to_string(),
        Some(SchemaType::Integer | SchemaType::Number) => "number".to_string(),
        Some(SchemaType::Boolean) => "boolean".to_string(),
        Some(SchemaType::Array) => match &schema.items {
            Some(items) => format!("Array<{}>", ts_type(items, names, imports)),
            None => "Array<unknown>".to_string(),
        },
        Some(SchemaType::Object) => match &schema.additional_properties {
            Some(values) => format!("Record<string, {}>", ts_type(values, names, imports)),
            None => "unknown".to_string(),
        },
        None => "unknown".to_string(),
    }
}

fn type_arguments(schema: &Schema, names: &TypeNames, imports: &mut BTreeSet<String>) -> Vec<String> {
    let Some(Value::Array(arguments)) = schema
        .extensions
        .get(X_TYPE_ARGUMENTS)
        .and_then(|v| v.get("allOf"))
    else {
        return Vec::new();
    };
    arguments
        .iter()
        .filter_map(|argument| serde_json::from_value::<Schema>(argument.clone()).ok())
        .map(|argument| ts_type(&argument, names, imports))
        .collect()
}

/// Type variable names in order of first use.
fn type_variables(schema: &Schema, out: &mut Vec<String>) {
    if let Some(Value::String(variable)) = schema.extensions.get(X_TYPE_VARIABLE) {
        if !out.contains(variable) {
            out.push(variable.clone());
        }
    }
    for child in schema
        .items
        .iter()
        .map(|b| b.as_ref())
        .chain(schema.additional_properties.iter().map(|b| b.as_ref()))
        .chain(schema.properties.values())
        .chain(schema.all_of.iter())
        .chain(schema.any_of.iter())
    {
        type_variables(child, out);
    }
}

pub(crate) fn model_views(document: &OpenApiDocument, names: &TypeNames) -> Vec<ModelView> {
    let mut imports = BTreeSet::new();
    document
        .components
        .schemas
        .iter()
        .map(|(component, schema)| {
            let name = names.get(component);
            if !schema.enum_values.is_empty() {
                return ModelView {
                    name,
                    kind: "enum",
                    extends: None,
                    type_params: Vec::new(),
                    properties: Vec::new(),
                    values: schema
                        .enum_values
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                };
            }

            let (extends, own) = match schema.all_of.as_slice() {
                [parent, own] if parent.reference.is_some() => {
                    (Some(ts_type(parent, names, &mut imports)), own)
                }
                _ => (None, schema),
            };
            let mut type_params = Vec::new();
            type_variables(own, &mut type_params);
            let properties = own
                .properties
                .iter()
                .map(|(property, child)| PropertyView {
                    name: property.clone(),
                    ty: ts_type(child, names, &mut imports),
                    optional: !own.required.contains(property),
                })
                .collect();
            ModelView {
                name,
                kind: "interface",
                extends,
                type_params,
                properties,
                values: Vec::new(),
            }
        })
        .collect()
}

pub(crate) fn endpoint_views(document: &OpenApiDocument, names: &TypeNames) -> Vec<EndpointView> {
    let mut views: BTreeMap<String, EndpointView> = document
        .tags
        .iter()
        .map(|tag| {
            (
                tag.name.clone(),
                EndpointView {
                    endpoint: tag.name.clone(),
                    imports: Vec::new(),
                    methods: Vec::new(),
                },
            )
        })
        .collect();
    let mut imports: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for (path, item) in &document.paths {
        let Some(operation) = &item.post else {
            continue;
        };
        let Some((endpoint, method)) = path.trim_start_matches('/').split_once('/') else {
            continue;
        };
        let used = imports.entry(endpoint.to_string()).or_default();
        let params = operation
            .request_schema()
            .map(|request| {
                request
                    .properties
                    .iter()
                    .map(|(name, schema)| {
                        let mut ty = ts_type(schema, names, used);
                        if !request.required.contains(name) {
                            ty.push_str(" | undefined");
                        }
                        PropertyView {
                            name: name.clone(),
                            ty,
                            optional: false,
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        let result = operation
            .response_schema()
            .map(|schema| ts_type(schema, names, used))
            .unwrap_or_else(|| "void".to_string());

        views
            .entry(endpoint.to_string())
            .or_insert_with(|| EndpointView {
                endpoint: endpoint.to_string(),
                imports: Vec::new(),
                methods: Vec::new(),
            })
            .methods
            .push(MethodView {
                name: method.to_string(),
                params,
                result,
            });
    }

    for (endpoint, used) in imports {
        if let Some(view) = views.get_mut(&endpoint) {
            view.imports = used.into_iter().collect();
        }
    }
    views.into_values().filter(|v| !v.methods.is_empty()).collect()
}
