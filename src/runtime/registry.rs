use super::error::RegistryError;
use super::handler::{EndpointImplementation, MethodHandler};
use super::validation;
use crate::access::AccessRule;
use crate::openapi::{json_pointer, Operation, Schema};
use crate::parser::ParseResult;
use jsonschema::Validator;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// One declared parameter of a registered method.
#[derive(Clone)]
pub struct ParameterBinding {
    pub name: String,
    pub nullable: bool,
    pub schema: Value,
    pub validator: Arc<Validator>,
}

impl fmt::Debug for ParameterBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterBinding")
            .field("name", &self.name)
            .field("nullable", &self.nullable)
            .field("schema", &self.schema)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct RegisteredMethod {
    pub name: String,
    pub handler: MethodHandler,
    pub parameters: Vec<ParameterBinding>,
    pub access: AccessRule,
    /// The method declares a result that must not be `null`.
    pub non_null_result: bool,
}

#[derive(Debug, Clone)]
pub struct RegisteredEndpoint {
    pub name: String,
    pub class_name: String,
    methods: HashMap<String, RegisteredMethod>,
}

impl RegisteredEndpoint {
    /// Case-insensitive method lookup.
    pub fn method(&self, name: &str) -> Option<&RegisteredMethod> {
        self.methods.get(&name.to_ascii_lowercase())
    }

    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.values().map(|m| m.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Implemented endpoint methods, ready to be invoked.
///
/// Built once from a [`ParseResult`] and never mutated; reloads build a
/// new registry and swap it in.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    endpoints: HashMap<String, RegisteredEndpoint>,
}

impl EndpointRegistry {
    /// Wires `implementations` to the methods of `result`.
    ///
    /// Handlers for endpoints or methods absent from the document are
    /// rejected. Document methods without a handler are logged and answer
    /// 404. Methods whose names differ only in case cannot share one
    /// case-insensitive route and are rejected.
    pub fn build(
        result: &ParseResult,
        implementations: impl IntoIterator<Item = EndpointImplementation>,
    ) -> Result<Self, RegistryError> {
        let document = &result.document;
        let mut endpoints: HashMap<String, RegisteredEndpoint> = HashMap::new();

        for implementation in implementations {
            let key = implementation.name().to_ascii_lowercase();
            let endpoint = result
                .scan
                .endpoints()
                .iter()
                .find(|e| e.name.eq_ignore_ascii_case(implementation.name()))
                .ok_or_else(|| RegistryError::UnknownEndpoint(implementation.name().to_string()))?;
            if endpoints.contains_key(&key) {
                return Err(RegistryError::DuplicateImplementation(endpoint.name.clone()));
            }

            let mut operations: BTreeMap<String, (&str, &Operation)> = BTreeMap::new();
            for (path, item) in &document.paths {
                let Some(operation) = item.post.as_ref() else {
                    continue;
                };
                let Some((tag, method)) = path.trim_start_matches('/').split_once('/') else {
                    continue;
                };
                if tag != endpoint.name {
                    continue;
                }
                if let Some((previous, _)) =
                    operations.insert(method.to_ascii_lowercase(), (path.as_str(), operation))
                {
                    return Err(RegistryError::DuplicateMethod {
                        endpoint: endpoint.name.clone(),
                        first: previous.rsplit('/').next().unwrap_or(previous).to_string(),
                        second: method.to_string(),
                    });
                }
            }

            let mut methods = HashMap::new();
            for (method_name, handler) in implementation.methods() {
                let method_key = method_name.to_ascii_lowercase();
                let Some(&(path, operation)) = operations.get(&method_key) else {
                    return Err(RegistryError::UnknownMethod {
                        endpoint: endpoint.name.clone(),
                        method: method_name.to_string(),
                    });
                };
                let model = result
                    .associations
                    .method(&json_pointer(["paths", path, "post"]));
                let declaring = model.and_then(|m| result.scan.world().get(m.owner()));
                let access = model
                    .map(|m| AccessRule::effective(m, declaring, Some(&endpoint.class)))
                    .unwrap_or_default();
                let declared_names: Vec<String> = match model {
                    Some(m) => m.parameters().iter().map(|p| p.name().to_string()).collect(),
                    None => operation
                        .request_schema()
                        .map(|s| s.properties.keys().cloned().collect())
                        .unwrap_or_default(),
                };

                let parameters = declared_names
                    .iter()
                    .map(|name| bind_parameter(path, operation, name, &document.components.schemas))
                    .collect::<Result<Vec<_>, _>>()?;
                let non_null_result = operation
                    .response_schema()
                    .is_some_and(|schema| !schema.is_nullable());
                let name = model
                    .map(|m| m.name().to_string())
                    .unwrap_or_else(|| method_name.to_string());

                methods.insert(
                    method_key,
                    RegisteredMethod {
                        name,
                        handler: handler.clone(),
                        parameters,
                        access,
                        non_null_result,
                    },
                );
            }

            for (method_key, (path, _)) in &operations {
                if !methods.contains_key(method_key) {
                    warn!(path = %path, "endpoint method has no implementation");
                }
            }
            info!(
                endpoint = %endpoint.name,
                methods = methods.len(),
                "endpoint registered"
            );
            endpoints.insert(
                key,
                RegisteredEndpoint {
                    name: endpoint.name.clone(),
                    class_name: endpoint.class.name().to_string(),
                    methods,
                },
            );
        }

        Ok(Self { endpoints })
    }

    /// Case-insensitive endpoint lookup.
    pub fn endpoint(&self, name: &str) -> Option<&RegisteredEndpoint> {
        self.endpoints.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

fn bind_parameter(
    path: &str,
    operation: &Operation,
    name: &str,
    components: &BTreeMap<String, Schema>,
) -> Result<ParameterBinding, RegistryError> {
    let request = operation.request_schema();
    let schema = request
        .and_then(|s| s.properties.get(name))
        .cloned()
        .unwrap_or_else(Schema::any);
    let nullable = !request.is_some_and(|s| s.required.iter().any(|r| r == name));
    let location = format!("{path}#{name}");

    let json_schema = validation::to_json_schema(&schema, nullable, components).map_err(|e| {
        RegistryError::Schema {
            location: location.clone(),
            message: e.to_string(),
        }
    })?;
    let validator = validation::compile(&json_schema)
        .map_err(|message| RegistryError::Schema { location, message })?;
    Ok(ParameterBinding {
        name: name.to_string(),
        nullable,
        schema: json_schema,
        validator: Arc::new(validator),
    })
}
