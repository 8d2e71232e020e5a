use super::error::{EndpointError, ValidationErrorData};
use super::handler::CallContext;
use super::ids::InvocationId;
use super::registry::{EndpointRegistry, RegisteredMethod};
use super::validation;
use crate::access::{AccessDenied, Principal};
use http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

/// Inline capacity for response headers.
pub const MAX_INLINE_HEADERS: usize = 4;

pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Response of one endpoint call, independent of the HTTP server.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointResponse {
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    pub body: Value,
}

impl EndpointResponse {
    pub fn json(status: StatusCode, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status: status.as_u16(),
            headers,
            body,
        }
    }

    pub fn error(error: &EndpointError) -> Self {
        Self::json(error.status(), error.to_body())
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Calls endpoint methods through a registry.
pub struct EndpointInvoker<'a> {
    registry: &'a EndpointRegistry,
}

impl<'a> EndpointInvoker<'a> {
    pub fn new(registry: &'a EndpointRegistry) -> Self {
        Self { registry }
    }

    /// Looks up, authorizes, binds, validates and calls one method.
    pub fn invoke(
        &self,
        endpoint: &str,
        method: &str,
        body: Value,
        principal: Option<&Principal>,
    ) -> EndpointResponse {
        let invocation_id = InvocationId::new();
        let started = Instant::now();
        let outcome = self.invoke_inner(invocation_id, endpoint, method, body, principal);
        let elapsed_us = started.elapsed().as_micros() as u64;

        match outcome {
            Ok(value) => {
                debug!(%invocation_id, endpoint, method, elapsed_us, "endpoint call succeeded");
                EndpointResponse::json(StatusCode::OK, value)
            }
            Err(err) => {
                match &err {
                    EndpointError::Internal(detail) => {
                        error!(%invocation_id, endpoint, method, detail = %detail, "endpoint call failed");
                    }
                    other => {
                        warn!(
                            %invocation_id,
                            endpoint,
                            method,
                            status = other.status().as_u16(),
                            error = %other,
                            "endpoint call rejected"
                        );
                    }
                }
                let mut response = EndpointResponse::error(&err);
                response.set_header("x-invocation-id", invocation_id.to_string());
                response
            }
        }
    }

    fn invoke_inner(
        &self,
        invocation_id: InvocationId,
        endpoint_name: &str,
        method_name: &str,
        body: Value,
        principal: Option<&Principal>,
    ) -> Result<Value, EndpointError> {
        let endpoint = self.registry.endpoint(endpoint_name).ok_or_else(|| {
            EndpointError::NotFound(format!("Endpoint '{endpoint_name}' not found"))
        })?;
        let method = endpoint.method(method_name).ok_or_else(|| {
            EndpointError::NotFound(format!(
                "Method '{method_name}' not found in endpoint '{}'",
                endpoint.name
            ))
        })?;

        method.access.check(principal).map_err(|denied| match denied {
            AccessDenied::Unauthenticated => EndpointError::Unauthorized,
            AccessDenied::Forbidden => EndpointError::Forbidden,
        })?;

        let arguments = bind_arguments(method, body)?;
        validate_arguments(&endpoint.name, method, &arguments)?;

        let ctx = CallContext {
            invocation_id,
            endpoint: endpoint.name.clone(),
            method: method.name.clone(),
            principal: principal.cloned(),
        };
        let result = catch_unwind(AssertUnwindSafe(|| method.handler.call(&ctx, arguments)))
            .map_err(|panic| EndpointError::Internal(panic_message(panic.as_ref())))??;

        if result.is_null() && method.non_null_result {
            return Err(EndpointError::Internal(format!(
                "method '{}.{}' returned null but declares a non-null result",
                endpoint.name, method.name
            )));
        }
        Ok(result)
    }
}

/// Matches the body's entries to declared parameters: by name when every
/// parameter name is present, otherwise by body order.
fn bind_arguments(method: &RegisteredMethod, body: Value) -> Result<Vec<Value>, EndpointError> {
    let mut entries: Map<String, Value> = match body {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        other => {
            return Err(EndpointError::bad_request(format!(
                "request body must be a JSON object, got {}",
                json_type(&other)
            )))
        }
    };
    if entries.len() != method.parameters.len() {
        return Err(EndpointError::bad_request(format!(
            "Incorrect number of parameters for method '{}': expected {}, got {}",
            method.name,
            method.parameters.len(),
            entries.len()
        )));
    }

    let by_name = method
        .parameters
        .iter()
        .all(|p| entries.contains_key(&p.name));
    if by_name {
        Ok(method
            .parameters
            .iter()
            .map(|p| entries.remove(&p.name).unwrap_or(Value::Null))
            .collect())
    } else {
        Ok(entries.into_iter().map(|(_, value)| value).collect())
    }
}

fn validate_arguments(
    endpoint: &str,
    method: &RegisteredMethod,
    arguments: &[Value],
) -> Result<(), EndpointError> {
    let validation: Vec<ValidationErrorData> = method
        .parameters
        .iter()
        .zip(arguments)
        .flat_map(|(parameter, value)| {
            validation::violations(&parameter.validator, value)
                .into_iter()
                .map(|message| ValidationErrorData {
                    parameter_name: parameter.name.clone(),
                    message,
                })
        })
        .collect();
    if validation.is_empty() {
        Ok(())
    } else {
        Err(EndpointError::BadRequest {
            message: format!(
                "Validation error in endpoint '{endpoint}' method '{}'",
                method.name
            ),
            validation,
        })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("handler panicked: {message}")
    } else {
        "handler panicked".to_string()
    }
}
