use super::error::EndpointError;
use super::ids::InvocationId;
use crate::access::Principal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// What a handler knows about the call it serves.
#[derive(Debug, Clone)]
pub struct CallContext {
    pub invocation_id: InvocationId,
    pub endpoint: String,
    pub method: String,
    pub principal: Option<Principal>,
}

type HandlerFn = dyn Fn(&CallContext, Vec<Value>) -> Result<Value, EndpointError> + Send + Sync;

/// Implementation of one endpoint method.
///
/// Receives the bound arguments in declaration order, already validated
/// against their schemas.
#[derive(Clone)]
pub struct MethodHandler(Arc<HandlerFn>);

impl MethodHandler {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&CallContext, Vec<Value>) -> Result<Value, EndpointError> + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    /// Wraps a handler taking its arguments as a tuple.
    ///
    /// ```rust,ignore
    /// MethodHandler::typed(|_ctx, (name,): (String,)| Ok(format!("Hello, {name}")))
    /// ```
    ///
    /// Arguments that do not deserialize into the tuple are a bad request.
    pub fn typed<A, R, F>(handler: F) -> Self
    where
        A: DeserializeOwned,
        R: Serialize,
        F: Fn(&CallContext, A) -> Result<R, EndpointError> + Send + Sync + 'static,
    {
        Self::new(move |ctx, args| {
            let input = if args.is_empty() {
                Value::Null
            } else {
                Value::Array(args)
            };
            let arguments: A = serde_json::from_value(input).map_err(|e| {
                EndpointError::bad_request(format!(
                    "arguments of '{}.{}' do not match: {e}",
                    ctx.endpoint, ctx.method
                ))
            })?;
            let result = handler(ctx, arguments)?;
            serde_json::to_value(result)
                .map_err(|e| EndpointError::Internal(format!("failed to serialize result: {e}")))
        })
    }

    pub fn call(&self, ctx: &CallContext, args: Vec<Value>) -> Result<Value, EndpointError> {
        (self.0)(ctx, args)
    }
}

impl fmt::Debug for MethodHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MethodHandler")
    }
}

/// Handlers for the methods of one endpoint, keyed by method name.
#[derive(Debug, Clone)]
pub struct EndpointImplementation {
    name: String,
    methods: BTreeMap<String, MethodHandler>,
}

impl EndpointImplementation {
    /// `name` is the published endpoint name, matched case-insensitively.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: BTreeMap::new(),
        }
    }

    pub fn method(mut self, name: impl Into<String>, handler: MethodHandler) -> Self {
        self.methods.insert(name.into(), handler);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> impl Iterator<Item = (&str, &MethodHandler)> {
        self.methods.iter().map(|(name, handler)| (name.as_str(), handler))
    }
}
