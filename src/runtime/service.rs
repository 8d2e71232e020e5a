use super::error::EndpointError;
use super::invoker::{EndpointInvoker, EndpointResponse};
use super::registry::EndpointRegistry;
use crate::access::Principal;
use arc_swap::ArcSwap;
use http::Method;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

#[allow(clippy::expect_used)]
static CALL_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/([A-Za-z_$][A-Za-z0-9_$]*)/([A-Za-z_$][A-Za-z0-9_$]*)/?$")
        .expect("call path regex should be valid")
});

/// Entry point for an HTTP layer: `POST /{prefix}/{endpoint}/{method}`.
///
/// The registry sits behind an [`ArcSwap`] so request threads read it
/// without locking while [`EndpointService::reload`] publishes a new one.
#[derive(Clone)]
pub struct EndpointService {
    prefix: String,
    registry: Arc<ArcSwap<EndpointRegistry>>,
}

impl EndpointService {
    pub fn new(prefix: &str, registry: EndpointRegistry) -> Self {
        Self {
            prefix: prefix.trim_matches('/').to_string(),
            registry: Arc::new(ArcSwap::from_pointee(registry)),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Current registry snapshot.
    pub fn registry(&self) -> Arc<EndpointRegistry> {
        self.registry.load_full()
    }

    /// Publishes a fully built registry; calls in flight finish on the old
    /// one.
    pub fn reload(&self, registry: EndpointRegistry) {
        info!(endpoints = registry.len(), "endpoint registry reloaded");
        self.registry.store(Arc::new(registry));
    }

    /// Serves one request. `body` is the raw request body.
    pub fn handle(
        &self,
        method: &Method,
        path: &str,
        body: &[u8],
        principal: Option<&Principal>,
    ) -> EndpointResponse {
        let Some((endpoint, method_name)) = self.route(path) else {
            return EndpointResponse::error(&EndpointError::NotFound(format!(
                "No endpoint at '{path}'"
            )));
        };
        if *method != Method::POST {
            let mut response = EndpointResponse::error(&EndpointError::MethodNotAllowed(format!(
                "Endpoint methods only accept POST, got {method}"
            )));
            response.set_header("allow", "POST".to_string());
            return response;
        }

        let body = if body.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            match serde_json::from_slice::<Value>(body) {
                Ok(value) => value,
                Err(e) => {
                    return EndpointResponse::error(&EndpointError::bad_request(format!(
                        "request body is not valid JSON: {e}"
                    )))
                }
            }
        };

        let registry = self.registry.load();
        EndpointInvoker::new(&registry).invoke(endpoint, method_name, body, principal)
    }

    /// Splits `/{prefix}/{endpoint}/{method}`, or `/{endpoint}/{method}`
    /// when the prefix is empty.
    fn route<'p>(&self, path: &'p str) -> Option<(&'p str, &'p str)> {
        let path = path.split('?').next().unwrap_or(path);
        let rest = if self.prefix.is_empty() {
            path
        } else {
            path.strip_prefix('/')?.strip_prefix(self.prefix.as_str())?
        };
        let captures = CALL_PATH.captures(rest)?;
        Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
    }
}
