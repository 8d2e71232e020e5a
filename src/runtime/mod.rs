//! # Runtime Module
//!
//! Serves the methods described by a generated document.
//!
//! ## Request Flow
//!
//! ```text
//! POST /{prefix}/{endpoint}/{method}   { "a": 1, "b": 2 }
//!   │
//!   ├─ EndpointService   route, reject non-POST (405), parse JSON (400)
//!   ├─ EndpointInvoker   lookup (404), access (401/403), bind (400),
//!   │                    validate (400 + validationErrorData)
//!   ├─ MethodHandler     user code; EndpointException → 400
//!   └─ result            null for a non-null method → 500
//! ```
//!
//! Endpoint and method names are matched case-insensitively.
//!
//! ## Example
//!
//! ```rust,ignore
//! use endpointgen::runtime::{EndpointImplementation, EndpointRegistry, EndpointService, MethodHandler};
//!
//! let greeter = EndpointImplementation::new("Greeter").method(
//!     "hello",
//!     MethodHandler::typed(|_ctx, (name,): (String,)| Ok(format!("Hello, {name}"))),
//! );
//! let registry = EndpointRegistry::build(&parse_result, [greeter])?;
//! let service = EndpointService::new("connect", registry);
//! let response = service.handle(&http::Method::POST, "/connect/Greeter/hello", br#"{"name":"Ann"}"#, None);
//! ```

mod error;
mod handler;
mod ids;
mod invoker;
mod registry;
mod service;
pub mod validation;

pub use error::{EndpointError, EndpointException, RegistryError, ValidationErrorData};
pub use handler::{CallContext, EndpointImplementation, MethodHandler};
pub use ids::InvocationId;
pub use invoker::{EndpointInvoker, EndpointResponse, HeaderVec};
pub use registry::{EndpointRegistry, ParameterBinding, RegisteredEndpoint, RegisteredMethod};
pub use service::EndpointService;
