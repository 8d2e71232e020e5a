use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// One failed constraint of one argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrorData {
    pub parameter_name: String,
    pub message: String,
}

/// Exception a method raises on purpose; its message reaches the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EndpointException {
    pub type_name: String,
    pub message: String,
}

impl EndpointException {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            type_name: "EndpointException".to_string(),
            message: message.into(),
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }
}

/// Why a call did not produce a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EndpointError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    MethodNotAllowed(String),

    #[error("{message}")]
    BadRequest {
        message: String,
        validation: Vec<ValidationErrorData>,
    },

    #[error("authentication required")]
    Unauthorized,

    #[error("access denied")]
    Forbidden,

    #[error(transparent)]
    Exception(#[from] EndpointException),

    /// Full detail is logged; callers only see a generic message.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EndpointError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        EndpointError::BadRequest {
            message: message.into(),
            validation: Vec::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            EndpointError::NotFound(_) => StatusCode::NOT_FOUND,
            EndpointError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            EndpointError::BadRequest { .. } | EndpointError::Exception(_) => {
                StatusCode::BAD_REQUEST
            }
            EndpointError::Unauthorized => StatusCode::UNAUTHORIZED,
            EndpointError::Forbidden => StatusCode::FORBIDDEN,
            EndpointError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The error object sent to the client.
    pub fn to_body(&self) -> Value {
        match self {
            EndpointError::BadRequest {
                message,
                validation,
            } if !validation.is_empty() => json!({
                "type": "ValidationException",
                "message": message,
                "validationErrorData": validation,
            }),
            EndpointError::Exception(exception) => json!({
                "type": exception.type_name,
                "message": exception.message,
            }),
            EndpointError::Internal(_) => json!({
                "type": "InternalError",
                "message": "Internal server error",
            }),
            other => json!({
                "type": other.type_name(),
                "message": other.to_string(),
            }),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            EndpointError::NotFound(_) => "NotFound",
            EndpointError::MethodNotAllowed(_) => "MethodNotAllowed",
            EndpointError::BadRequest { .. } => "BadRequest",
            EndpointError::Unauthorized => "Unauthorized",
            EndpointError::Forbidden => "Forbidden",
            EndpointError::Exception(_) => "EndpointException",
            EndpointError::Internal(_) => "InternalError",
        }
    }
}

/// Problems found while wiring implementations to the document.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no endpoint named `{0}` in the document")]
    UnknownEndpoint(String),

    #[error("endpoint `{endpoint}` has no method `{method}`")]
    UnknownMethod { endpoint: String, method: String },

    #[error("endpoint `{0}` is implemented twice")]
    DuplicateImplementation(String),

    #[error("endpoint `{endpoint}` publishes `{first}` and `{second}`, which differ only in case")]
    DuplicateMethod {
        endpoint: String,
        first: String,
        second: String,
    },

    #[error("schema of `{location}` does not compile: {message}")]
    Schema { location: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(EndpointError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(EndpointError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(EndpointError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            EndpointError::from(EndpointException::new("nope")).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_details_stay_private() {
        let body = EndpointError::Internal("db password rejected".into()).to_body();
        assert_eq!(body["message"], "Internal server error");
    }

    #[test]
    fn test_validation_body() {
        let error = EndpointError::BadRequest {
            message: "Validation error in endpoint 'Shop' method 'buy'".into(),
            validation: vec![ValidationErrorData {
                parameter_name: "count".into(),
                message: "-1 is less than the minimum of 1".into(),
            }],
        };
        let body = error.to_body();
        assert_eq!(body["type"], "ValidationException");
        assert_eq!(body["validationErrorData"][0]["parameterName"], "count");
    }
}
