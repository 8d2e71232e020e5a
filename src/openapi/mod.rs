//! # OpenAPI Module
//!
//! The document model the parser fills in, its schema objects, and a
//! linter that re-reads generated output through the `oas3` model.
//!
//! Documents are plain serde structs with sorted maps, so the same input
//! always serializes to the same bytes.

mod document;
mod lint;
mod schema;

pub use document::{
    endpoint_path, json_pointer, operation_id, Components, Info, MediaType, OpenApiDocument,
    Operation, PathItem, RequestBody, Response, Server, Tag, JSON_MEDIA_TYPE, OPENAPI_VERSION,
};
pub use lint::{has_errors, lint_document, lint_file, print_lint_issues, LintIssue, LintSeverity};
pub use schema::{
    Schema, SchemaType, COMPONENTS_SCHEMAS_PREFIX, X_ACCESS, X_CLASS_NAME, X_TYPE_ARGUMENTS,
    X_TYPE_VARIABLE, X_VALIDATION_CONSTRAINTS,
};
