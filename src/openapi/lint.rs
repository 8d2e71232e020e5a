//! # Document Linter
//!
//! Re-reads a generated document through the independent `oas3` model and
//! checks it against the conventions clients and the runtime rely on.
//!
//! ## Checks Performed
//!
//! 1. **Document parses** as an OpenAPI document
//! 2. **Path shape** - every path is `/{Endpoint}/{method}`
//! 3. **POST only** - each path carries exactly one POST operation
//! 4. **operationId** - present, unique, and `{Endpoint}_{method}_POST`
//! 5. **Reference resolution** - every `$ref` names a component schema
//! 6. **Declared tags** - operation tags appear in the top-level tag list
//! 7. **Schema completeness** - component schemas carry a shape
//!
//! ## Usage
//!
//! ```rust,ignore
//! use endpointgen::openapi::{lint_file, print_lint_issues};
//!
//! let issues = lint_file("openapi.json".as_ref())?;
//! print_lint_issues(&issues);
//! ```

use super::document::{operation_id, OpenApiDocument};
use super::schema::COMPONENTS_SCHEMAS_PREFIX;
use oas3::spec::{ObjectOrReference, PathItem};
use oas3::OpenApiV3Spec;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::path::Path;

/// Severity level for lint issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Error - clients or the runtime will break
    Error,
    /// Warning - works, but deviates from the generated conventions
    Warning,
    /// Info - worth a look
    Info,
}

impl fmt::Display for LintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LintSeverity::Error => f.write_str("error"),
            LintSeverity::Warning => f.write_str("warning"),
            LintSeverity::Info => f.write_str("info"),
        }
    }
}

/// A lint issue found in a document
#[derive(Debug, Clone)]
pub struct LintIssue {
    /// Where the issue occurred (e.g., "path:/Greeter/hello", "schema:com.example.Foo")
    pub location: String,
    pub severity: LintSeverity,
    /// Kind of issue (e.g., "missing_schema", "operation_id_convention")
    pub kind: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl LintIssue {
    pub fn new(
        location: impl Into<String>,
        severity: LintSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LintIssue {
            location: location.into(),
            severity,
            kind: kind.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Lint a document file (JSON or YAML).
pub fn lint_file(path: &Path) -> anyhow::Result<Vec<LintIssue>> {
    let text = std::fs::read_to_string(path)?;
    let value: Value = if path
        .extension()
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false)
    {
        serde_yaml::from_str(&text)?
    } else {
        serde_json::from_str(&text)?
    };
    lint_value(&value)
}

/// Lint an in-memory document.
pub fn lint_document(document: &OpenApiDocument) -> anyhow::Result<Vec<LintIssue>> {
    lint_value(&serde_json::to_value(document)?)
}

fn lint_value(value: &Value) -> anyhow::Result<Vec<LintIssue>> {
    let spec: OpenApiV3Spec = serde_json::from_value(value.clone())?;
    let mut issues = Vec::new();

    let defined_schemas: HashSet<String> = spec
        .components
        .as_ref()
        .map(|c| c.schemas.keys().cloned().collect())
        .unwrap_or_default();
    let declared_tags: BTreeSet<String> = value
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t.get("name").and_then(Value::as_str).map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    let mut seen_ids: HashMap<String, String> = HashMap::new();
    if let Some(paths) = spec.paths.as_ref() {
        for (path, item) in paths {
            lint_path_item(
                &mut issues,
                path,
                item,
                &declared_tags,
                &mut seen_ids,
            );
        }
    }

    lint_references(&mut issues, "", value, &defined_schemas);

    if let Some(components) = spec.components.as_ref() {
        for (name, schema) in &components.schemas {
            if let ObjectOrReference::Object(schema) = schema {
                let schema = serde_json::to_value(schema)?;
                lint_component(&mut issues, name, &schema);
            }
        }
    }

    Ok(issues)
}

fn lint_path_item(
    issues: &mut Vec<LintIssue>,
    path: &str,
    item: &PathItem,
    declared_tags: &BTreeSet<String>,
    seen_ids: &mut HashMap<String, String>,
) {
    let location = format!("path:{path}");
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let (endpoint, method) = match segments.as_slice() {
        [endpoint, method] if !endpoint.is_empty() && !method.is_empty() => (*endpoint, *method),
        _ => {
            issues.push(
                LintIssue::new(
                    &location,
                    LintSeverity::Error,
                    "path_shape",
                    format!("Path '{path}' is not of the form /{{Endpoint}}/{{method}}"),
                )
                .with_suggestion("Endpoint methods are addressed by exactly two segments"),
            );
            return;
        }
    };

    let others = [
        ("GET", item.get.is_some()),
        ("PUT", item.put.is_some()),
        ("DELETE", item.delete.is_some()),
        ("PATCH", item.patch.is_some()),
        ("HEAD", item.head.is_some()),
        ("OPTIONS", item.options.is_some()),
        ("TRACE", item.trace.is_some()),
    ];
    for (verb, present) in others {
        if present {
            issues.push(LintIssue::new(
                &location,
                LintSeverity::Error,
                "non_post_operation",
                format!("Endpoint methods are POST only, found {verb}"),
            ));
        }
    }

    let Some(operation) = item.post.as_ref() else {
        issues.push(LintIssue::new(
            &location,
            LintSeverity::Error,
            "missing_post",
            "Path has no POST operation",
        ));
        return;
    };

    match operation.operation_id.as_deref() {
        None => issues.push(LintIssue::new(
            &location,
            LintSeverity::Error,
            "missing_operation_id",
            "POST operation has no operationId",
        )),
        Some(id) => {
            if let Some(previous) = seen_ids.insert(id.to_string(), path.to_string()) {
                issues.push(LintIssue::new(
                    &location,
                    LintSeverity::Error,
                    "duplicate_operation_id",
                    format!("operationId '{id}' is also used by {previous}"),
                ));
            }
            let expected = operation_id(endpoint, method);
            if id != expected {
                issues.push(
                    LintIssue::new(
                        &location,
                        LintSeverity::Warning,
                        "operation_id_convention",
                        format!("operationId '{id}' does not follow the endpoint convention"),
                    )
                    .with_suggestion(format!("Use '{expected}'")),
                );
            }
        }
    }

    for tag in &operation.tags {
        if !declared_tags.contains(tag) {
            issues.push(LintIssue::new(
                &location,
                LintSeverity::Warning,
                "undeclared_tag",
                format!("Tag '{tag}' is not declared at the top level"),
            ));
        }
    }
}

fn lint_references(
    issues: &mut Vec<LintIssue>,
    pointer: &str,
    value: &Value,
    defined_schemas: &HashSet<String>,
) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                let resolved = reference
                    .strip_prefix(COMPONENTS_SCHEMAS_PREFIX)
                    .is_some_and(|name| defined_schemas.contains(name));
                if !resolved {
                    issues.push(
                        LintIssue::new(
                            format!("ref:{pointer}"),
                            LintSeverity::Error,
                            "missing_schema",
                            format!("Reference '{reference}' does not resolve"),
                        )
                        .with_suggestion("Every referenced class must be emitted as a component"),
                    );
                }
            }
            for (key, child) in map {
                let escaped = key.replace('~', "~0").replace('/', "~1");
                lint_references(issues, &format!("{pointer}/{escaped}"), child, defined_schemas);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                lint_references(issues, &format!("{pointer}/{i}"), child, defined_schemas);
            }
        }
        _ => {}
    }
}

fn lint_component(issues: &mut Vec<LintIssue>, name: &str, schema: &Value) {
    let shaped = ["type", "$ref", "allOf", "anyOf", "oneOf", "enum"]
        .iter()
        .any(|key| schema.get(*key).is_some());
    if !shaped {
        issues.push(LintIssue::new(
            format!("schema:{name}"),
            LintSeverity::Info,
            "untyped_schema",
            "Component schema has no type, reference or composition",
        ));
    }
}

/// Print lint issues grouped by severity.
pub fn print_lint_issues(issues: &[LintIssue]) {
    if issues.is_empty() {
        println!("✅ No lint issues found!");
        return;
    }

    let count = |severity| issues.iter().filter(|i| i.severity == severity).count();
    println!("\n📋 Lint Results:");
    println!(
        "   {} error(s), {} warning(s), {} info(s)\n",
        count(LintSeverity::Error),
        count(LintSeverity::Warning),
        count(LintSeverity::Info)
    );

    for (severity, heading) in [
        (LintSeverity::Error, "❌ Errors (must fix):"),
        (LintSeverity::Warning, "⚠️  Warnings (should fix):"),
        (LintSeverity::Info, "ℹ️  Info:"),
    ] {
        let group: Vec<_> = issues.iter().filter(|i| i.severity == severity).collect();
        if group.is_empty() {
            continue;
        }
        println!("{heading}");
        for issue in group {
            println!("   [{}] {}", issue.kind, issue.location);
            println!("      {}", issue.message);
            if let Some(suggestion) = &issue.suggestion {
                println!("      💡 Suggestion: {suggestion}");
            }
        }
        println!();
    }
}

pub fn has_errors(issues: &[LintIssue]) -> bool {
    issues.iter().any(|i| i.severity == LintSeverity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lint_json(content: &str) -> Vec<LintIssue> {
        let mut temp = NamedTempFile::with_suffix(".json").expect("create temp file");
        temp.write_all(content.as_bytes()).expect("write document");
        temp.flush().expect("flush");
        lint_file(temp.path()).expect("lint document")
    }

    fn kinds(issues: &[LintIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.kind.as_str()).collect()
    }

    #[test]
    fn test_clean_document() {
        let issues = lint_json(
            r##"{
  "openapi": "3.0.1",
  "info": {"title": "Test", "version": "1.0.0"},
  "tags": [{"name": "Greeter"}],
  "paths": {
    "/Greeter/hello": {
      "post": {
        "tags": ["Greeter"],
        "operationId": "Greeter_hello_POST",
        "responses": {
          "200": {
            "description": "",
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/com.example.Greeting"}}}
          }
        }
      }
    }
  },
  "components": {"schemas": {"com.example.Greeting": {"type": "object"}}}
}"##,
        );
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn test_broken_conventions() {
        let issues = lint_json(
            r##"{
  "openapi": "3.0.1",
  "info": {"title": "Test", "version": "1.0.0"},
  "paths": {
    "/Greeter/hello": {
      "post": {
        "tags": ["Greeter"],
        "operationId": "hello",
        "responses": {
          "200": {
            "description": "",
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Missing"}}}
          }
        }
      },
      "get": {"operationId": "hello_get", "responses": {"200": {"description": ""}}}
    },
    "/flat": {"post": {"operationId": "flat", "responses": {"200": {"description": ""}}}}
  },
  "components": {"schemas": {"Loose": {"description": "no shape"}}}
}"##,
        );
        let kinds = kinds(&issues);
        assert!(kinds.contains(&"non_post_operation"));
        assert!(kinds.contains(&"operation_id_convention"));
        assert!(kinds.contains(&"undeclared_tag"));
        assert!(kinds.contains(&"missing_schema"));
        assert!(kinds.contains(&"path_shape"));
        assert!(kinds.contains(&"untyped_schema"));
        assert!(has_errors(&issues));
    }
}
