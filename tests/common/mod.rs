#![allow(dead_code)]

pub mod fixtures {
    use endpointgen::config::ParserConfig;
    use endpointgen::parser::{ParseResult, Parser};
    use serde_json::Value;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A class path in a temporary directory, filled one descriptor file
    /// at a time.
    pub struct ClassPath {
        dir: TempDir,
    }

    impl ClassPath {
        pub fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::create_dir_all(dir.path().join("classes")).unwrap();
            Self { dir }
        }

        /// Class path with a single `classes.yaml` holding `yaml`.
        pub fn with_yaml(yaml: &str) -> Self {
            let class_path = Self::new();
            class_path.write("classes.yaml", yaml);
            class_path
        }

        pub fn write(&self, name: &str, content: &str) -> PathBuf {
            let path = self.classes_dir().join(name);
            std::fs::write(&path, content).unwrap();
            path
        }

        pub fn classes_dir(&self) -> PathBuf {
            self.dir.path().join("classes")
        }

        pub fn root(&self) -> &Path {
            self.dir.path()
        }

        pub fn config(&self) -> ParserConfig {
            ParserConfig::new("Endpoint", "EndpointExposed").with_class_path(self.classes_dir())
        }

        pub fn parse(&self) -> ParseResult {
            Parser::new(self.config()).execute().unwrap()
        }
    }

    /// The generated document as plain JSON.
    pub fn document_json(result: &ParseResult) -> Value {
        serde_json::to_value(&result.document).unwrap()
    }

    /// Request body property schema of `/{endpoint}/{method}`.
    pub fn parameter_schema(doc: &Value, endpoint: &str, method: &str, name: &str) -> Value {
        doc["paths"][format!("/{endpoint}/{method}")]["post"]["requestBody"]["content"]
            ["application/json"]["schema"]["properties"][name]
            .clone()
    }

    /// Required parameter names of `/{endpoint}/{method}`.
    pub fn required_parameters(doc: &Value, endpoint: &str, method: &str) -> Vec<String> {
        let required = &doc["paths"][format!("/{endpoint}/{method}")]["post"]["requestBody"]
            ["content"]["application/json"]["schema"]["required"];
        serde_json::from_value(required.clone()).unwrap_or_default()
    }

    /// `200` response schema of `/{endpoint}/{method}`.
    pub fn response_schema(doc: &Value, endpoint: &str, method: &str) -> Value {
        doc["paths"][format!("/{endpoint}/{method}")]["post"]["responses"]["200"]["content"]
            ["application/json"]["schema"]
            .clone()
    }

    pub fn component(doc: &Value, name: &str) -> Value {
        doc["components"]["schemas"][name].clone()
    }

    pub fn component_names(doc: &Value) -> Vec<String> {
        doc["components"]["schemas"]
            .as_object()
            .map(|schemas| schemas.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub const REF_PREFIX: &str = "#/components/schemas/";

    pub fn reference(class: &str) -> String {
        format!("{REF_PREFIX}{class}")
    }

    /// The `$ref` of a schema, whether plain or wrapped in `anyOf`.
    pub fn ref_of(schema: &Value) -> Option<&str> {
        schema["$ref"]
            .as_str()
            .or_else(|| schema["anyOf"][0]["$ref"].as_str())
    }
}
