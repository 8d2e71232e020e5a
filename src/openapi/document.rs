use super::schema::Schema;
use crate::config::ParserConfig;
use crate::parser::ParserError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

pub const OPENAPI_VERSION: &str = "3.0.1";
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// The generated document: one POST operation per endpoint method plus
/// the component schemas of every reachable entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "x-class-name", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub operation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Schema>,
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl Operation {
    /// The JSON request body schema, created on first use.
    pub fn request_schema_mut(&mut self) -> &mut Schema {
        let body = self.request_body.get_or_insert_with(RequestBody::default);
        &mut body
            .content
            .entry(JSON_MEDIA_TYPE.to_string())
            .or_insert_with(|| MediaType {
                schema: Schema::of_type(super::schema::SchemaType::Object),
            })
            .schema
    }

    pub fn request_schema(&self) -> Option<&Schema> {
        self.request_body
            .as_ref()
            .and_then(|b| b.content.get(JSON_MEDIA_TYPE))
            .map(|m| &m.schema)
    }

    pub fn response_schema(&self) -> Option<&Schema> {
        self.responses
            .get("200")
            .and_then(|r| r.content.get(JSON_MEDIA_TYPE))
            .map(|m| &m.schema)
    }
}

impl OpenApiDocument {
    /// An empty document titled after the configured application.
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info: Info {
                title: config.application.title.clone(),
                version: config.application.version.clone(),
                description: None,
            },
            servers: vec![Server {
                url: format!("http://localhost:8080/{}", config.prefix()),
                description: Some("Endpoint server".to_string()),
            }],
            tags: Vec::new(),
            paths: BTreeMap::new(),
            components: Components::default(),
            extensions: BTreeMap::new(),
        }
    }

    /// The configured base document, or [`OpenApiDocument::new`].
    pub fn base(config: &ParserConfig) -> Result<Self, ParserError> {
        match &config.openapi_base {
            Some(path) => Self::load(path),
            None => Ok(Self::new(config)),
        }
    }

    /// Loads a document from JSON or YAML.
    pub fn load(path: &Path) -> Result<Self, ParserError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ParserError::Config(format!("cannot read base document {}: {e}", path.display()))
        })?;
        let is_yaml = path
            .extension()
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false);
        let parsed = if is_yaml {
            serde_yaml::from_str(&text).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&text).map_err(|e| e.to_string())
        };
        parsed.map_err(|e| {
            ParserError::Config(format!("invalid base document {}: {e}", path.display()))
        })
    }

    /// Sorts tags and wraps nullable refs; called once after a run.
    pub fn finalize(&mut self) {
        self.tags.sort_by(|a, b| a.name.cmp(&b.name));
        self.tags.dedup_by(|a, b| a.name == b.name);
        for schema in self.components.schemas.values_mut() {
            schema.normalize();
        }
        for item in self.paths.values_mut() {
            let Some(operation) = item.post.as_mut() else {
                continue;
            };
            if let Some(body) = operation.request_body.as_mut() {
                for media in body.content.values_mut() {
                    media.schema.normalize();
                }
            }
            for response in operation.responses.values_mut() {
                for media in response.content.values_mut() {
                    media.schema.normalize();
                }
            }
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// SHA-256 of the pretty JSON rendering, hex encoded.
    pub fn fingerprint(&self) -> String {
        let rendered = self.to_json_pretty().unwrap_or_default();
        let digest = Sha256::digest(rendered.as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Looks up the operation of `/{endpoint}/{method}`.
    pub fn operation(&self, endpoint: &str, method: &str) -> Option<&Operation> {
        self.paths
            .get(&endpoint_path(endpoint, method))
            .and_then(|item| item.post.as_ref())
    }
}

pub fn endpoint_path(endpoint: &str, method: &str) -> String {
    format!("/{endpoint}/{method}")
}

pub fn operation_id(endpoint: &str, method: &str) -> String {
    format!("{endpoint}_{method}_POST")
}

/// Builds a JSON pointer fragment (`#/a/b~1c`) from raw segments.
pub fn json_pointer<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut pointer = String::from("#");
    for segment in segments {
        pointer.push('/');
        pointer.push_str(&segment.as_ref().replace('~', "~0").replace('/', "~1"));
    }
    pointer
}
