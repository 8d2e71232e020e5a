//! # Class-Path Scan
//!
//! Reads every class descriptor under the configured class path into a
//! closed [`ClassWorld`] and picks out the endpoint classes. The scan is
//! atomic: it either yields a complete [`ScanResult`] or an error, and it
//! always finishes before the parser walk starts.
//!
//! [`reachable_classes`] answers "which entities would the walk emit?"
//! with a flat work queue instead of plugins. It is used by `inspect` and
//! as a cross-check of the walk.

mod reachable;
mod scanner;

pub use reachable::{reachable_classes, ScanItem, ScanKind, ScanLocation};
pub use scanner::ClassPathScanner;

use crate::config::ParserConfig;
use crate::model::{ClassDescriptor, ClassInfoModel, ClassWorld};
use crate::parser::{ParserError, Result};
use std::collections::BTreeMap;
use tracing::debug;

/// An endpoint class with the name it is published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointClass {
    pub name: String,
    pub class: ClassInfoModel,
}

/// The closed world of one scan plus the endpoints found in it.
#[derive(Debug, Clone)]
pub struct ScanResult {
    world: ClassWorld,
    endpoints: Vec<EndpointClass>,
    endpoint_annotation: String,
    exposed_annotation: String,
}

impl ScanResult {
    /// Builds the world from parsed descriptors and selects endpoints.
    ///
    /// Endpoints are sorted by published name; two classes publishing the
    /// same name (case-insensitively, as the runtime looks them up) are
    /// rejected.
    pub fn from_descriptors(
        descriptors: Vec<ClassDescriptor>,
        config: &ParserConfig,
    ) -> Result<Self> {
        let world = ClassWorld::new(descriptors.into_iter().map(ClassInfoModel::new))?;

        let mut by_name: BTreeMap<String, EndpointClass> = BTreeMap::new();
        for class in world.iter() {
            let Some(name) = endpoint_name(class, &config.endpoint_annotation) else {
                continue;
            };
            let key = name.to_ascii_lowercase();
            if let Some(existing) = by_name.get(&key) {
                return Err(ParserError::DuplicateEndpoint {
                    name,
                    first: existing.class.name().to_string(),
                    second: class.name().to_string(),
                });
            }
            by_name.insert(
                key,
                EndpointClass {
                    name,
                    class: class.clone(),
                },
            );
        }
        let mut endpoints: Vec<EndpointClass> = by_name.into_values().collect();
        endpoints.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(
            classes = world.len(),
            endpoints = endpoints.len(),
            "class path scanned"
        );
        Ok(Self {
            world,
            endpoints,
            endpoint_annotation: config.endpoint_annotation.clone(),
            exposed_annotation: config.endpoint_exposed_annotation.clone(),
        })
    }

    pub fn world(&self) -> &ClassWorld {
        &self.world
    }

    pub fn endpoints(&self) -> &[EndpointClass] {
        &self.endpoints
    }

    pub fn endpoint_annotation(&self) -> &str {
        &self.endpoint_annotation
    }

    /// Published name of `class` when it is an endpoint.
    pub fn endpoint_name_of(&self, class: &ClassInfoModel) -> Option<&str> {
        self.endpoints
            .iter()
            .find(|endpoint| &endpoint.class == class)
            .map(|endpoint| endpoint.name.as_str())
    }

    /// Whether `class` carries the endpoint-exposed annotation.
    pub fn is_exposed(&self, class: &ClassInfoModel) -> bool {
        class.has_annotation(&self.exposed_annotation)
    }
}

/// The annotation's `value`, or the simple class name, when `class`
/// carries the endpoint annotation.
pub fn endpoint_name(class: &ClassInfoModel, annotation: &str) -> Option<String> {
    let found = class.find_annotation(annotation)?;
    Some(
        found
            .string_value("value")
            .unwrap_or_else(|| class.simple_name())
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_descriptors, DescriptorFormat};

    fn scan(yaml: &str) -> Result<ScanResult> {
        let config = ParserConfig::new("com.example.Endpoint", "EndpointExposed");
        ScanResult::from_descriptors(
            parse_descriptors(yaml, DescriptorFormat::Yaml).unwrap(),
            &config,
        )
    }

    #[test]
    fn test_endpoints_are_named_and_sorted() {
        let result = scan(
            r#"
- name: com.example.ZooService
  annotations: [com.example.Endpoint]
- name: com.example.Accounts
  annotations:
    - name: Endpoint
      values: { value: Bank }
- name: com.example.Base
  annotations: [EndpointExposed]
- name: com.example.Plain
"#,
        )
        .unwrap();
        let names: Vec<_> = result.endpoints().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Bank", "ZooService"]);

        let base = result.world().get("com.example.Base").unwrap();
        let plain = result.world().get("com.example.Plain").unwrap();
        assert!(result.is_exposed(base));
        assert!(!result.is_exposed(plain));
        assert_eq!(result.endpoint_name_of(plain), None);
    }

    #[test]
    fn test_duplicate_endpoint_names_are_rejected() {
        let result = scan(
            r#"
- name: com.example.a.Orders
  annotations: [Endpoint]
- name: com.example.b.Orders
  annotations: [Endpoint]
"#,
        );
        match result {
            Err(ParserError::DuplicateEndpoint { name, first, second }) => {
                assert_eq!(name, "Orders");
                assert_eq!(first, "com.example.a.Orders");
                assert_eq!(second, "com.example.b.Orders");
            }
            other => panic!("expected duplicate endpoint, got {other:?}"),
        }
    }
}
