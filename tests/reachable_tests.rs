//! The flat reachability scan against the full walk.

use endpointgen::config::ParserConfig;
use endpointgen::parser::plugins::TransferTypesConfiguration;
use endpointgen::parser::{ParseResult, Parser};
use endpointgen::scan::{reachable_classes, ClassPathScanner};
use serde_json::json;

mod common;
use common::fixtures::{component_names, document_json, response_schema, ClassPath};

fn flat_scan(config: &ParserConfig) -> Vec<String> {
    let scan = ClassPathScanner::scan(config).unwrap();
    let mappers = TransferTypesConfiguration {
        mappings: config.transfer_types.clone(),
    }
    .class_mappers();
    reachable_classes(&scan, &mappers)
        .iter()
        .map(|class| class.name().to_string())
        .collect()
}

fn walk(config: ParserConfig) -> ParseResult {
    Parser::new(config).execute().unwrap()
}

#[test]
fn test_flat_scan_matches_walk_for_nested_types() {
    let class_path = ClassPath::with_yaml(
        r#"
- name: com.example.Catalog
  annotations: [Endpoint]
  methods:
    - name: search
      parameters:
        - { name: filter, type: com.example.Filter }
      result: "List<com.example.Product>"
    - name: byCategory
      result: "Map<String, com.example.Category[]>"
    - name: hidden
      annotations: [DenyAll]
      result: com.example.Secret
- name: com.example.Filter
  fields:
    - { name: sort, type: com.example.SortOrder }
- name: com.example.SortOrder
  kind: enum
  enumConstants: [ASC, DESC]
- name: com.example.Product
  superclass: com.example.Base
  fields:
    - { name: category, type: "Optional<com.example.Category>" }
- name: com.example.Base
  fields:
    - { name: id, type: long }
- name: com.example.Category
  fields:
    - { name: parent, type: com.example.Category }
- name: com.example.Secret
  fields:
    - { name: value, type: String }
"#,
    );
    let config = class_path.config();
    let flat = flat_scan(&config);
    let doc = document_json(&walk(config));

    assert_eq!(flat, component_names(&doc));
    assert!(!flat.iter().any(|name| name == "com.example.Secret"));
    assert_eq!(flat.len(), 5);
}

#[test]
fn test_flat_scan_matches_walk_through_exposed_generics() {
    let class_path = ClassPath::with_yaml(
        r#"
- name: com.example.CrudService
  annotations: [EndpointExposed]
  typeParameters: [E]
  methods:
    - { name: list, result: "List<E>" }
    - name: save
      parameters: [{ name: entity, type: E }]
- name: com.example.PersonService
  annotations: [Endpoint]
  superclass: "com.example.CrudService<com.example.Person>"
- name: com.example.Person
  fields:
    - { name: address, type: com.example.Address }
- name: com.example.Address
  fields:
    - { name: street, type: String }
"#,
    );
    let config = class_path.config();
    let flat = flat_scan(&config);
    let doc = document_json(&walk(config));

    assert_eq!(flat, vec!["com.example.Address", "com.example.Person"]);
    assert_eq!(flat, component_names(&doc));
}

#[test]
fn test_transfer_types_replace_classes_in_both() {
    let class_path = ClassPath::with_yaml(
        r#"
- name: com.example.Payments
  annotations: [Endpoint]
  methods:
    - { name: balance, result: com.example.Money }
    - { name: reference, result: java.util.UUID }
- name: com.example.Money
  fields:
    - { name: amount, type: java.math.BigDecimal }
"#,
    );
    let mut config = class_path.config();
    config
        .transfer_types
        .insert("com.example.Money".to_string(), "java.lang.String".to_string());

    assert!(flat_scan(&config).is_empty());
    let doc = document_json(&walk(config));
    assert!(component_names(&doc).is_empty());
    assert_eq!(
        response_schema(&doc, "Payments", "balance"),
        json!({"type": "string", "nullable": true})
    );
    assert_eq!(
        response_schema(&doc, "Payments", "reference"),
        json!({"type": "string", "nullable": true})
    );
}
