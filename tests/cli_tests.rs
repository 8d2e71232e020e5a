use std::fs;
use std::process::Command;
use tempfile::TempDir;

mod common;
use common::fixtures::ClassPath;

const SHOP: &str = r#"
- name: com.example.ShopEndpoint
  annotations: [{ name: Endpoint, values: { value: Shop } }]
  methods:
    - name: find
      parameters: [{ name: id, type: long }]
      result: com.example.Order
- name: com.example.Order
  fields:
    - { name: id, type: long }
    - { name: note, type: String }
"#;

fn write_config(class_path: &ClassPath) -> std::path::PathBuf {
    let config = class_path.root().join("endpointgen.yaml");
    fs::write(
        &config,
        "classPath: [classes]\nendpointAnnotation: Endpoint\nendpointExposedAnnotation: EndpointExposed\napplication:\n  title: Shop\n  version: 2.0.0\n",
    )
    .unwrap();
    config
}

#[test]
fn test_cli_generate_writes_document_and_typescript() {
    let class_path = ClassPath::with_yaml(SHOP);
    let config = write_config(&class_path);
    let out = TempDir::new().unwrap();
    let document = out.path().join("openapi.json");
    let typescript = out.path().join("ts");

    let status = Command::new(env!("CARGO_BIN_EXE_endpointgen"))
        .arg("generate")
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&document)
        .arg("--typescript")
        .arg(&typescript)
        .arg("--lint")
        .status()
        .expect("run cli");
    assert!(status.success());

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&document).unwrap()).unwrap();
    assert_eq!(json["info"]["title"], "Shop");
    assert!(json["paths"]["/Shop/find"]["post"].is_object());
    assert!(json["components"]["schemas"]["com.example.Order"].is_object());
    assert!(typescript.join("Shop.ts").exists());
    assert!(typescript.join("models.ts").exists());
}

#[test]
fn test_cli_lint_accepts_generated_document() {
    let class_path = ClassPath::with_yaml(SHOP);
    let config = write_config(&class_path);
    let document = class_path.root().join("openapi.json");

    let generated = Command::new(env!("CARGO_BIN_EXE_endpointgen"))
        .args(["generate", "--config"])
        .arg(&config)
        .arg("--output")
        .arg(&document)
        .status()
        .expect("run generate");
    assert!(generated.success());

    let linted = Command::new(env!("CARGO_BIN_EXE_endpointgen"))
        .args(["lint", "--fail-on-error", "--document"])
        .arg(&document)
        .status()
        .expect("run lint");
    assert!(linted.success());
}

#[test]
fn test_cli_fails_on_missing_config() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_endpointgen"))
        .args(["inspect", "--config"])
        .arg(dir.path().join("missing.yaml"))
        .output()
        .expect("run inspect");
    assert!(!output.status.success());
}
