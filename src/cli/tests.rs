//! Unit tests for CLI commands

use crate::cli::{inspect, run, Cli, Commands};
use crate::config::ParserConfig;
use crate::parser::Parser as EndpointParser;
use clap::Parser;
use tempfile::tempdir;

#[test]
fn test_lint_command_with_flags() {
    let cli = Cli::try_parse_from([
        "endpointgen",
        "lint",
        "--document",
        "openapi.json",
        "--fail-on-error",
        "--errors-only",
    ])
    .unwrap();

    match cli.command {
        Commands::Lint {
            document,
            fail_on_error,
            errors_only,
        } => {
            assert_eq!(document.to_string_lossy(), "openapi.json");
            assert!(fail_on_error);
            assert!(errors_only);
        }
        _ => panic!("Expected Lint command"),
    }
}

#[test]
fn test_class_path_is_repeatable() {
    let cli = Cli::try_parse_from([
        "endpointgen",
        "generate",
        "-c",
        "endpointgen.yaml",
        "--class-path",
        "a",
        "--class-path",
        "b",
    ])
    .unwrap();
    match cli.command {
        Commands::Generate { config, output, .. } => {
            assert_eq!(config.class_path.len(), 2);
            assert!(output.is_none());
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_all_commands_parse() {
    let commands = vec![
        vec!["endpointgen", "generate", "--config", "c.yaml", "--output", "out.json"],
        vec!["endpointgen", "inspect", "--config", "c.yaml"],
        vec!["endpointgen", "lint", "--document", "openapi.json"],
        vec!["endpointgen", "watch", "--config", "c.yaml", "--output", "out.json"],
    ];

    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {:?}", args);
    }
}

fn write_project(dir: &std::path::Path) -> std::path::PathBuf {
    std::fs::create_dir(dir.join("classes")).unwrap();
    std::fs::write(
        dir.join("classes/greeter.yaml"),
        r#"
- name: com.example.Greeter
  annotations: [Endpoint]
  methods:
    - name: greet
      parameters: [{ name: person, type: com.example.Person }]
      result: String
    - name: secret
      annotations: [DenyAll]
- name: com.example.Person
  fields:
    - { name: name, type: String }
"#,
    )
    .unwrap();
    let config = dir.join("endpointgen.yaml");
    std::fs::write(
        &config,
        "classPath: [classes]\nendpointAnnotation: Endpoint\nendpointExposedAnnotation: EndpointExposed\n",
    )
    .unwrap();
    config
}

#[test]
fn test_generate_writes_document_and_typescript() {
    let dir = tempdir().unwrap();
    let config = write_project(dir.path());
    let output = dir.path().join("build/openapi.json");
    let ts = dir.path().join("ts");

    run(Cli::try_parse_from([
        "endpointgen",
        "generate",
        "--config",
        config.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--typescript",
        ts.to_str().unwrap(),
    ])
    .unwrap())
    .unwrap();

    let document: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert!(document["paths"]["/Greeter/greet"]["post"].is_object());
    assert!(document["paths"].get("/Greeter/secret").is_none());
    assert!(ts.join("Greeter.ts").exists());
    assert!(ts.join("models.ts").exists());
}

#[test]
fn test_inspect_lists_methods_and_reachable_classes() {
    let dir = tempdir().unwrap();
    let config_path = write_project(dir.path());
    let config = ParserConfig::load(&config_path).unwrap();
    let result = EndpointParser::new(config.clone()).execute().unwrap();

    let text = inspect(&config, &result);
    assert!(text.contains("Greeter (com.example.Greeter)"));
    assert!(text.contains("POST /connect/Greeter/greet"));
    assert!(text.contains("  com.example.Person\n"));
    assert!(!text.contains("secret"));
}
