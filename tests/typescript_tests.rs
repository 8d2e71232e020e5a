//! TypeScript sources generated from a parsed class path.

use endpointgen::generator::{generate_typescript, GenerateOptions};
use tempfile::tempdir;

mod common;
use common::fixtures::ClassPath;

const ACCOUNTS: &str = r#"
- name: com.example.AccountEndpoint
  annotations: [{ name: Endpoint, values: { value: Accounts } }]
  methods:
    - name: open
      parameters:
        - { name: owner, type: com.example.Person, annotations: [Nonnull] }
        - { name: kind, type: com.example.Kind }
      result: com.example.Account
    - { name: count, result: int }
    - name: close
      parameters: [{ name: id, type: long }]
- name: com.example.Person
  fields:
    - { name: name, type: String, annotations: [Nonnull] }
    - { name: age, type: int }
- name: com.example.Account
  fields:
    - { name: holder, type: com.example.Person }
    - { name: labels, type: "List<String>" }
- name: com.example.Kind
  kind: enum
  enumConstants: [CHECKING, SAVINGS]
"#;

#[test]
fn test_generates_one_file_per_endpoint_plus_models_and_index() {
    let class_path = ClassPath::with_yaml(ACCOUNTS);
    let result = class_path.parse();
    let out = tempdir().unwrap();

    let written = generate_typescript(&result.document, out.path(), &GenerateOptions::default())
        .unwrap();
    let mut names: Vec<String> = written
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Accounts.ts", "index.ts", "models.ts"]);
}

#[test]
fn test_models_cover_every_component() {
    let class_path = ClassPath::with_yaml(ACCOUNTS);
    let result = class_path.parse();
    let out = tempdir().unwrap();
    generate_typescript(&result.document, out.path(), &GenerateOptions::default()).unwrap();

    let models = std::fs::read_to_string(out.path().join("models.ts")).unwrap();
    assert!(models.contains("export interface Person {"), "{models}");
    assert!(models.contains("name: string;"), "{models}");
    assert!(models.contains("age: number;"), "{models}");
    assert!(models.contains("export interface Account {"), "{models}");
    assert!(models.contains("holder?: Person"), "{models}");
    assert!(models.contains("export enum Kind {"), "{models}");
    assert!(models.contains("SAVINGS = 'SAVINGS',"), "{models}");
}

#[test]
fn test_endpoint_functions_call_the_client() {
    let class_path = ClassPath::with_yaml(ACCOUNTS);
    let result = class_path.parse();
    let out = tempdir().unwrap();
    let options = GenerateOptions {
        client_module: "../client".to_string(),
    };
    generate_typescript(&result.document, out.path(), &options).unwrap();

    let accounts = std::fs::read_to_string(out.path().join("Accounts.ts")).unwrap();
    assert!(accounts.contains("import client from '../client';"), "{accounts}");
    assert!(accounts.contains("from './models';"), "{accounts}");
    assert!(accounts.contains("owner: Person"), "{accounts}");
    assert!(accounts.contains("kind: Kind | undefined"), "{accounts}");
    assert!(accounts.contains("): Promise<Account"), "{accounts}");
    assert!(accounts.contains("async function count(): Promise<number>"), "{accounts}");
    assert!(accounts.contains("async function close(id: number): Promise<void>"), "{accounts}");
    assert!(accounts.contains("client.call('Accounts', 'count', {  })"), "{accounts}");

    let index = std::fs::read_to_string(out.path().join("index.ts")).unwrap();
    assert!(index.contains("export * as Accounts from './Accounts';"));
    assert!(index.contains("export * from './models';"));
}

#[test]
fn test_output_is_deterministic() {
    let class_path = ClassPath::with_yaml(ACCOUNTS);
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    generate_typescript(&class_path.parse().document, first.path(), &GenerateOptions::default())
        .unwrap();
    generate_typescript(&class_path.parse().document, second.path(), &GenerateOptions::default())
        .unwrap();

    for file in ["models.ts", "Accounts.ts", "index.ts"] {
        assert_eq!(
            std::fs::read_to_string(first.path().join(file)).unwrap(),
            std::fs::read_to_string(second.path().join(file)).unwrap(),
            "{file} differs between runs"
        );
    }
}
