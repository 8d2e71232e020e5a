//! Walk order, path commands and plugin composition.

use endpointgen::config::{ParserConfig, PluginUse, PluginsConfig};
use endpointgen::model::{SignatureModel, TypeDescriptor};
use endpointgen::openapi::OpenApiDocument;
use endpointgen::parser::{
    CompositePlugin, Node, NodePath, NodeSource, NodeTarget, Parser, ParserError, Plugin,
    PluginExecutor, PluginRegistry, Result as ParserResult, SharedStorage,
};
use endpointgen::scan::ScanResult;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

mod common;
use common::fixtures::{component, document_json, ClassPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Enter,
    Exit,
}

thread_local! {
    static EVENTS: RefCell<Vec<(Event, NodePath)>> = const { RefCell::new(Vec::new()) };
    static SEEN_ON_ENTER: RefCell<Vec<NodeTarget>> = const { RefCell::new(Vec::new()) };
}

fn take_events() -> Vec<(Event, NodePath)> {
    EVENTS.with(|events| std::mem::take(&mut *events.borrow_mut()))
}

/// Records every enter and exit it sees.
struct Recorder {
    order: i32,
}

impl Plugin for Recorder {
    fn name(&self) -> &'static str {
        "recorder"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn enter(&mut self, path: &NodePath, _storage: &mut SharedStorage) -> ParserResult<()> {
        EVENTS.with(|events| events.borrow_mut().push((Event::Enter, path.clone())));
        Ok(())
    }

    fn exit(&mut self, path: &NodePath, _storage: &mut SharedStorage) -> ParserResult<()> {
        EVENTS.with(|events| events.borrow_mut().push((Event::Exit, path.clone())));
        Ok(())
    }
}

fn recording_parser(config: ParserConfig) -> Parser {
    let mut registry = PluginRegistry::with_backbone();
    registry.register_default(|| Box::new(Recorder { order: 1000 }));
    Parser::new(config).with_plugin_registry(registry)
}

const CYCLIC: &str = r#"
- name: com.example.Orders
  annotations: [Endpoint]
  methods:
    - name: find
      parameters: [{ name: id, type: long }]
      result: com.example.Order
    - { name: items, result: "List<com.example.Item>" }
    - { name: purge, annotations: [DenyAll] }
- name: com.example.Order
  fields:
    - { name: items, type: "List<com.example.Item>" }
- name: com.example.Item
  fields:
    - { name: order, type: com.example.Order }
"#;

#[test]
fn test_children_exit_before_their_parent() {
    let class_path = ClassPath::with_yaml(CYCLIC);
    take_events();
    recording_parser(class_path.config()).execute().unwrap();
    let events = take_events();
    assert!(!events.is_empty());

    let position = |kind: Event, path: &NodePath| {
        events
            .iter()
            .position(|(k, p)| *k == kind && p == path)
            .unwrap_or_else(|| panic!("no {kind:?} for {path}"))
    };
    for (kind, path) in &events {
        if *kind != Event::Enter {
            continue;
        }
        let enter = position(Event::Enter, path);
        let exit = position(Event::Exit, path);
        assert!(enter < exit, "{path} exits before it enters");
        for ancestor in path.ancestors() {
            assert!(
                position(Event::Enter, ancestor) < enter,
                "{ancestor} entered after {path}"
            );
            assert!(
                exit < position(Event::Exit, ancestor),
                "{ancestor} exited before {path}"
            );
        }
    }
}

#[test]
fn test_every_path_is_walked_once() {
    let class_path = ClassPath::with_yaml(CYCLIC);
    take_events();
    recording_parser(class_path.config()).execute().unwrap();
    let events = take_events();

    for (kind, path) in &events {
        let count = events.iter().filter(|(k, p)| k == kind && p == path).count();
        assert_eq!(count, 1, "{kind:?} {path} seen {count} times");
    }

    let entity_entries: Vec<String> = events
        .iter()
        .filter(|(kind, path)| {
            *kind == Event::Enter && matches!(path.source(), NodeSource::Entity(_))
        })
        .map(|(_, path)| {
            assert!(path.is_dependency(), "{path} should hang off the root");
            path.source().to_string()
        })
        .collect();
    assert_eq!(
        entity_entries,
        vec!["entity com.example.Order", "entity com.example.Item"]
    );
}

#[test]
fn test_removed_method_is_still_exited() {
    let class_path = ClassPath::with_yaml(CYCLIC);
    take_events();
    recording_parser(class_path.config()).execute().unwrap();
    let events = take_events();

    let purge: Vec<&(Event, NodePath)> = events
        .iter()
        .filter(|(_, path)| path.source().to_string() == "method com.example.Orders.purge")
        .collect();
    assert_eq!(purge.len(), 2);
    assert!(purge[0].1.is_removed());
    // nothing is walked below a removed path
    assert!(!events
        .iter()
        .any(|(_, path)| path.ancestors().any(|a| a == &purge[0].1)));
}

/// Removes, skips and replaces nodes by property name.
struct Pruner {
    order: i32,
}

impl Plugin for Pruner {
    fn name(&self) -> &'static str {
        "pruner"
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn enter(&mut self, path: &NodePath, _storage: &mut SharedStorage) -> ParserResult<()> {
        match path.source() {
            NodeSource::Property(property) if property.name() == "secret" => path.remove(),
            NodeSource::TypeSignature(signature) => {
                let Some(NodeSource::Property(property)) = path.parent().map(NodePath::source)
                else {
                    return Ok(());
                };
                match property.name() {
                    "tags" => path.skip(),
                    "id" if signature.class_name() == Some("java.lang.String") => {
                        let long = SignatureModel::from_descriptor(&TypeDescriptor::class(
                            "java.lang.Long",
                        ));
                        path.replace(vec![Node::new(NodeSource::TypeSignature(long))]);
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[test]
fn test_path_commands_shape_the_output() {
    let class_path = ClassPath::with_yaml(
        r#"
- name: com.example.Profiles
  annotations: [Endpoint]
  methods: [{ name: load, result: com.example.Profile }]
- name: com.example.Profile
  fields:
    - { name: id, type: String }
    - { name: secret, type: String }
    - { name: tags, type: "List<String>" }
    - { name: nickname, type: String }
"#,
    );
    let mut registry = PluginRegistry::with_backbone();
    registry.register_default(|| Box::new(Pruner { order: 5 }));
    let result = Parser::new(class_path.config())
        .with_plugin_registry(registry)
        .execute()
        .unwrap();
    let doc = document_json(&result);
    let profile = component(&doc, "com.example.Profile");

    assert_eq!(
        profile["properties"],
        json!({
            "id": {"type": "integer", "format": "int64"},
            "nickname": {"type": "string"},
            "tags": {"type": "array"},
        })
    );
}

#[test]
fn test_reordering_against_a_contract_fails_the_run() {
    let class_path = ClassPath::with_yaml(CYCLIC);
    let config = class_path.config().with_plugins(PluginsConfig {
        use_plugins: vec![PluginUse {
            name: "nonnull".to_string(),
            order: Some(10),
            configuration: None,
        }],
        ..PluginsConfig::default()
    });
    let err = Parser::new(config).execute().unwrap_err();
    assert!(matches!(err, ParserError::PluginOrder { .. }), "{err}");
}

#[test]
fn test_disabling_all_defaults_yields_an_empty_document() {
    let class_path = ClassPath::with_yaml(CYCLIC);
    let config = class_path.config().with_plugins(PluginsConfig {
        disable_all_defaults: true,
        ..PluginsConfig::default()
    });
    let result = Parser::new(config).execute().unwrap();
    assert!(result.document.paths.is_empty());
    assert!(result.document.components.schemas.is_empty());
}

/// Writes its name into the root target on enter and exit.
struct Writer {
    name: &'static str,
    order: i32,
}

impl Plugin for Writer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn enter(&mut self, path: &NodePath, _storage: &mut SharedStorage) -> ParserResult<()> {
        if path.is_root() {
            path.node().set_target(NodeTarget::Name(self.name.to_string()));
        }
        Ok(())
    }

    fn exit(&mut self, path: &NodePath, _storage: &mut SharedStorage) -> ParserResult<()> {
        if path.is_root() {
            path.node().set_target(NodeTarget::Name(self.name.to_string()));
        }
        Ok(())
    }
}

/// Notes the root target once every earlier plugin has entered.
struct Probe;

impl Plugin for Probe {
    fn name(&self) -> &'static str {
        "probe"
    }

    fn order(&self) -> i32 {
        3
    }

    fn set_order(&mut self, _order: i32) {}

    fn enter(&mut self, path: &NodePath, _storage: &mut SharedStorage) -> ParserResult<()> {
        if path.is_root() {
            let target = path.node().target().clone();
            SEEN_ON_ENTER.with(|seen| seen.borrow_mut().push(target));
        }
        Ok(())
    }
}

#[test]
fn test_later_plugin_wins_on_enter_and_earlier_on_exit() {
    let config = ParserConfig::new("Endpoint", "EndpointExposed");
    let scan = Arc::new(ScanResult::from_descriptors(Vec::new(), &config).unwrap());
    let mut storage = SharedStorage::new(
        config.clone(),
        Arc::clone(&scan),
        OpenApiDocument::new(&config),
    );
    let mut plugin = CompositePlugin::new(vec![
        Box::new(Writer {
            name: "first",
            order: 1,
        }),
        Box::new(Writer {
            name: "second",
            order: 2,
        }),
        Box::new(Probe),
    ])
    .unwrap();

    let root = Node::new(NodeSource::Root(Arc::clone(&scan)));
    SEEN_ON_ENTER.with(|seen| seen.borrow_mut().clear());
    PluginExecutor::new(&mut plugin, NodePath::root(Rc::clone(&root)))
        .execute(&mut storage)
        .unwrap();

    SEEN_ON_ENTER.with(|seen| {
        assert_eq!(*seen.borrow(), vec![NodeTarget::Name("second".to_string())]);
    });
    assert_eq!(*root.target(), NodeTarget::Name("first".to_string()));
}

/// Fails on the first method it meets.
struct Failing;

impl Plugin for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn order(&self) -> i32 {
        500
    }

    fn set_order(&mut self, _order: i32) {}

    fn enter(&mut self, path: &NodePath, _storage: &mut SharedStorage) -> ParserResult<()> {
        if let NodeSource::Method(method) = path.source() {
            return Err(ParserError::Plugin {
                plugin: "failing",
                location: path.to_string(),
                message: format!("refusing {}", method.name()),
            });
        }
        Ok(())
    }
}

#[test]
fn test_plugin_error_aborts_the_run() {
    let class_path = ClassPath::with_yaml(CYCLIC);
    let mut registry = PluginRegistry::with_backbone();
    registry.register_default(|| Box::new(Failing));
    let err = Parser::new(class_path.config())
        .with_plugin_registry(registry)
        .execute()
        .unwrap_err();
    match err {
        ParserError::Plugin { plugin, message, .. } => {
            assert_eq!(plugin, "failing");
            assert!(message.starts_with("refusing "));
        }
        other => panic!("unexpected error: {other}"),
    }
}
