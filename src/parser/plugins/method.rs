use crate::access::AccessRule;
use crate::model::{ClassInfoModel, MethodInfoModel};
use crate::openapi::{
    endpoint_path, json_pointer, operation_id, Operation, PathItem, Response, X_ACCESS,
};
use crate::parser::node::{Node, NodeSource, NodeTarget};
use crate::parser::{NodeDependencies, NodePath, ParserError, Plugin, Result, SharedStorage};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

pub const NAME: &str = "method";

/// Endpoint and exposed classes → their published methods; each method
/// becomes `/{Endpoint}/{method}` with a single POST operation.
pub struct MethodPlugin {
    order: i32,
}

impl Default for MethodPlugin {
    fn default() -> Self {
        Self { order: 20 }
    }
}

/// Declaring class of every path emitted so far, for clash reports.
#[derive(Default)]
struct EmittedMethods(HashMap<String, String>);

impl Plugin for MethodPlugin {
    fn name(&self) -> &'static str {
        NAME
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn scan(
        &mut self,
        dependencies: NodeDependencies,
        _storage: &mut SharedStorage,
    ) -> Result<NodeDependencies> {
        let source = dependencies.node().source();
        if !source.is_method_holder() {
            return Ok(dependencies);
        }
        let Some(class) = source.class() else {
            return Ok(dependencies);
        };

        let mut seen = HashSet::new();
        let mut methods = Vec::new();
        for method in published_methods(class) {
            if !seen.insert(method.name()) {
                return Err(ParserError::OverloadedMethod {
                    endpoint: class.name().to_string(),
                    method: method.name().to_string(),
                });
            }
            methods.push(Node::new(NodeSource::Method(method.clone())));
        }
        Ok(dependencies.with_child_nodes(methods))
    }

    fn enter(&mut self, path: &NodePath, storage: &mut SharedStorage) -> Result<()> {
        let NodeSource::Method(method) = path.source() else {
            return Ok(());
        };
        let declaring = path.parent().and_then(|p| p.source().class());
        let endpoint = nearest_endpoint(path);

        if is_overridden(method, path) {
            debug!(method = %path.source(), "skipping overridden method");
            path.remove();
            return Ok(());
        }
        let access = AccessRule::effective(method, declaring, endpoint);
        if access.is_denied() {
            debug!(method = %path.source(), "skipping method denied to everyone");
            path.remove();
            return Ok(());
        }

        let endpoint_name = endpoint
            .and_then(|class| storage.endpoint_name(class))
            .unwrap_or_default()
            .to_string();
        let mut responses = BTreeMap::new();
        responses.insert(
            "200".to_string(),
            Response {
                description: String::new(),
                content: BTreeMap::new(),
            },
        );
        path.node().set_target(NodeTarget::PathItem(PathItem {
            post: Some(Operation {
                tags: vec![endpoint_name.clone()],
                operation_id: operation_id(&endpoint_name, method.name()),
                request_body: None,
                responses,
                extensions: BTreeMap::from([(X_ACCESS.to_string(), access.to_extension())]),
            }),
        }));
        Ok(())
    }

    fn exit(&mut self, path: &NodePath, storage: &mut SharedStorage) -> Result<()> {
        let NodeSource::Method(method) = path.source() else {
            return Ok(());
        };
        if !path.is_attachable() {
            return Ok(());
        }
        let NodeTarget::PathItem(item) = path.node().take_target() else {
            return Ok(());
        };
        let endpoint_name = item
            .post
            .as_ref()
            .and_then(|operation| operation.tags.first().cloned())
            .unwrap_or_default();
        let key = endpoint_path(&endpoint_name, method.name());

        let emitted = storage.plugin_storage.get_or_default::<EmittedMethods>();
        if let Some(previous) = emitted.0.get(&key) {
            debug!(path = %key, first = %previous, second = %method.owner(), "method clash");
            return Err(ParserError::OverloadedMethod {
                endpoint: endpoint_name,
                method: method.name().to_string(),
            });
        }
        emitted.0.insert(key.clone(), method.owner().to_string());

        storage
            .associations
            .add_method(json_pointer(["paths", key.as_str(), "post"]), method.clone());
        storage.document.paths.insert(key, item);
        Ok(())
    }
}

/// Public instance methods of `class`, in declaration order.
pub fn published_methods(class: &ClassInfoModel) -> impl Iterator<Item = &MethodInfoModel> {
    class
        .methods()
        .iter()
        .filter(|method| method.is_public() && !method.is_static())
}

/// The endpoint class a path hangs under.
pub fn nearest_endpoint(path: &NodePath) -> Option<&ClassInfoModel> {
    path.find_ancestor(|source| matches!(source, NodeSource::Endpoint(_)))
        .and_then(|p| p.source().class())
}

/// A subclass further down the path publishes a method with the same
/// name and arity.
fn is_overridden(method: &MethodInfoModel, path: &NodePath) -> bool {
    let Some(declaring) = path.parent() else {
        return false;
    };
    declaring
        .ancestors()
        .filter(|p| p.source().is_method_holder())
        .filter_map(|p| p.source().class())
        .any(|subclass| {
            published_methods(subclass).any(|candidate| {
                candidate.name() == method.name()
                    && candidate.parameters().len() == method.parameters().len()
            })
        })
}
