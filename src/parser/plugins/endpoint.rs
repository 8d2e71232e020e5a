use crate::openapi::Tag;
use crate::parser::node::{Node, NodeSource, NodeTarget};
use crate::parser::{NodeDependencies, NodePath, Plugin, Result, SharedStorage};
use tracing::debug;

pub const NAME: &str = "endpoint";

/// Root → endpoint classes; every endpoint becomes a document tag.
pub struct EndpointPlugin {
    order: i32,
}

impl Default for EndpointPlugin {
    fn default() -> Self {
        Self { order: 0 }
    }
}

impl Plugin for EndpointPlugin {
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
        let NodeSource::Root(scan) = dependencies.node().source() else {
            return Ok(dependencies);
        };
        let endpoints: Vec<_> = scan
            .endpoints()
            .iter()
            .map(|endpoint| Node::new(NodeSource::Endpoint(endpoint.class.clone())))
            .collect();
        Ok(dependencies.with_child_nodes(endpoints))
    }

    fn enter(&mut self, path: &NodePath, storage: &mut SharedStorage) -> Result<()> {
        let NodeSource::Endpoint(class) = path.source() else {
            return Ok(());
        };
        let name = storage
            .endpoint_name(class)
            .unwrap_or_else(|| class.simple_name())
            .to_string();
        path.node().set_target(NodeTarget::Tag(Tag {
            name,
            description: None,
            class_name: Some(class.name().to_string()),
        }));
        Ok(())
    }

    fn exit(&mut self, path: &NodePath, storage: &mut SharedStorage) -> Result<()> {
        match path.source() {
            NodeSource::Endpoint(_) if path.is_attachable() => {
                if let NodeTarget::Tag(tag) = path.node().take_target() {
                    storage.document.tags.push(tag);
                }
            }
            NodeSource::Root(_) => {
                debug!(
                    endpoints = storage.document.tags.len(),
                    paths = storage.document.paths.len(),
                    schemas = storage.document.components.schemas.len(),
                    "document assembled"
                );
            }
            _ => {}
        }
        Ok(())
    }
}
