use crate::openapi::{endpoint_path, json_pointer, Schema, JSON_MEDIA_TYPE};
use crate::parser::node::{Node, NodeSource};
use crate::parser::{NodeDependencies, NodePath, Plugin, Result, SharedStorage};

pub const NAME: &str = "method-parameter";

/// Method → parameters; each parameter becomes a property of the JSON
/// request body, required unless nullable.
pub struct MethodParameterPlugin {
    order: i32,
}

impl Default for MethodParameterPlugin {
    fn default() -> Self {
        Self { order: 30 }
    }
}

impl Plugin for MethodParameterPlugin {
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
        let NodeSource::Method(method) = dependencies.node().source() else {
            return Ok(dependencies);
        };
        let parameters: Vec<_> = method
            .parameters()
            .iter()
            .map(|p| Node::new(NodeSource::MethodParameter(p.clone())))
            .collect();
        Ok(dependencies.with_child_nodes(parameters))
    }

    fn enter(&mut self, path: &NodePath, _storage: &mut SharedStorage) -> Result<()> {
        if matches!(path.source(), NodeSource::MethodParameter(_)) {
            path.node().set_schema(Schema::any());
        }
        Ok(())
    }

    fn exit(&mut self, path: &NodePath, storage: &mut SharedStorage) -> Result<()> {
        let NodeSource::MethodParameter(parameter) = path.source() else {
            return Ok(());
        };
        if !path.is_attachable() {
            return Ok(());
        }
        let Some(method_path) = path.parent() else {
            return Ok(());
        };
        let Some(mut schema) = path.node().take_schema() else {
            return Ok(());
        };
        let nullable = schema.is_nullable();
        schema.nullable = None;

        let attached = method_path.node().with_path_item_mut(|item| {
            let operation = item.post.as_mut()?;
            let endpoint = operation.tags.first().cloned()?;
            let body = operation.request_schema_mut();
            body.properties.insert(parameter.name().to_string(), schema);
            if !nullable {
                body.required.push(parameter.name().to_string());
            }
            Some(endpoint)
        });
        if let Some(Some(endpoint)) = attached {
            let path_key = endpoint_path(&endpoint, parameter.method_name());
            let pointer = json_pointer([
                "paths",
                path_key.as_str(),
                "post",
                "requestBody",
                "content",
                JSON_MEDIA_TYPE,
                "schema",
                "properties",
                parameter.name(),
            ]);
            storage
                .associations
                .add_signature(pointer.clone(), parameter.signature().clone());
            storage.associations.add_parameter(pointer, parameter.clone());
        }
        Ok(())
    }
}
