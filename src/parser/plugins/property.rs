use super::entity::entity_superclass;
use crate::model::collect_properties;
use crate::openapi::{json_pointer, Schema};
use crate::parser::node::{Node, NodeSource};
use crate::parser::{NodeDependencies, NodePath, Plugin, Result, SharedStorage};
use tracing::debug;

pub const NAME: &str = "property";

/// Entity → serialized properties; each property lands in the entity
/// schema's `properties`, and in `required` unless nullable.
pub struct PropertyPlugin {
    order: i32,
}

impl Default for PropertyPlugin {
    fn default() -> Self {
        Self { order: 70 }
    }
}

impl Plugin for PropertyPlugin {
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
        storage: &mut SharedStorage,
    ) -> Result<NodeDependencies> {
        let NodeSource::Entity(class) = dependencies.node().source() else {
            return Ok(dependencies);
        };
        let properties: Vec<_> = collect_properties(class, storage.world())
            .into_iter()
            .map(|property| Node::new(NodeSource::Property(property)))
            .collect();
        Ok(dependencies.with_child_nodes(properties))
    }

    fn enter(&mut self, path: &NodePath, _storage: &mut SharedStorage) -> Result<()> {
        let NodeSource::Property(property) = path.source() else {
            return Ok(());
        };
        if property.is_type_ignored() {
            debug!(property = %path.source(), "property type is ignored by the mapper");
            path.remove();
            return Ok(());
        }
        path.node().set_schema(Schema::any());
        Ok(())
    }

    fn exit(&mut self, path: &NodePath, storage: &mut SharedStorage) -> Result<()> {
        let NodeSource::Property(property) = path.source() else {
            return Ok(());
        };
        if !path.is_attachable() {
            return Ok(());
        }
        let Some(entity) = path.parent() else {
            return Ok(());
        };
        let NodeSource::Entity(class) = entity.source() else {
            return Ok(());
        };
        let Some(mut schema) = path.node().take_schema() else {
            return Ok(());
        };
        let nullable = schema.is_nullable();
        schema.nullable = None;

        entity.node().with_schema_mut(|target| {
            target.properties.insert(property.name().to_string(), schema);
            if !nullable {
                target.required.push(property.name().to_string());
            }
        });

        // The entity exit wraps its own schema into `allOf` when it has a
        // described superclass.
        let pointer = if entity_superclass(class, storage.world()).is_some() {
            json_pointer([
                "components",
                "schemas",
                class.name(),
                "allOf",
                "1",
                "properties",
                property.name(),
            ])
        } else {
            json_pointer(["components", "schemas", class.name(), "properties", property.name()])
        };
        storage
            .associations
            .add_signature(pointer.clone(), property.signature().clone());
        storage.associations.add_property(pointer, property.clone());
        Ok(())
    }
}
