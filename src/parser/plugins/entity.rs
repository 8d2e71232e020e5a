use crate::model::{ClassInfoModel, ClassWorld, SignatureClass, SignatureKind, SignatureModel};
use crate::openapi::{json_pointer, Schema, SchemaType};
use crate::parser::node::{Node, NodeRef, NodeSource};
use crate::parser::{DependencyController, NodeDependencies, NodePath, Plugin, Result, SharedStorage};
use serde_json::Value;

pub const NAME: &str = "entity";

/// Schedules entity classes and emits their component schemas.
///
/// Class references met in signatures and described entity superclasses
/// become related nodes through the dependency controller, so each
/// entity is walked once per run no matter how often it is referenced.
pub struct EntityPlugin {
    order: i32,
}

impl Default for EntityPlugin {
    fn default() -> Self {
        Self { order: 60 }
    }
}

impl Plugin for EntityPlugin {
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
        let mut classes = Vec::new();
        match dependencies.node().source() {
            NodeSource::TypeSignature(signature) => {
                if signature.classify(storage.world()) == SignatureClass::Entity {
                    classes.extend(
                        signature
                            .class_name()
                            .and_then(|name| storage.world().get(name))
                            .cloned(),
                    );
                }
            }
            NodeSource::Entity(class) => {
                if let Some(superclass) = entity_superclass(class, storage.world()) {
                    classes.push(superclass.clone());
                }
                if let Some(signature) = class.superclass() {
                    argument_entities(signature, storage.world(), &mut classes);
                }
            }
            _ => return Ok(dependencies),
        }

        let related = schedule(classes, &mut storage.dependencies);
        Ok(dependencies.with_related_nodes(related))
    }

    fn enter(&mut self, path: &NodePath, _storage: &mut SharedStorage) -> Result<()> {
        let NodeSource::Entity(class) = path.source() else {
            return Ok(());
        };
        let schema = if class.is_enum() {
            Schema {
                enum_values: class
                    .enum_constants()
                    .iter()
                    .map(|constant| Value::String(constant.clone()))
                    .collect(),
                ..Schema::of_type(SchemaType::String)
            }
        } else {
            Schema::of_type(SchemaType::Object)
        };
        path.node().set_schema(schema);
        Ok(())
    }

    fn exit(&mut self, path: &NodePath, storage: &mut SharedStorage) -> Result<()> {
        let NodeSource::Entity(class) = path.source() else {
            return Ok(());
        };
        if !path.is_attachable() {
            return Ok(());
        }
        let Some(own) = path.node().take_schema() else {
            return Ok(());
        };
        let schema = match entity_superclass(class, storage.world()) {
            Some(superclass) => Schema {
                all_of: vec![Schema::reference_to(superclass.name()), own],
                ..Schema::default()
            },
            None => own,
        };
        storage
            .associations
            .add_entity(json_pointer(["components", "schemas", class.name()]), class.clone());
        storage
            .document
            .components
            .schemas
            .insert(class.name().to_string(), schema);
        Ok(())
    }
}

/// The described, non-platform superclass of an entity.
pub fn entity_superclass<'w>(class: &ClassInfoModel, world: &'w ClassWorld) -> Option<&'w ClassInfoModel> {
    world
        .superclass_of(class)
        .filter(|superclass| !superclass.is_jdk_class())
}

fn schedule(classes: Vec<ClassInfoModel>, controller: &mut DependencyController) -> Vec<NodeRef> {
    classes
        .into_iter()
        .filter(|class| !class.is_jdk_class() && controller.register_if_new(class))
        .map(|class| Node::new(NodeSource::Entity(class)))
        .collect()
}

/// Entity classes used as type arguments of a superclass reference.
fn argument_entities(signature: &SignatureModel, world: &ClassWorld, out: &mut Vec<ClassInfoModel>) {
    for argument in signature.type_arguments() {
        let SignatureKind::TypeArgument {
            bound: Some(bound), ..
        } = argument.kind()
        else {
            continue;
        };
        if bound.classify(world) == SignatureClass::Entity {
            out.extend(bound.class_name().and_then(|name| world.get(name)).cloned());
        }
        argument_entities(bound, world, out);
    }
}
