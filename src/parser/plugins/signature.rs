use crate::model::{
    ClassWorld, SignatureClass, SignatureKind, SignatureModel, TypeParameterOwner, Wildcard,
};
use crate::openapi::{
    MediaType, Schema, SchemaType, JSON_MEDIA_TYPE, X_TYPE_ARGUMENTS, X_TYPE_VARIABLE,
};
use crate::parser::node::{Node, NodeRef, NodeSource};
use crate::parser::{NodeDependencies, NodePath, Plugin, Result, SharedStorage};
use serde_json::{json, Value};
use tracing::warn;

pub const NAME: &str = "type-signature";

/// Converts type signatures into schemas.
///
/// Typed nodes (methods, parameters, properties) get their signature as
/// a child, and composite signatures get their parts as children: array
/// components, collection elements, map values, optional contents, entity
/// type arguments and type parameter bounds. `enter` builds the schema of
/// one signature, `exit` hangs it into the parent's schema at the place
/// the parent's shape calls for.
pub struct TypeSignaturePlugin {
    order: i32,
}

impl Default for TypeSignaturePlugin {
    fn default() -> Self {
        Self { order: 50 }
    }
}

impl Plugin for TypeSignaturePlugin {
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
        let children: Vec<SignatureModel> = match dependencies.node().source() {
            NodeSource::Method(method) if !method.result().is_void() => {
                vec![method.result().clone()]
            }
            NodeSource::MethodParameter(parameter) => vec![parameter.signature().clone()],
            NodeSource::Property(property) => vec![property.signature().clone()],
            NodeSource::TypeSignature(signature) => nested_signatures(signature, storage.world()),
            _ => Vec::new(),
        };
        Ok(dependencies.with_child_nodes(children.into_iter().map(signature_node)))
    }

    fn enter(&mut self, path: &NodePath, storage: &mut SharedStorage) -> Result<()> {
        let NodeSource::TypeSignature(signature) = path.source() else {
            return Ok(());
        };

        if let SignatureKind::TypeParameter(parameter) = signature.kind() {
            let recursive = path.ancestors().any(|ancestor| {
                matches!(
                    ancestor.source().signature().map(SignatureModel::kind),
                    Some(SignatureKind::TypeParameter(other)) if other == parameter
                )
            });
            if recursive {
                // `<T extends Comparable<T>>` and friends
                path.skip();
                path.node().set_schema(nullable(Schema::any()));
                return Ok(());
            }
        }

        let schema = schema_for(signature, storage.world());
        path.node().set_schema(schema);
        Ok(())
    }

    fn exit(&mut self, path: &NodePath, storage: &mut SharedStorage) -> Result<()> {
        let NodeSource::TypeSignature(_) = path.source() else {
            return Ok(());
        };
        if !path.is_attachable() {
            return Ok(());
        }
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        let Some(schema) = path.node().take_schema() else {
            return Ok(());
        };
        attach(parent, schema, storage.world());
        Ok(())
    }
}

fn signature_node(signature: SignatureModel) -> NodeRef {
    Node::new(NodeSource::TypeSignature(signature))
}

fn nullable(mut schema: Schema) -> Schema {
    schema.nullable = Some(true);
    schema
}

/// Signatures a composite signature is made of.
fn nested_signatures(signature: &SignatureModel, world: &ClassWorld) -> Vec<SignatureModel> {
    match signature.kind() {
        SignatureKind::Array { component, .. } => return vec![component.clone()],
        SignatureKind::TypeArgument {
            wildcard, bound, ..
        } => {
            return match (wildcard, bound) {
                (Wildcard::None | Wildcard::Extends, Some(bound)) => vec![bound.clone()],
                _ => Vec::new(),
            };
        }
        SignatureKind::TypeVariable {
            resolved: Some(parameter),
            ..
        } => {
            return match parameter.owner() {
                TypeParameterOwner::Method { .. } => vec![parameter.as_signature()],
                TypeParameterOwner::Class(_) => Vec::new(),
            };
        }
        SignatureKind::TypeParameter(parameter) => {
            return parameter.effective_bound().cloned().into_iter().collect();
        }
        _ => {}
    }

    let arguments = signature.type_arguments();
    match signature.classify(world) {
        SignatureClass::Iterable | SignatureClass::Optional => {
            arguments.first().cloned().into_iter().collect()
        }
        SignatureClass::Map => arguments.get(1).cloned().into_iter().collect(),
        SignatureClass::Entity => arguments.to_vec(),
        _ => Vec::new(),
    }
}

/// The schema of one signature, before its children are attached.
pub(crate) fn schema_for(signature: &SignatureModel, world: &ClassWorld) -> Schema {
    let schema = match signature.classify(world) {
        SignatureClass::Void | SignatureClass::Any => Schema::any(),
        SignatureClass::Boolean => Schema::of_type(SchemaType::Boolean),
        SignatureClass::String => Schema::of_type(SchemaType::String),
        SignatureClass::Integer { int64 } => {
            Schema::of_type(SchemaType::Integer).with_format(if int64 { "int64" } else { "int32" })
        }
        SignatureClass::Number { double } => {
            Schema::of_type(SchemaType::Number).with_format(if double { "double" } else { "float" })
        }
        SignatureClass::Date(format) => Schema::of_type(SchemaType::String).with_format(format.as_str()),
        SignatureClass::Array | SignatureClass::Iterable => Schema::of_type(SchemaType::Array),
        SignatureClass::Map => Schema::of_type(SchemaType::Object),
        SignatureClass::Optional => Schema::any(),
        SignatureClass::Entity => match signature.class_name() {
            Some(name) => Schema::reference_to(name),
            None => Schema::any(),
        },
        SignatureClass::TypeVariable => {
            let mut schema = Schema::any();
            if let Some(parameter) = signature.resolved_parameter() {
                if matches!(parameter.owner(), TypeParameterOwner::Class(_)) {
                    schema
                        .extensions
                        .insert(X_TYPE_VARIABLE.to_string(), json!(parameter.name()));
                }
            } else if let Some(name) = signature.type_variable_name() {
                warn!(variable = name, "unresolved type variable, using an untyped schema");
            }
            schema
        }
        SignatureClass::TypeParameter | SignatureClass::TypeArgument => Schema::any(),
    };
    if signature.is_primitive() {
        schema
    } else {
        nullable(schema)
    }
}

/// Hangs a finished child schema into its parent node.
fn attach(parent: &NodePath, schema: Schema, world: &ClassWorld) {
    match parent.source() {
        NodeSource::TypeSignature(parent_signature) => {
            let class = parent_signature.classify(world);
            parent.node().with_schema_mut(|target| match class {
                SignatureClass::Array | SignatureClass::Iterable => {
                    target.items = Some(Box::new(schema));
                }
                SignatureClass::Map => {
                    target.additional_properties = Some(Box::new(schema));
                }
                SignatureClass::Optional => {
                    *target = nullable(schema);
                }
                SignatureClass::Entity => {
                    let value = serde_json::to_value(&schema).unwrap_or(Value::Null);
                    push_type_argument(target, value);
                }
                _ => {
                    *target = schema;
                }
            });
        }
        NodeSource::Property(_) | NodeSource::MethodParameter(_) => {
            parent.node().set_schema(schema);
        }
        NodeSource::Method(_) => {
            parent.node().with_path_item_mut(|item| {
                let response = item
                    .post
                    .as_mut()
                    .and_then(|operation| operation.responses.get_mut("200"));
                if let Some(response) = response {
                    response
                        .content
                        .insert(JSON_MEDIA_TYPE.to_string(), MediaType { schema });
                }
            });
        }
        _ => {}
    }
}

fn push_type_argument(target: &mut Schema, argument: Value) {
    let entry = target
        .extensions
        .entry(X_TYPE_ARGUMENTS.to_string())
        .or_insert_with(|| json!({ "allOf": [] }));
    if let Some(Value::Array(all_of)) = entry.get_mut("allOf") {
        all_of.push(argument);
    }
}
