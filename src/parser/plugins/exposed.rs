use crate::model::{SignatureKind, SignatureModel, TypeParameterOwner, Wildcard};
use crate::parser::node::{Node, NodeRef, NodeSource};
use crate::parser::{NodeDependencies, NodePath, Plugin, Result, SharedStorage};

pub const NAME: &str = "endpoint-exposed";

/// Walks endpoint superclasses and binds the type variables they declare.
///
/// A superclass carrying the exposed annotation becomes an
/// [`NodeSource::EndpointExposed`] node, any other described superclass an
/// [`NodeSource::EndpointNonExposed`] node. Platform superclasses end the
/// chain.
///
/// In [`Plugin::resolve`], a type variable declared by an exposed or
/// non-exposed class is replaced by the type argument the subclass wrote
/// for it (`class IntBox extends Box<Integer>` turns `T` into `Integer`).
/// When that argument is itself a variable of the subclass, resolution
/// continues above it.
pub struct EndpointExposedPlugin {
    order: i32,
}

impl Default for EndpointExposedPlugin {
    fn default() -> Self {
        Self { order: 10 }
    }
}

impl Plugin for EndpointExposedPlugin {
    fn name(&self) -> &'static str {
        NAME
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
    }

    fn run_after(&self) -> &'static [&'static str] {
        &[super::type_variable::NAME]
    }

    fn resolve(
        &mut self,
        node: NodeRef,
        parent: &NodePath,
        _storage: &mut SharedStorage,
    ) -> Result<NodeRef> {
        let NodeSource::TypeSignature(signature) = node.source() else {
            return Ok(node);
        };
        match substitute(signature, parent) {
            Some(substituted) => Ok(Node::new(NodeSource::TypeSignature(substituted))),
            None => Ok(node),
        }
    }

    fn scan(
        &mut self,
        dependencies: NodeDependencies,
        storage: &mut SharedStorage,
    ) -> Result<NodeDependencies> {
        let class = match dependencies.node().source() {
            NodeSource::Endpoint(class)
            | NodeSource::EndpointExposed { class, .. }
            | NodeSource::EndpointNonExposed { class, .. } => class,
            _ => return Ok(dependencies),
        };
        let Some(signature) = class.superclass() else {
            return Ok(dependencies);
        };
        let Some(superclass) = signature.class_name().and_then(|n| storage.world().get(n)) else {
            return Ok(dependencies);
        };
        if superclass.is_jdk_class() {
            return Ok(dependencies);
        }

        let source = if storage.scan().is_exposed(superclass) {
            NodeSource::EndpointExposed {
                signature: signature.clone(),
                class: superclass.clone(),
            }
        } else {
            NodeSource::EndpointNonExposed {
                signature: signature.clone(),
                class: superclass.clone(),
            }
        };
        Ok(dependencies.with_child_nodes([Node::new(source)]))
    }
}

/// Replacement for a resolved class type variable, if an ancestor
/// superclass node binds it.
fn substitute(signature: &SignatureModel, parent: &NodePath) -> Option<SignatureModel> {
    let mut parameter = signature.resolved_parameter()?.clone();
    let mut search_from = parent.clone();
    let mut current: Option<SignatureModel> = None;

    loop {
        let TypeParameterOwner::Class(owner) = parameter.owner() else {
            break;
        };
        let Some(holder) = search_from
            .find_ancestor(|source| match source {
                NodeSource::EndpointExposed { class, .. }
                | NodeSource::EndpointNonExposed { class, .. } => class.name() == owner,
                _ => false,
            })
            .cloned()
        else {
            break;
        };
        let (NodeSource::EndpointExposed {
            signature: written, ..
        }
        | NodeSource::EndpointNonExposed {
            signature: written, ..
        }) = holder.source()
        else {
            break;
        };
        let Some(bound) = written
            .type_arguments()
            .get(parameter.index())
            .and_then(argument_bound)
        else {
            break;
        };

        let annotations = current
            .as_ref()
            .map_or_else(|| signature.annotations(), |c| c.annotations())
            .to_vec();
        let bound = bound.with_extra_annotations(&annotations);

        let Some(variable) = bound.type_variable_name().map(str::to_string) else {
            current = Some(bound);
            break;
        };
        // The argument is a variable of the subclass that wrote it.
        let Some(context) = holder.parent() else {
            current = Some(bound);
            break;
        };
        let declared = context.source().class().and_then(|class| {
            class
                .type_parameters()
                .iter()
                .find(|p| p.name() == variable)
                .cloned()
        });
        match declared {
            Some(next) => {
                current = Some(bound.with_resolution(next.clone()));
                parameter = next;
                search_from = context.clone();
            }
            None => {
                current = Some(bound);
                break;
            }
        }
    }
    current
}

fn argument_bound(argument: &SignatureModel) -> Option<SignatureModel> {
    match argument.kind() {
        SignatureKind::TypeArgument {
            wildcard: Wildcard::None | Wildcard::Extends,
            bound: Some(bound),
            ..
        } => Some(bound.clone()),
        _ => None,
    }
}
