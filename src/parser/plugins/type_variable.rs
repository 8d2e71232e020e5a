use crate::model::{SignatureKind, TypeParameterModel};
use crate::parser::node::{Node, NodeRef, NodeSource};
use crate::parser::{NodePath, Plugin, Result, SharedStorage};

pub const NAME: &str = "type-variable";

/// Binds type variables to the parameter that declares them.
///
/// Looking only at the declaring class of a signature misses method type
/// parameters and generics inherited through superclasses, so the lookup
/// walks the path instead: method nodes first, then the class-bearing
/// nodes above them, nearest first.
pub struct TypeVariablePlugin {
    order: i32,
}

impl Default for TypeVariablePlugin {
    fn default() -> Self {
        Self { order: -10 }
    }
}

impl Plugin for TypeVariablePlugin {
    fn name(&self) -> &'static str {
        NAME
    }

    fn order(&self) -> i32 {
        self.order
    }

    fn set_order(&mut self, order: i32) {
        self.order = order;
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
        let SignatureKind::TypeVariable {
            name,
            resolved: None,
            ..
        } = signature.kind()
        else {
            return Ok(node);
        };

        match declaration(name, parent) {
            Some(parameter) => Ok(Node::new(NodeSource::TypeSignature(
                signature.with_resolution(parameter),
            ))),
            None => Ok(node),
        }
    }
}

fn declaration(name: &str, parent: &NodePath) -> Option<TypeParameterModel> {
    parent.self_and_ancestors().find_map(|path| {
        let parameters = match path.source() {
            NodeSource::Method(method) => method.type_parameters(),
            source => source.class()?.type_parameters(),
        };
        parameters.iter().find(|p| p.name() == name).cloned()
    })
}
