use crate::model::{
    ClassInfoModel, MethodInfoModel, MethodParameterInfoModel, PropertyModel, SignatureModel,
};
use crate::openapi::{PathItem, Schema, Tag};
use crate::scan::ScanResult;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::rc::Rc;
use std::sync::Arc;

pub type NodeRef = Rc<Node>;

/// The program element a node stands for.
#[derive(Clone)]
pub enum NodeSource {
    /// The whole scanned class path.
    Root(Arc<ScanResult>),
    Endpoint(ClassInfoModel),
    /// A superclass whose methods are exposed through the endpoint below
    /// it. `signature` is the superclass reference as written by the
    /// subclass, so its type arguments bind the class type parameters.
    EndpointExposed {
        signature: SignatureModel,
        class: ClassInfoModel,
    },
    /// A superclass without the exposed annotation. Its methods are not
    /// published but its own superclasses may be.
    EndpointNonExposed {
        signature: SignatureModel,
        class: ClassInfoModel,
    },
    Method(MethodInfoModel),
    MethodParameter(MethodParameterInfoModel),
    Entity(ClassInfoModel),
    Property(PropertyModel),
    TypeSignature(SignatureModel),
}

impl NodeSource {
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeSource::Root(_) => "root",
            NodeSource::Endpoint(_) => "endpoint",
            NodeSource::EndpointExposed { .. } => "endpoint-exposed",
            NodeSource::EndpointNonExposed { .. } => "endpoint-non-exposed",
            NodeSource::Method(_) => "method",
            NodeSource::MethodParameter(_) => "method-parameter",
            NodeSource::Entity(_) => "entity",
            NodeSource::Property(_) => "property",
            NodeSource::TypeSignature(_) => "type-signature",
        }
    }

    /// The class of endpoint, exposed, non-exposed and entity nodes.
    pub fn class(&self) -> Option<&ClassInfoModel> {
        match self {
            NodeSource::Endpoint(class)
            | NodeSource::EndpointExposed { class, .. }
            | NodeSource::EndpointNonExposed { class, .. }
            | NodeSource::Entity(class) => Some(class),
            _ => None,
        }
    }

    /// Endpoint-like nodes contribute methods.
    pub fn is_method_holder(&self) -> bool {
        matches!(
            self,
            NodeSource::Endpoint(_) | NodeSource::EndpointExposed { .. }
        )
    }

    pub fn signature(&self) -> Option<&SignatureModel> {
        match self {
            NodeSource::TypeSignature(signature) => Some(signature),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&MethodInfoModel> {
        match self {
            NodeSource::Method(method) => Some(method),
            _ => None,
        }
    }
}

impl PartialEq for NodeSource {
    fn eq(&self, other: &Self) -> bool {
        use NodeSource::*;
        match (self, other) {
            (Root(a), Root(b)) => Arc::ptr_eq(a, b),
            (Endpoint(a), Endpoint(b)) | (Entity(a), Entity(b)) => a == b,
            (
                EndpointExposed {
                    signature: sa,
                    class: ca,
                },
                EndpointExposed {
                    signature: sb,
                    class: cb,
                },
            )
            | (
                EndpointNonExposed {
                    signature: sa,
                    class: ca,
                },
                EndpointNonExposed {
                    signature: sb,
                    class: cb,
                },
            ) => sa == sb && ca == cb,
            (Method(a), Method(b)) => a == b,
            (MethodParameter(a), MethodParameter(b)) => a == b,
            (Property(a), Property(b)) => a == b,
            (TypeSignature(a), TypeSignature(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for NodeSource {}

impl Hash for NodeSource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            NodeSource::Root(scan) => Arc::as_ptr(scan).hash(state),
            NodeSource::Endpoint(class) | NodeSource::Entity(class) => class.hash(state),
            NodeSource::EndpointExposed { signature, class }
            | NodeSource::EndpointNonExposed { signature, class } => {
                signature.hash(state);
                class.hash(state);
            }
            NodeSource::Method(method) => method.hash(state),
            NodeSource::MethodParameter(parameter) => parameter.hash(state),
            NodeSource::Property(property) => property.hash(state),
            NodeSource::TypeSignature(signature) => signature.hash(state),
        }
    }
}

impl fmt::Display for NodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeSource::Root(_) => f.write_str("root"),
            NodeSource::Endpoint(class) | NodeSource::Entity(class) => {
                write!(f, "{} {}", self.kind_name(), class.name())
            }
            NodeSource::EndpointExposed { signature, .. }
            | NodeSource::EndpointNonExposed { signature, .. } => {
                write!(f, "{} {signature}", self.kind_name())
            }
            NodeSource::Method(method) => write!(f, "method {}.{}", method.owner(), method.name()),
            NodeSource::MethodParameter(parameter) => {
                write!(f, "parameter {}({})", parameter.method_name(), parameter.name())
            }
            NodeSource::Property(property) => {
                write!(f, "property {}.{}", property.owner(), property.name())
            }
            NodeSource::TypeSignature(signature) => write!(f, "signature {signature}"),
        }
    }
}

impl fmt::Debug for NodeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// What a node produces for the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum NodeTarget {
    #[default]
    Empty,
    Schema(Schema),
    PathItem(PathItem),
    Tag(Tag),
    Name(String),
}

/// A graph node: an immutable source and the target plugins build for it.
///
/// Equality and hashing look at the source only.
pub struct Node {
    source: NodeSource,
    target: RefCell<NodeTarget>,
}

impl Node {
    pub fn new(source: NodeSource) -> NodeRef {
        Rc::new(Self {
            source,
            target: RefCell::new(NodeTarget::Empty),
        })
    }

    pub fn source(&self) -> &NodeSource {
        &self.source
    }

    pub fn target(&self) -> Ref<'_, NodeTarget> {
        self.target.borrow()
    }

    pub fn target_mut(&self) -> RefMut<'_, NodeTarget> {
        self.target.borrow_mut()
    }

    pub fn set_target(&self, target: NodeTarget) {
        *self.target.borrow_mut() = target;
    }

    /// Takes the target out, leaving [`NodeTarget::Empty`].
    pub fn take_target(&self) -> NodeTarget {
        mem::take(&mut *self.target.borrow_mut())
    }

    pub fn set_schema(&self, schema: Schema) {
        self.set_target(NodeTarget::Schema(schema));
    }

    pub fn schema(&self) -> Option<Schema> {
        match &*self.target.borrow() {
            NodeTarget::Schema(schema) => Some(schema.clone()),
            _ => None,
        }
    }

    pub fn take_schema(&self) -> Option<Schema> {
        match self.take_target() {
            NodeTarget::Schema(schema) => Some(schema),
            other => {
                self.set_target(other);
                None
            }
        }
    }

    /// Runs `f` on the schema target, if there is one.
    pub fn with_schema_mut<R>(&self, f: impl FnOnce(&mut Schema) -> R) -> Option<R> {
        match &mut *self.target.borrow_mut() {
            NodeTarget::Schema(schema) => Some(f(schema)),
            _ => None,
        }
    }

    pub fn with_path_item_mut<R>(&self, f: impl FnOnce(&mut PathItem) -> R) -> Option<R> {
        match &mut *self.target.borrow_mut() {
            NodeTarget::PathItem(item) => Some(f(item)),
            _ => None,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("source", &self.source)
            .field("target", &self.target.borrow())
            .finish()
    }
}
